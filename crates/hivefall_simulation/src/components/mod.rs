//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (Actor faction, Player marker, OnDestroyEffect)
//! - movement: контроллер движения и навигационный агент (MovementController, NavAgent)
//! - world: ассеты (PrefabPath)
//!
//! Доменные компоненты (EnemyBehavior, Attacker, Health, Gun...) живут в своих модулях.

pub mod actor;
pub mod movement;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
pub use world::*;
