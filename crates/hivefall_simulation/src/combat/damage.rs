//! Damage/lifecycle события
//!
//! Входящие (от collaborators): DamageRequest, HealRequest, AddLivesRequest.
//! Исходящие (для UI, звуков, эффектов): DamageDealt, HealthChanged,
//! ActorDied, ActorRespawned, GameOver.

use bevy::prelude::*;

/// Запрос: нанести урон (projectile hit, hitbox, взрыв, скрипт)
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: i32,
    /// Кто нанёс (None = окружение)
    pub source: Option<Entity>,
}

/// Запрос: вылечить
#[derive(Event, Debug, Clone)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: i32,
}

/// Запрос: добавить жизни (pickup)
#[derive(Event, Debug, Clone)]
pub struct AddLivesRequest {
    pub target: Entity,
    pub amount: i32,
}

/// Событие: урон нанесен
///
/// Генерируется после применения damage к Health (no-op урон не репортится).
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: i32,
    pub target_died: bool,
}

/// Событие: здоровье/жизни изменились (UI refresh)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: i32,
    pub maximum: i32,
    pub lives: i32,
}

/// Событие: актор умер
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ActorDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
    /// true = жизней не осталось (destroy / game over)
    pub final_death: bool,
}

/// Событие: актор возродился в точке respawn
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ActorRespawned {
    pub entity: Entity,
    pub position: Vec3,
}

/// Событие: игрок окончательно умер
#[derive(Event, Debug, Clone, PartialEq)]
pub struct GameOver {
    pub player: Entity,
}
