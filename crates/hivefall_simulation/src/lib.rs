//! HIVEFALL Simulation Core
//!
//! ECS-симуляция врагов на Bevy 0.16 (headless).
//!
//! Разделение ответственности:
//! - ECS = решения (FSM врагов, атаки, здоровье, спавн, патроны)
//! - Presentation = визуал (анимации, эффекты, ragdoll физика, инстанцирование prefab)
//!
//! Связь только через Events и поля компонентов, ECS не трогает ассеты.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod lifecycle;
pub mod logger;
pub mod shooting;
pub mod spawning;

// Re-export базовых компонентов для удобства
pub use ai::{
    AIPlugin, ActionState, EnemyBehavior, LineOfSight, Locomotion, SightPlugin, Target,
};
pub use combat::{ActorDied, Attacker, AttackPayload, CombatPlugin, DamageDealt, GameOver, Health};
pub use components::*;
pub use config::SimulationConfig;
pub use lifecycle::{DestroyRequested, LevelCleared, LifecyclePlugin, PrefabSpawnRequested, SpawnEffect};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, LogLevel};
pub use shooting::{AmmoReserve, Gun, JsonFileAmmoStore, Shooter, ShootingPlugin};
pub use spawning::{EnemyDrops, EnemySpawner, SpawnMode, SpawningPlugin};

/// Порядок фаз одного тика FixedUpdate
///
/// Timers → Sense → Behavior → Attacks → Damage → Spawn → Cleanup
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Timers,   // Фазы атак (Attacking → Cooldown), end payloads
    Sense,    // Line-of-sight raycasts
    Behavior, // Цели, навигация, FSM врагов
    Attacks,  // Start payloads, hitboxes, выстрелы
    Damage,   // Урон, смерть, respawn
    Spawn,    // Спавнеры, дропы
    Cleanup,  // TimedDestroyer, despawn
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Line-of-sight (SightPlugin) подключается отдельно вместе с Rapier:
/// без физики враги используют `LineOfSight::has_sight` как есть.
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl SimulationPlugin {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Timers,
                SimulationSet::Sense,
                SimulationSet::Behavior,
                SimulationSet::Attacks,
                SimulationSet::Damage,
                SimulationSet::Spawn,
                SimulationSet::Cleanup,
            )
                .chain(),
        );

        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(self.config.effective_tick_hz()))
            .insert_resource(DeterministicRng::new(self.config.seed))
            .insert_resource(self.config.clone())
            // Подсистемы
            .add_plugins((
                LifecyclePlugin,
                CombatPlugin,
                AIPlugin,
                ShootingPlugin,
                SpawningPlugin,
            ));

        if let Some(path) = &self.config.ammo_save_path {
            crate::log_info(&format!("📦 Ammo reserve persisted at {}", path.display()));
            app.insert_resource(shooting::AmmoPersistence(Box::new(JsonFileAmmoStore::new(path))));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin::new(SimulationConfig::default().with_seed(seed)));

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Компоненты T через Debug, отсортированные по Entity index.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
