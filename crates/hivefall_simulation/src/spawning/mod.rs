//! Spawning domain - спавнеры врагов и лут
//!
//! Содержит:
//! - EnemySpawner (Fixed / Random / Controlled) + SpawnerTriggered
//! - EnemyDrops: смещённый бросок дропов при окончательной смерти
//!
//! Оба пишут PrefabSpawnRequested - инстанцирует presentation layer.

use bevy::prelude::*;

pub mod drops;
pub mod spawner;

pub use drops::{roll_biased, EnemyDrops};
pub use spawner::{EnemySpawner, SpawnMode};

use crate::SimulationSet;

/// Запрос: один спавн из конкретного спавнера (swarm атака, скрипты уровня)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnerTriggered {
    pub spawner: Entity,
}

/// Spawning Plugin
///
/// SimulationSet::Spawn - после Damage (ActorDied этого тика уже записан)
/// и после Timers (swarm атаки уже разослали SpawnerTriggered).
pub struct SpawningPlugin;

impl Plugin for SpawningPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SpawnerTriggered>();

        app.add_systems(
            FixedUpdate,
            (
                spawner::validate_spawners,
                spawner::run_spawners,
                drops::spawn_enemy_drops,
            )
                .chain()
                .in_set(SimulationSet::Spawn),
        );
    }
}
