//! Lifecycle: уничтожение entities и запросы на спавн prefab/эффектов
//!
//! ECS не инстанцирует ассеты - пишет SpawnEffect / PrefabSpawnRequested,
//! presentation layer читает и создаёт визуал.
//! Уничтожение всегда через DestroyRequested → deferred despawn (Commands),
//! чтобы OnDestroyEffect и LevelCleared срабатывали в одном месте.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::ai::Locomotion;
use crate::components::{OnDestroyEffect, PrefabPath};

/// Запрос: заспавнить визуальный эффект (вспышка, взрыв, кровь)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SpawnEffect {
    pub prefab: PrefabPath,
    pub position: Vec3,
    pub rotation: Quat,
}

/// Запрос: заспавнить prefab (враг из спавнера, дроп, projectile)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PrefabSpawnRequested {
    pub prefab: PrefabPath,
    pub position: Vec3,
    pub rotation: Quat,
    /// Кто запросил (спавнер, стрелок, умерший враг)
    pub requested_by: Option<Entity>,
}

/// Запрос: уничтожить entity (вместе с children)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestroyRequested {
    pub entity: Entity,
}

/// Событие: улей уничтожен, уровень пройден
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCleared {
    pub hive: Entity,
}

/// Уничтожить entity после `lifetime` секунд жизни
///
/// Трупы (ragdoll), гильзы, эффекты без собственного таймера.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct TimedDestroyer {
    pub lifetime: f32,
    pub time_alive: f32,
}

impl TimedDestroyer {
    pub fn new(lifetime: f32) -> Self {
        Self {
            lifetime,
            time_alive: 0.0,
        }
    }

    /// Прибавить delta, true = время вышло
    pub fn tick(&mut self, delta: f32) -> bool {
        if self.time_alive > self.lifetime {
            return true;
        }
        self.time_alive += delta;
        false
    }
}

/// Lifecycle Plugin
///
/// Регистрирует события и системы уничтожения в FixedUpdate.
pub struct LifecyclePlugin;

impl Plugin for LifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SpawnEffect>()
            .add_event::<PrefabSpawnRequested>()
            .add_event::<DestroyRequested>()
            .add_event::<LevelCleared>();

        app.add_systems(
            FixedUpdate,
            (tick_timed_destroyers, process_destroy_requests)
                .chain()
                .in_set(crate::SimulationSet::Cleanup),
        );
    }
}

/// Система: TimedDestroyer → DestroyRequested
pub fn tick_timed_destroyers(
    mut destroyers: Query<(Entity, &mut TimedDestroyer)>,
    mut destroy_events: EventWriter<DestroyRequested>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (entity, mut destroyer) in destroyers.iter_mut() {
        if destroyer.tick(delta) {
            destroy_events.write(DestroyRequested { entity });
        }
    }
}

/// Система: обработка DestroyRequested
///
/// - OnDestroyEffect → SpawnEffect в позиции entity
/// - Hive → LevelCleared
/// - despawn через Commands (применяется в конце schedule)
///
/// Повторные запросы на ту же entity за тик игнорируются.
pub fn process_destroy_requests(
    mut commands: Commands,
    mut destroy_events: EventReader<DestroyRequested>,
    destroyed: Query<(&Transform, Option<&OnDestroyEffect>, Option<&Locomotion>)>,
    mut effect_events: EventWriter<SpawnEffect>,
    mut level_events: EventWriter<LevelCleared>,
) {
    let mut handled = HashSet::new();

    for event in destroy_events.read() {
        if !handled.insert(event.entity) {
            continue;
        }

        let Ok(mut entity_commands) = commands.get_entity(event.entity) else {
            continue;
        };

        if let Ok((transform, on_destroy, locomotion)) = destroyed.get(event.entity) {
            if let Some(on_destroy) = on_destroy {
                effect_events.write(SpawnEffect {
                    prefab: on_destroy.prefab.clone(),
                    position: transform.translation,
                    rotation: transform.rotation,
                });
            }

            if locomotion.is_some_and(Locomotion::is_hive) {
                crate::log_info(&format!("🏁 Hive {:?} destroyed: level cleared", event.entity));
                level_events.write(LevelCleared { hive: event.entity });
            }
        }

        entity_commands.despawn();
        crate::log(&format!("⚰️ Despawning entity {:?}", event.entity));
    }
}
