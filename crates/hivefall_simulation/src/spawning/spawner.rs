//! EnemySpawner - периодический или управляемый спавн врагов в области.
//!
//! Режимы:
//! - Fixed: каждые spawn_rate секунд
//! - Random: следующий спавн через spawn_rate * rand (не позже spawn_rate)
//! - Controlled: только по SpawnerTriggered (swarm атака улья)

use bevy::prelude::*;
use rand::Rng;

use crate::components::PrefabPath;
use crate::lifecycle::PrefabSpawnRequested;
use crate::spawning::SpawnerTriggered;
use crate::DeterministicRng;

/// Расписание спавнера
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum SpawnMode {
    #[default]
    Fixed,
    Random,
    Controlled,
}

/// Спавнер врагов
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct EnemySpawner {
    /// None = спавнер выключен (ничего не спавнит, расписание не двигается)
    pub prefab: Option<PrefabPath>,
    pub mode: SpawnMode,
    /// Максимальный интервал между спавнами (секунды, >= 0)
    pub spawn_rate: f32,
    /// Размер области спавна по каждой оси (центр = позиция спавнера)
    pub area_size: Vec3,
    /// Время следующего спавна (elapsed secs)
    pub next_spawn_time: f32,
}

impl Default for EnemySpawner {
    fn default() -> Self {
        Self {
            prefab: None,
            mode: SpawnMode::Fixed,
            spawn_rate: 5.0,
            area_size: Vec3::ZERO,
            next_spawn_time: f32::NEG_INFINITY,
        }
    }
}

impl EnemySpawner {
    pub fn new(prefab: impl Into<PrefabPath>, mode: SpawnMode) -> Self {
        Self {
            prefab: Some(prefab.into()),
            mode,
            ..default()
        }
    }

    pub fn with_rate(mut self, spawn_rate: f32) -> Self {
        self.spawn_rate = spawn_rate;
        self
    }

    pub fn with_area(mut self, area_size: Vec3) -> Self {
        self.area_size = area_size;
        self
    }

    /// Пора ли спавнить по расписанию (Controlled - никогда)
    pub fn is_due(&self, now: f32) -> bool {
        self.mode != SpawnMode::Controlled && now > self.next_spawn_time
    }

    /// Спавн: сдвигает расписание и возвращает точку спавна
    ///
    /// None если prefab не задан.
    pub fn spawn(&mut self, origin: Vec3, now: f32, rng: &mut impl Rng) -> Option<Vec3> {
        self.prefab.as_ref()?;

        self.next_spawn_time = match self.mode {
            SpawnMode::Fixed => now + self.spawn_rate,
            SpawnMode::Random => now + self.spawn_rate * rng.gen::<f32>(),
            SpawnMode::Controlled => f32::INFINITY,
        };

        Some(self.spawn_location(origin, rng))
    }

    /// Случайная точка в области ±area_size/2 вокруг origin
    pub fn spawn_location(&self, origin: Vec3, rng: &mut impl Rng) -> Vec3 {
        let half = self.area_size.abs() * 0.5;
        let mut offset = |extent: f32| {
            if extent > 0.0 {
                rng.gen_range(-extent..extent)
            } else {
                0.0
            }
        };
        origin + Vec3::new(offset(half.x), offset(half.y), offset(half.z))
    }
}

/// Система (setup): отрицательный spawn_rate → 0
pub fn validate_spawners(mut spawners: Query<(Entity, &mut EnemySpawner), Added<EnemySpawner>>) {
    for (entity, mut spawner) in spawners.iter_mut() {
        if spawner.spawn_rate < 0.0 {
            crate::log_warning(&format!(
                "Spawner {:?} has negative spawn rate {}, using 0",
                entity, spawner.spawn_rate
            ));
            spawner.spawn_rate = 0.0;
        }
        if spawner.prefab.is_none() {
            crate::log_warning(&format!("Spawner {:?} has no prefab to spawn", entity));
        }
    }
}

/// Система: спавн по расписанию + по SpawnerTriggered
///
/// Каждый SpawnerTriggered = один спавн (swarm атака шлёт по событию на миньона).
pub fn run_spawners(
    mut trigger_events: EventReader<SpawnerTriggered>,
    mut spawners: Query<(Entity, &mut EnemySpawner, &Transform)>,
    mut spawn_events: EventWriter<PrefabSpawnRequested>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();

    for trigger in trigger_events.read() {
        let Ok((entity, mut spawner, transform)) = spawners.get_mut(trigger.spawner) else {
            crate::log_warning(&format!("Triggered spawner {:?} not found", trigger.spawner));
            continue;
        };
        if let Some(request) = spawn_request(entity, &mut spawner, transform.translation, now, &mut rng) {
            spawn_events.write(request);
        }
    }

    for (entity, mut spawner, transform) in spawners.iter_mut() {
        if !spawner.is_due(now) {
            continue;
        }
        if let Some(request) = spawn_request(entity, &mut spawner, transform.translation, now, &mut rng) {
            spawn_events.write(request);
        }
    }
}

fn spawn_request(
    entity: Entity,
    spawner: &mut EnemySpawner,
    origin: Vec3,
    now: f32,
    rng: &mut DeterministicRng,
) -> Option<PrefabSpawnRequested> {
    let position = spawner.spawn(origin, now, &mut rng.rng)?;
    Some(PrefabSpawnRequested {
        prefab: spawner.prefab.clone()?,
        position,
        rotation: Quat::IDENTITY,
        requested_by: Some(entity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_fixed_schedules_now_plus_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut spawner = EnemySpawner::new("enemies/crawler", SpawnMode::Fixed).with_rate(3.0);

        assert!(spawner.is_due(0.0));
        assert!(spawner.spawn(Vec3::ZERO, 2.0, &mut rng).is_some());
        assert_eq!(spawner.next_spawn_time, 5.0);
        assert!(!spawner.is_due(5.0));
        assert!(spawner.is_due(5.01));
    }

    #[test]
    fn test_random_schedules_within_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut spawner = EnemySpawner::new("enemies/crawler", SpawnMode::Random).with_rate(4.0);

        for step in 0..50 {
            let now = step as f32;
            spawner.spawn(Vec3::ZERO, now, &mut rng);
            assert!(spawner.next_spawn_time >= now);
            assert!(spawner.next_spawn_time <= now + 4.0);
        }
    }

    #[test]
    fn test_controlled_never_self_schedules() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut spawner = EnemySpawner::new("enemies/minion", SpawnMode::Controlled);

        assert!(!spawner.is_due(0.0));
        assert!(spawner.spawn(Vec3::ZERO, 1.0, &mut rng).is_some());
        assert_eq!(spawner.next_spawn_time, f32::INFINITY);
        assert!(!spawner.is_due(1000.0));
    }

    #[test]
    fn test_spawn_location_within_area() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let origin = Vec3::new(10.0, 0.0, -5.0);
        let spawner = EnemySpawner::new("enemies/crawler", SpawnMode::Fixed)
            .with_area(Vec3::new(4.0, 0.0, 2.0));

        for _ in 0..100 {
            let location = spawner.spawn_location(origin, &mut rng);
            assert!((location.x - origin.x).abs() <= 2.0);
            assert_eq!(location.y, origin.y);
            assert!((location.z - origin.z).abs() <= 1.0);
        }
    }

    #[test]
    fn test_spawner_without_prefab_does_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut spawner = EnemySpawner::default();

        assert!(spawner.spawn(Vec3::ZERO, 0.0, &mut rng).is_none());
        assert_eq!(spawner.next_spawn_time, f32::NEG_INFINITY);
    }

    fn spawner_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(DeterministicRng::new(11))
            .add_event::<SpawnerTriggered>()
            .add_event::<PrefabSpawnRequested>()
            .add_systems(Update, (validate_spawners, run_spawners).chain());
        app
    }

    #[test]
    fn test_triggered_controlled_spawner_spawns_once_per_event() {
        let mut app = spawner_app();
        let spawner = app
            .world_mut()
            .spawn((
                EnemySpawner::new("enemies/minion", SpawnMode::Controlled),
                Transform::from_xyz(0.0, 0.0, 8.0),
            ))
            .id();

        // Без триггера - ничего
        app.update();
        assert!(app
            .world_mut()
            .resource_mut::<Events<PrefabSpawnRequested>>()
            .drain()
            .next()
            .is_none());

        app.world_mut().send_event(SpawnerTriggered { spawner });
        app.world_mut().send_event(SpawnerTriggered { spawner });
        app.update();

        let spawned: Vec<PrefabSpawnRequested> = app
            .world_mut()
            .resource_mut::<Events<PrefabSpawnRequested>>()
            .drain()
            .collect();
        assert_eq!(spawned.len(), 2);
        assert!(spawned.iter().all(|s| s.requested_by == Some(spawner)));
        assert!(spawned.iter().all(|s| s.position == Vec3::new(0.0, 0.0, 8.0)));
    }

    #[test]
    fn test_negative_rate_corrected_to_zero() {
        let mut app = spawner_app();
        let spawner = app
            .world_mut()
            .spawn(EnemySpawner::new("enemies/crawler", SpawnMode::Fixed).with_rate(-2.0))
            .id();

        app.update();

        let spawner = app.world().get::<EnemySpawner>(spawner).map(|s| s.spawn_rate);
        assert_eq!(spawner, Some(0.0));
    }
}
