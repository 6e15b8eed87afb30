//! Headless симуляция HIVEFALL
//!
//! Улей со swarm атакой, melee враги и игрок без рендера.
//! Аргумент: путь к JSON SimulationConfig (опционально).

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use hivefall_simulation::ai::StationaryLocomotion;
use hivefall_simulation::combat::{AttackPayload, MeleeHitbox};
use hivefall_simulation::*;

fn load_config() -> SimulationConfig {
    let Some(path) = std::env::args().nth(1) else {
        return SimulationConfig::default();
    };

    match std::fs::read_to_string(&path) {
        Ok(json) => SimulationConfig::from_json(&json).unwrap_or_else(|error| {
            log_error(&format!("Invalid config {}: {}", path, error));
            SimulationConfig::default()
        }),
        Err(error) => {
            log_error(&format!("Failed to read config {}: {}", path, error));
            SimulationConfig::default()
        }
    }
}

/// Presentation-заглушка: печатает ключевые события симуляции
fn print_events(
    mut died_events: EventReader<ActorDied>,
    mut spawn_events: EventReader<PrefabSpawnRequested>,
    mut game_over_events: EventReader<GameOver>,
    mut level_events: EventReader<LevelCleared>,
) {
    for died in died_events.read() {
        println!("died: {:?} (final: {})", died.entity, died.final_death);
    }
    for request in spawn_events.read() {
        println!("spawn: {} at {:?}", request.prefab.path, request.position);
    }
    for event in game_over_events.read() {
        println!("game over: {:?}", event.player);
    }
    for event in level_events.read() {
        println!("level cleared by destroying {:?}", event.hive);
    }
}

fn main() {
    init_logger();
    set_log_level(LogLevel::Info);

    let config = load_config();
    println!("Starting HIVEFALL headless simulation (seed: {})", config.seed);

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin::new(config.clone()))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / config.effective_tick_hz(),
        )))
        .add_systems(FixedUpdate, print_events.after(SimulationSet::Cleanup));

    let world = app.world_mut();
    world.spawn((
        Transform::from_xyz(0.0, 0.0, -8.0),
        Actor::new(1),
        Player,
        Health::new(5).with_lives(3, 5).with_invincibility_time(1.0),
    ));

    let spawners: Vec<Entity> = [-6.0, 6.0]
        .into_iter()
        .map(|x| {
            world
                .spawn((
                    EnemySpawner::new("enemies/minion", SpawnMode::Controlled)
                        .with_area(Vec3::new(2.0, 0.0, 2.0)),
                    Transform::from_xyz(x, 0.0, 4.0),
                ))
                .id()
        })
        .collect();

    world.spawn((
        Transform::default(),
        Actor::new(2),
        EnemyBehavior::attacking(30.0).without_sight_checks(),
        Locomotion::Hive(StationaryLocomotion),
        Attacker::new(AttackPayload::Swarm {
            spawners,
            minimum_to_spawn: 1,
            maximum_to_spawn: 3,
        })
        .with_timing(1.0, 4.0),
        Health::new(50),
        OnDestroyEffect {
            prefab: PrefabPath::new("fx/hive_explosion"),
        },
    ));

    for x in [-3.0, 3.0] {
        let enemy = world
            .spawn((
                Transform::from_xyz(x, 0.0, 6.0),
                Actor::new(2),
                EnemyBehavior::attacking(1.8).without_sight_checks(),
                LineOfSight {
                    has_sight: true,
                    ..default()
                },
                Locomotion::ground(),
                NavAgent::default(),
                Health::new(2),
                EnemyDrops::new([
                    (PrefabPath::new("pickups/ammo"), 0.6),
                    (PrefabPath::new("pickups/health"), 0.2),
                ]),
            ))
            .id();
        let hitbox = world
            .spawn(combat::melee_hitbox_bundle(MeleeHitbox::new(enemy, 1, 0.8)))
            .id();
        world
            .entity_mut(enemy)
            .insert(Attacker::new(AttackPayload::Melee {
                hitboxes: vec![hitbox],
            }));
    }

    // 10 секунд симуляции
    let ticks = (config.effective_tick_hz() * 10.0) as usize;
    for tick in 0..ticks {
        app.update();

        if tick % 60 == 0 {
            let entity_count = app.world().entities().len();
            println!("Tick {}: {} entities", tick, entity_count);
        }
    }

    app.world_mut().send_event(AppExit::Success);
    app.update();

    println!("Simulation complete!");
}
