//! Combat integration test
//!
//! Headless сценарии враг vs игрок через полный SimulationPlugin:
//! - melee атака наносит урон игроку (один раз за окно неуязвимости)
//! - ActionState инвариант (ровно одно состояние) каждый тик
//! - lives/respawn игрока и GameOver
//! - ground враг останавливается на stop distance
//! - explosive враг уничтожает себя, улей даёт LevelCleared
//! - swarm атака улья спавнит миньонов через controlled спавнеры
//! - ranged атака стреляет в тот же тик, что и стартует
//! - диверсия уводит ground врага без LOS

use std::time::Duration;

use bevy::ecs::schedule::{LogLevel as AmbiguityLevel, ScheduleBuildSettings};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use hivefall_simulation::ai::{ActionFlags, StationaryLocomotion};
use hivefall_simulation::combat::{AttackPayload, AttackStarted, DamageRequest, MeleeHitbox};
use hivefall_simulation::shooting::{Gun, GunFired, Shooter};
use hivefall_simulation::*;

/// События симуляции, собранные за прогон
#[derive(Resource, Default)]
struct Recorded {
    /// Номер текущего fixed тика
    tick: u32,
    game_overs: Vec<Entity>,
    levels_cleared: Vec<Entity>,
    spawned: Vec<PrefabSpawnRequested>,
    /// Тики, на которых стартовали атаки / стреляло оружие
    attacks_started: Vec<u32>,
    guns_fired: Vec<u32>,
}

fn record_events(
    mut game_over_events: EventReader<GameOver>,
    mut level_events: EventReader<LevelCleared>,
    mut spawn_events: EventReader<PrefabSpawnRequested>,
    mut attack_events: EventReader<AttackStarted>,
    mut fired_events: EventReader<GunFired>,
    mut recorded: ResMut<Recorded>,
) {
    recorded.tick += 1;
    let tick = recorded.tick;
    recorded
        .attacks_started
        .extend(attack_events.read().map(|_| tick));
    recorded.guns_fired.extend(fired_events.read().map(|_| tick));
    recorded
        .game_overs
        .extend(game_over_events.read().map(|event| event.player));
    recorded
        .levels_cleared
        .extend(level_events.read().map(|event| event.hive));
    recorded.spawned.extend(spawn_events.read().cloned());
}

/// Helper: headless App с ручным временем (1/60 сек на update)
fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )))
    .init_resource::<Recorded>()
    .add_systems(FixedUpdate, record_events.after(SimulationSet::Cleanup));
    app
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

fn spawn_player(app: &mut App, position: Vec3, health: Health) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            Actor::new(1),
            Player,
            health,
        ))
        .id()
}

/// Helper: melee враг смотрит по -Z, hitbox на 1м перед ним
fn spawn_melee_enemy(app: &mut App, position: Vec3) -> (Entity, Entity) {
    let enemy = app
        .world_mut()
        .spawn((
            Transform::from_translation(position),
            Actor::new(2),
            EnemyBehavior::attacking(2.0).without_sight_checks(),
            Locomotion::default(),
            Health::new(3),
        ))
        .id();
    let hitbox = app.world_mut().spawn(MeleeHitbox::new(enemy, 1, 1.0)).id();
    app.world_mut().entity_mut(enemy).insert(Attacker::new(AttackPayload::Melee {
        hitboxes: vec![hitbox],
    }));
    (enemy, hitbox)
}

/// Test: melee враг бьёт игрока в радиусе, неуязвимость гасит повторные удары
#[test]
fn test_melee_enemy_damages_player() {
    let mut app = create_combat_app(42);

    let player = spawn_player(&mut app, Vec3::new(0.0, 0.0, -1.5), Health::new(3));
    let (enemy, _hitbox) = spawn_melee_enemy(&mut app, Vec3::ZERO);

    run_ticks(&mut app, 20);

    let world = app.world();
    assert_eq!(world.get::<Target>(enemy).and_then(Target::get), Some(player));
    assert_eq!(world.get::<Health>(player).map(|h| h.current_health), Some(2));
    assert_eq!(world.get::<ActionState>(enemy), Some(&ActionState::Attacking));
}

/// Test: вне радиуса атаки враг не атакует и не стоит в Attacking
#[test]
fn test_enemy_out_of_range_does_not_attack() {
    let mut app = create_combat_app(42);

    let player = spawn_player(&mut app, Vec3::new(0.0, 0.0, -8.0), Health::new(3));
    let (enemy, hitbox) = spawn_melee_enemy(&mut app, Vec3::ZERO);

    run_ticks(&mut app, 60);

    let world = app.world();
    assert_eq!(world.get::<Health>(player).map(|h| h.current_health), Some(3));
    assert!(world.get::<MeleeHitbox>(hitbox).is_some_and(|h| !h.enabled));
    assert_ne!(world.get::<ActionState>(enemy), Some(&ActionState::Attacking));
}

/// Test: ActionState ровно одно и совпадает с флагами на каждом тике
#[test]
fn test_action_state_invariant_every_tick() {
    let mut app = create_combat_app(7);

    spawn_player(&mut app, Vec3::new(0.0, 0.0, -1.5), Health::new(100).with_invincibility_time(0.0));
    let (enemy, _) = spawn_melee_enemy(&mut app, Vec3::ZERO);

    for tick in 0..300 {
        app.update();

        let world = app.world();
        let Some(flags) = world.get::<ActionFlags>(enemy) else {
            panic!("Tick {}: enemy lost ActionFlags", tick);
        };
        let set = [flags.is_idle, flags.is_moving, flags.is_attacking]
            .iter()
            .filter(|flag| **flag)
            .count();
        assert!(set >= 1, "Tick {}: no action flag set", tick);
        assert!(
            !(flags.is_idle && (flags.is_moving || flags.is_attacking)),
            "Tick {}: idle together with another action",
            tick
        );
        assert_eq!(
            world.get::<ActionState>(enemy).copied(),
            Some(ActionState::from(*flags)),
            "Tick {}: ActionState does not match flags",
            tick
        );
    }
}

/// Test: 2 жизни - respawn после первой смерти, GameOver после второй
#[test]
fn test_player_lives_and_game_over() {
    let mut app = create_combat_app(42);

    let spawn_point = Vec3::new(3.0, 0.0, 3.0);
    let player = spawn_player(
        &mut app,
        spawn_point,
        Health::new(1)
            .with_lives(2, 5)
            .with_invincibility_time(0.0)
            .with_respawn_wait_time(0.5),
    );
    run_ticks(&mut app, 2);

    // Смерть #1 вдали от точки respawn
    if let Some(mut transform) = app.world_mut().get_mut::<Transform>(player) {
        transform.translation = Vec3::new(-20.0, 0.0, 0.0);
    }
    app.world_mut().send_event(DamageRequest {
        target: player,
        amount: 5,
        source: None,
    });
    run_ticks(&mut app, 2);

    {
        let world = app.world();
        let health = world.get::<Health>(player).expect("player health");
        assert_eq!(health.current_lives, 1);
        assert!(!health.is_alive());
        assert!(world.get::<MovementController>(player).is_some_and(|c| !c.enabled));
    }

    // respawn_wait_time 0.5 сек ≈ 30 тиков
    run_ticks(&mut app, 45);
    {
        let world = app.world();
        let health = world.get::<Health>(player).expect("player health");
        assert!(health.is_alive());
        assert_eq!(health.current_health, 1);
        assert_eq!(world.get::<Transform>(player).map(|t| t.translation), Some(spawn_point));
        assert!(world.get::<MovementController>(player).is_some_and(|c| c.enabled));
    }
    assert!(app.world().resource::<Recorded>().game_overs.is_empty());

    // Смерть #2 - жизней не осталось
    app.world_mut().send_event(DamageRequest {
        target: player,
        amount: 1,
        source: None,
    });
    run_ticks(&mut app, 3);

    assert_eq!(app.world().resource::<Recorded>().game_overs, vec![player]);
    assert!(app.world().get_entity(player).is_err());
}

/// Test: ground враг подходит к цели и останавливается на stop distance
#[test]
fn test_ground_enemy_stops_at_stop_distance() {
    let mut app = create_combat_app(42);

    let player = spawn_player(&mut app, Vec3::ZERO, Health::new(10));
    let enemy = app
        .world_mut()
        .spawn((
            Transform::from_xyz(10.0, 0.0, 0.0),
            Actor::new(2),
            EnemyBehavior::default().without_sight_checks(),
            LineOfSight {
                has_sight: true,
                ..default()
            },
            Locomotion::ground(),
            NavAgent::default(),
        ))
        .id();

    run_ticks(&mut app, 30);
    let halfway = app
        .world()
        .get::<Transform>(enemy)
        .map(|t| t.translation.distance(Vec3::ZERO))
        .unwrap_or_default();
    assert!(halfway < 10.0, "enemy did not approach: {}", halfway);
    assert!(halfway > 2.0);

    run_ticks(&mut app, 600);

    let world = app.world();
    let distance = world
        .get::<Transform>(enemy)
        .map(|t| t.translation.distance(Vec3::ZERO))
        .unwrap_or_default();
    assert!(distance <= 2.0 + 1e-3, "enemy overshot stop distance: {}", distance);
    assert!(distance > 1.9, "enemy walked into the target: {}", distance);
    assert_eq!(world.get::<Target>(enemy).and_then(Target::get), Some(player));
}

/// Test: камикадзе взрывается в конце атаки и уничтожает себя
#[test]
fn test_explosive_enemy_destroys_itself() {
    let mut app = create_combat_app(42);

    spawn_player(&mut app, Vec3::new(0.0, 0.0, -1.0), Health::new(3));
    let enemy = app
        .world_mut()
        .spawn((
            Transform::default(),
            Actor::new(2),
            EnemyBehavior::attacking(2.0).without_sight_checks(),
            Locomotion::default(),
            Attacker::new(AttackPayload::explosive(Some(PrefabPath::new("fx/explosion")))),
        ))
        .id();

    // attack_duration 0.5 сек
    run_ticks(&mut app, 10);
    assert!(app.world().get_entity(enemy).is_ok());

    run_ticks(&mut app, 40);
    assert!(app.world().get_entity(enemy).is_err());
}

/// Test: уничтожение улья = LevelCleared
#[test]
fn test_hive_destruction_clears_level() {
    let mut app = create_combat_app(42);

    let hive = app
        .world_mut()
        .spawn((
            Transform::default(),
            Actor::new(2),
            Locomotion::Hive(StationaryLocomotion),
            Health::new(5),
        ))
        .id();
    run_ticks(&mut app, 1);

    app.world_mut().send_event(DamageRequest {
        target: hive,
        amount: 10,
        source: None,
    });
    run_ticks(&mut app, 3);

    assert_eq!(app.world().resource::<Recorded>().levels_cleared, vec![hive]);
    assert!(app.world().get_entity(hive).is_err());
}

/// Test: swarm атака улья - миньоны только через controlled спавнеры, количество в [min, max]
#[test]
fn test_hive_swarm_spawns_minions_through_spawners() {
    let mut app = create_combat_app(99);

    spawn_player(&mut app, Vec3::new(0.0, 0.0, -4.0), Health::new(3));
    let spawners: Vec<Entity> = (0..2)
        .map(|i| {
            app.world_mut()
                .spawn((
                    EnemySpawner::new("enemies/minion", SpawnMode::Controlled),
                    Transform::from_xyz(i as f32 * 5.0, 0.0, 0.0),
                ))
                .id()
        })
        .collect();

    app.world_mut().spawn((
        Transform::default(),
        Actor::new(2),
        EnemyBehavior::attacking(10.0).without_sight_checks(),
        Locomotion::Hive(StationaryLocomotion),
        Attacker::new(AttackPayload::Swarm {
            spawners: spawners.clone(),
            minimum_to_spawn: 2,
            maximum_to_spawn: 4,
        })
        .with_timing(0.5, 10.0),
    ));

    // До конца первой атаки спавнеры молчат
    run_ticks(&mut app, 15);
    assert!(app.world().resource::<Recorded>().spawned.is_empty());

    // Конец атаки (0.5 сек), cooldown 10 сек - ровно одна волна
    run_ticks(&mut app, 60);

    let recorded = app.world().resource::<Recorded>();
    let minions: Vec<&PrefabSpawnRequested> = recorded
        .spawned
        .iter()
        .filter(|request| request.requested_by.is_some_and(|by| spawners.contains(&by)))
        .collect();
    assert!(
        (2..=4).contains(&minions.len()),
        "swarm spawned {} minions",
        minions.len()
    );
    assert!(minions
        .iter()
        .all(|request| request.prefab == PrefabPath::new("enemies/minion")));
}

/// Test: FireRequested от ranged атаки обрабатывается в тот же тик, что и AttackStarted
#[test]
fn test_ranged_attack_fires_on_launch_tick() {
    let mut app = create_combat_app(42);

    spawn_player(&mut app, Vec3::new(0.0, 0.0, -6.0), Health::new(100));
    let turret = app
        .world_mut()
        .spawn((
            Transform::default(),
            Actor::new(2),
            EnemyBehavior::attacking(10.0).without_sight_checks(),
            Locomotion::Hive(StationaryLocomotion),
        ))
        .id();
    let gun = app
        .world_mut()
        .spawn((
            Gun::new("projectiles/laser"),
            Transform::from_xyz(0.0, 1.0, 0.0),
            ChildOf(turret),
        ))
        .id();
    app.world_mut().entity_mut(turret).insert((
        Shooter::new(vec![gun]),
        Attacker::new(AttackPayload::Ranged {
            shooter: Some(turret),
        })
        .with_timing(0.2, 0.5),
    ));

    run_ticks(&mut app, 90);

    let recorded = app.world().resource::<Recorded>();
    assert!(recorded.attacks_started.len() >= 2, "turret attacked {:?}", recorded.attacks_started);
    assert_eq!(recorded.attacks_started, recorded.guns_fired);
}

/// Test: в FixedUpdate нет систем с конфликтующим доступом без явного порядка
#[test]
fn test_fixed_schedule_has_no_ambiguous_systems() {
    let mut app = create_combat_app(42);
    app.edit_schedule(FixedUpdate, |schedule| {
        schedule.set_build_settings(ScheduleBuildSettings {
            ambiguity_detection: AmbiguityLevel::Error,
            ..default()
        });
    });

    spawn_player(&mut app, Vec3::ZERO, Health::new(3));

    // Build расписания паникует при неоднозначном порядке
    run_ticks(&mut app, 3);
}

/// Test: диверсия уводит ground врага даже без LOS к цели
#[test]
fn test_diversion_moves_enemy_without_sight() {
    let mut app = create_combat_app(42);

    spawn_player(&mut app, Vec3::new(0.0, 0.0, -10.0), Health::new(10));
    let enemy = app
        .world_mut()
        .spawn((
            Transform::default(),
            Actor::new(2),
            EnemyBehavior::default(),
            LineOfSight::default(),
            Locomotion::ground(),
            NavAgent::default(),
        ))
        .id();

    // Без LOS движение запрещено - враг стоит
    run_ticks(&mut app, 10);
    assert_eq!(
        app.world().get::<Transform>(enemy).map(|t| t.translation),
        Some(Vec3::ZERO)
    );

    let now = app.world().resource::<Time<Fixed>>().elapsed_secs();
    if let Some(mut locomotion) = app.world_mut().get_mut::<Locomotion>(enemy) {
        if let Some(ground) = locomotion.as_ground_mut() {
            ground.go_to_point(Vec3::new(10.0, 0.0, 0.0), 5.0, now);
        }
    }

    // ~2 сек при 3.5 м/с
    run_ticks(&mut app, 120);

    let world = app.world();
    let position = world
        .get::<Transform>(enemy)
        .map(|t| t.translation)
        .unwrap_or_default();
    assert!(position.x > 4.0, "diverted enemy stayed at {:?}", position);
    assert!(position.x < 10.0);
    assert!(world
        .get::<Locomotion>(enemy)
        .is_some_and(|locomotion| matches!(locomotion, Locomotion::Ground(ground) if ground.is_diverting())));
    assert_eq!(world.get::<ActionState>(enemy), Some(&ActionState::Moving));
}
