//! Tests for health/lifecycle systems.

#[cfg(test)]
mod tests {
    use crate::combat::{
        ActorDied, ActorRespawned, AddLivesRequest, DamageDealt, DamageRequest, GameOver,
        HealRequest, Health, HealthChanged, Ragdoll, Ragdolled,
    };
    use crate::components::{MovementController, Player};
    use crate::lifecycle::{DestroyRequested, SpawnEffect, TimedDestroyer};
    use crate::shooting::{Gun, Shooter};
    use bevy::prelude::*;
    use super::super::health::*;

    /// App с health системами; Time не тикает (now = 0.0)
    fn health_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_event::<DamageRequest>()
            .add_event::<HealRequest>()
            .add_event::<AddLivesRequest>()
            .add_event::<DamageDealt>()
            .add_event::<HealthChanged>()
            .add_event::<SpawnEffect>()
            .add_event::<ActorDied>()
            .add_event::<DestroyRequested>()
            .add_event::<GameOver>()
            .add_event::<ActorRespawned>()
            .add_systems(
                Update,
                (
                    init_respawn_points,
                    apply_damage_requests,
                    apply_heal_requests,
                    apply_add_lives_requests,
                    handle_actor_deaths,
                    tick_respawns,
                )
                    .chain(),
            );
        app
    }

    fn drain<E: Event>(app: &mut App) -> Vec<E> {
        app.world_mut().resource_mut::<Events<E>>().drain().collect()
    }

    fn damage(app: &mut App, target: Entity, amount: i32) {
        app.world_mut().send_event(DamageRequest {
            target,
            amount,
            source: None,
        });
    }

    #[test]
    fn test_damage_request_reports_and_respects_invulnerability() {
        let mut app = health_app();
        let target = app
            .world_mut()
            .spawn((Health::new(100), Transform::default()))
            .id();

        damage(&mut app, target, 30);
        damage(&mut app, target, 30); // тот же тик → неуязвим
        app.update();

        let dealt: Vec<DamageDealt> = drain(&mut app);
        assert_eq!(dealt.len(), 1);
        assert_eq!(dealt[0].damage, 30);
        assert!(!dealt[0].target_died);

        let changed: Vec<HealthChanged> = drain(&mut app);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].current, 70);
        assert_eq!(app.world().get::<Health>(target).map(|h| h.current_health), Some(70));
    }

    #[test]
    fn test_final_enemy_death_requests_destroy() {
        let mut app = health_app();
        let enemy = app
            .world_mut()
            .spawn((Health::new(10), Transform::default(), MovementController::default()))
            .id();

        damage(&mut app, enemy, 50);
        app.update();

        let died: Vec<ActorDied> = drain(&mut app);
        assert_eq!(died.len(), 1);
        assert!(died[0].final_death);

        let destroyed: Vec<DestroyRequested> = drain(&mut app);
        assert_eq!(destroyed, vec![DestroyRequested { entity: enemy }]);
        assert!(drain::<GameOver>(&mut app).is_empty());
        assert_eq!(
            app.world().get::<MovementController>(enemy).map(|c| c.enabled),
            Some(false)
        );
    }

    #[test]
    fn test_final_player_death_is_game_over() {
        let mut app = health_app();
        let player = app
            .world_mut()
            .spawn((Player, Health::new(10), Transform::default()))
            .id();

        damage(&mut app, player, 10);
        app.update();

        let game_over: Vec<GameOver> = drain(&mut app);
        assert_eq!(game_over, vec![GameOver { player }]);
    }

    #[test]
    fn test_ragdoll_replaces_destroy() {
        let mut app = health_app();
        let enemy = app
            .world_mut()
            .spawn((Health::new(10), Transform::default(), Ragdoll { lifetime: 4.0 }))
            .id();

        damage(&mut app, enemy, 10);
        app.update();

        assert!(drain::<DestroyRequested>(&mut app).is_empty());
        assert!(app.world().get::<Ragdolled>(enemy).is_some());
        assert_eq!(
            app.world().get::<TimedDestroyer>(enemy).map(|d| d.lifetime),
            Some(4.0)
        );
    }

    #[test]
    fn test_immediate_respawn_restores_actor() {
        let mut app = health_app();

        let gun = app
            .world_mut()
            .spawn((
                Gun::default(),
                Transform::from_rotation(Quat::from_euler(EulerRot::YXZ, 0.5, 0.7, 0.0)),
            ))
            .id();
        let player = app
            .world_mut()
            .spawn((
                Player,
                Health::new(10)
                    .with_lives(2, 5)
                    .with_respawn_wait_time(0.0),
                Transform::from_xyz(5.0, 0.0, 0.0),
                MovementController::default(),
                Shooter {
                    guns: vec![gun],
                    ..default()
                },
            ))
            .id();

        // Setup: respawn point = позиция спавна
        app.update();
        if let Some(mut transform) = app.world_mut().get_mut::<Transform>(player) {
            transform.translation = Vec3::new(9.0, 0.0, 0.0);
        }

        damage(&mut app, player, 10);
        app.update();

        let world = app.world();
        let health = world.get::<Health>(player).map(|h| (h.current_health, h.current_lives));
        assert_eq!(health, Some((10, 1)));
        assert_eq!(
            world.get::<Transform>(player).map(|t| t.translation),
            Some(Vec3::new(5.0, 0.0, 0.0))
        );
        assert_eq!(
            world.get::<MovementController>(player).map(|c| c.enabled),
            Some(true)
        );

        let (yaw, pitch, _) = world
            .get::<Transform>(gun)
            .map(|t| t.rotation.to_euler(EulerRot::YXZ))
            .unwrap_or_default();
        assert!((yaw - 0.5).abs() < 1e-4);
        assert!(pitch.abs() < 1e-4);

        let respawned: Vec<ActorRespawned> = drain(&mut app);
        assert_eq!(respawned.len(), 1);
        assert!(drain::<GameOver>(&mut app).is_empty());
    }

    #[test]
    fn test_heal_and_add_lives_requests() {
        let mut app = health_app();
        let target = app
            .world_mut()
            .spawn((
                Health::new(10).with_lives(1, 3).with_invincibility_time(0.0),
                Transform::default(),
            ))
            .id();

        damage(&mut app, target, 6);
        app.update();

        app.world_mut().send_event(HealRequest { target, amount: 100 });
        app.world_mut().send_event(AddLivesRequest { target, amount: 5 });
        app.update();

        let health = app.world().get::<Health>(target).map(|h| (h.current_health, h.current_lives));
        assert_eq!(health, Some((10, 3)));
    }

    #[test]
    fn test_negative_healing_kills_and_spends_a_life() {
        let mut app = health_app();
        let player = app
            .world_mut()
            .spawn((
                Player,
                Health::new(10).with_lives(2, 5),
                Transform::default(),
            ))
            .id();

        // Второй запрос в тот же тик попадает в уже мёртвого
        app.world_mut().send_event(HealRequest { target: player, amount: -15 });
        app.world_mut().send_event(HealRequest { target: player, amount: -15 });
        app.update();

        let died: Vec<ActorDied> = drain(&mut app);
        assert_eq!(died.len(), 1);
        assert_eq!(died[0].entity, player);
        assert!(!died[0].final_death);

        let health = app.world().get::<Health>(player).expect("player health");
        assert_eq!(health.current_health, 0);
        assert_eq!(health.current_lives, 1);
        assert!(!health.is_alive());
        assert!(drain::<GameOver>(&mut app).is_empty());
    }

    #[test]
    fn test_negative_healing_final_death_destroys_enemy() {
        let mut app = health_app();
        let enemy = app
            .world_mut()
            .spawn((Health::new(4), Transform::default()))
            .id();

        app.world_mut().send_event(HealRequest { target: enemy, amount: -4 });
        app.update();

        let died: Vec<ActorDied> = drain(&mut app);
        assert_eq!(died.len(), 1);
        assert!(died[0].final_death);
        assert_eq!(
            drain::<DestroyRequested>(&mut app),
            vec![DestroyRequested { entity: enemy }]
        );
        assert_eq!(app.world().get::<Health>(enemy).map(|h| h.current_health), Some(0));
    }

    #[test]
    fn test_zero_pitch_keeps_yaw() {
        let rotation = Quat::from_euler(EulerRot::YXZ, 1.2, -0.4, 0.0);
        let (yaw, pitch, _) = zero_pitch(rotation).to_euler(EulerRot::YXZ);
        assert!((yaw - 1.2).abs() < 1e-4);
        assert!(pitch.abs() < 1e-4);
    }
}
