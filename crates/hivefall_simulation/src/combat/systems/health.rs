//! Health/Lifecycle systems: damage/heal requests, death consequences, respawn.

use bevy::prelude::*;

use crate::combat::{
    ActorDied, ActorRespawned, AddLivesRequest, DamageDealt, DamageRequest, Death, GameOver,
    HealRequest, Health, HealthChange, HealthChanged, Ragdoll, Ragdolled,
};
use crate::components::{MovementController, Player};
use crate::lifecycle::{DestroyRequested, SpawnEffect, TimedDestroyer};
use crate::shooting::{Gun, Shooter};

fn health_changed(entity: Entity, health: &Health) -> HealthChanged {
    HealthChanged {
        entity,
        current: health.current_health,
        maximum: health.maximum_health,
        lives: health.current_lives,
    }
}

/// Система: respawn point по умолчанию = позиция при спавне
pub fn init_respawn_points(mut healths: Query<(&mut Health, &Transform), Added<Health>>) {
    for (mut health, transform) in healths.iter_mut() {
        if health.respawn_point.is_none() {
            health.set_respawn_point(transform.translation);
        }
    }
}

/// Система: DamageRequest → Health::take_damage
///
/// No-op урон (неуязвимость, мёртв) молча игнорируется.
pub fn apply_damage_requests(
    mut damage_events: EventReader<DamageRequest>,
    mut healths: Query<(&mut Health, Option<&Transform>)>,
    mut dealt_events: EventWriter<DamageDealt>,
    mut changed_events: EventWriter<HealthChanged>,
    mut effect_events: EventWriter<SpawnEffect>,
    mut died_events: EventWriter<ActorDied>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();

    for request in damage_events.read() {
        let Ok((mut health, transform)) = healths.get_mut(request.target) else {
            continue;
        };

        let Some(change) = health.take_damage(request.amount, now) else {
            continue;
        };

        if let (Some(effect), Some(transform)) = (&health.hit_effect, transform) {
            effect_events.write(SpawnEffect {
                prefab: effect.clone(),
                position: transform.translation,
                rotation: transform.rotation,
            });
        }

        dealt_events.write(DamageDealt {
            attacker: request.source,
            target: request.target,
            damage: change.previous - change.current,
            target_died: change.death.is_some(),
        });
        changed_events.write(health_changed(request.target, &health));

        report_death(request.target, request.source, change, &mut died_events);
    }
}

/// Система: HealRequest → Health::receive_healing
pub fn apply_heal_requests(
    mut heal_events: EventReader<HealRequest>,
    mut healths: Query<&mut Health>,
    mut changed_events: EventWriter<HealthChanged>,
    mut died_events: EventWriter<ActorDied>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();

    for request in heal_events.read() {
        let Ok(mut health) = healths.get_mut(request.target) else {
            continue;
        };

        let Some(change) = health.receive_healing(request.amount, now) else {
            continue;
        };

        changed_events.write(health_changed(request.target, &health));
        report_death(request.target, None, change, &mut died_events);
    }
}

/// Система: AddLivesRequest → Health::add_lives
pub fn apply_add_lives_requests(
    mut lives_events: EventReader<AddLivesRequest>,
    mut healths: Query<&mut Health>,
    mut changed_events: EventWriter<HealthChanged>,
) {
    for request in lives_events.read() {
        let Ok(mut health) = healths.get_mut(request.target) else {
            continue;
        };

        if health.add_lives(request.amount) {
            changed_events.write(health_changed(request.target, &health));
        }
    }
}

fn report_death(
    entity: Entity,
    killer: Option<Entity>,
    change: HealthChange,
    died_events: &mut EventWriter<ActorDied>,
) {
    let Some(death) = change.death else {
        return;
    };

    crate::log_info(&format!("💀 Entity {:?} died ({:?}), killer {:?}", entity, death, killer));
    died_events.write(ActorDied {
        entity,
        killer,
        final_death: death == Death::Final,
    });
}

/// Система: последствия смерти
///
/// - death effect, ragdoll (если настроен), выключить MovementController
/// - финальная смерть: GameOver для Player, DestroyRequested если нет ragdoll
///   (ragdoll убирается через TimedDestroyer)
pub fn handle_actor_deaths(
    mut commands: Commands,
    mut died_events: EventReader<ActorDied>,
    mut actors: Query<(
        &Health,
        Option<&Transform>,
        Option<&Ragdoll>,
        Option<&mut MovementController>,
        Has<Player>,
    )>,
    mut effect_events: EventWriter<SpawnEffect>,
    mut destroy_events: EventWriter<DestroyRequested>,
    mut game_over_events: EventWriter<GameOver>,
) {
    for event in died_events.read() {
        let Ok((health, transform, ragdoll, controller, is_player)) = actors.get_mut(event.entity)
        else {
            continue;
        };

        if let (Some(effect), Some(transform)) = (&health.death_effect, transform) {
            effect_events.write(SpawnEffect {
                prefab: effect.clone(),
                position: transform.translation,
                rotation: transform.rotation,
            });
        }

        if let Some(mut controller) = controller {
            controller.enabled = false;
        }

        if let Some(ragdoll) = ragdoll {
            let mut entity_commands = commands.entity(event.entity);
            entity_commands.insert(Ragdolled);
            if event.final_death {
                entity_commands.insert(TimedDestroyer::new(ragdoll.lifetime));
            }
        }

        if !event.final_death {
            continue;
        }

        if is_player {
            crate::log_info(&format!("☠️ GAME OVER (player {:?})", event.entity));
            game_over_events.write(GameOver {
                player: event.entity,
            });
        }

        if ragdoll.is_none() {
            destroy_events.write(DestroyRequested {
                entity: event.entity,
            });
        }
    }
}

/// Система: respawn по deadline
///
/// Позиция → respawn point, MovementController включён, pitch оружия обнулён,
/// здоровье по умолчанию, неуязвимость снята.
pub fn tick_respawns(
    mut commands: Commands,
    mut actors: Query<(
        Entity,
        &mut Health,
        &mut Transform,
        Option<&mut MovementController>,
        Option<&Shooter>,
    ), Without<Gun>>,
    mut guns: Query<&mut Transform, With<Gun>>,
    mut respawned_events: EventWriter<ActorRespawned>,
    mut changed_events: EventWriter<HealthChanged>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();

    for (entity, mut health, mut transform, controller, shooter) in actors.iter_mut() {
        if !health.respawn_due(now) {
            continue;
        }

        let position = health.respawn_point.unwrap_or(transform.translation);
        transform.translation = position;

        if let Some(mut controller) = controller {
            controller.enabled = true;
        }

        if let Some(shooter) = shooter {
            for &gun in &shooter.guns {
                if let Ok(mut gun_transform) = guns.get_mut(gun) {
                    gun_transform.rotation = zero_pitch(gun_transform.rotation);
                }
            }
        }

        health.respawn();
        commands.entity(entity).remove::<Ragdolled>();

        crate::log_info(&format!("✨ Entity {:?} respawned at {:?}", entity, position));
        respawned_events.write(ActorRespawned { entity, position });
        changed_events.write(health_changed(entity, &health));
    }
}

/// Обнулить pitch (поворот вокруг X), сохранив yaw и roll
pub fn zero_pitch(rotation: Quat) -> Quat {
    let (yaw, _pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_euler(EulerRot::YXZ, yaw, 0.0, roll)
}
