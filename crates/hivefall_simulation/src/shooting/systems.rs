//! Shooting systems: fire, reload, gun smoke, gun pickups.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::Target;
use crate::lifecycle::{PrefabSpawnRequested, SpawnEffect};
use crate::shooting::{AmmoReserve, FireRequested, Gun, GunFired, GunPickedUp, GunSmoke, Shooter};
use crate::DeterministicRng;

/// Система: FireRequested → выстрел экипированного оружия
///
/// Выстрел если прошёл fire_delay, нет перезарядки и есть патроны:
/// - maximum_to_fire снарядов с разбросом ±maximum_spread_degrees
/// - fire effect, GunFired, расход патронов (reserve + магазин)
///
/// Пустой магазин у оружия с must_reload → старт перезарядки.
pub fn fire_guns(
    mut fire_events: EventReader<FireRequested>,
    shooters: Query<(&Shooter, Option<&Target>, Option<&ChildOf>)>,
    owner_targets: Query<&Target>,
    mut guns: Query<(&mut Gun, &Transform, Option<&ChildOf>)>,
    transforms: Query<&Transform>,
    mut reserve: ResMut<AmmoReserve>,
    mut rng: ResMut<DeterministicRng>,
    mut spawn_events: EventWriter<PrefabSpawnRequested>,
    mut effect_events: EventWriter<SpawnEffect>,
    mut fired_events: EventWriter<GunFired>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();

    for request in fire_events.read() {
        let Ok((shooter, shooter_target, shooter_parent)) = shooters.get(request.shooter) else {
            continue;
        };
        let Some(gun_entity) = shooter.equipped_gun() else {
            continue;
        };
        let Ok((mut gun, local, gun_parent)) = guns.get_mut(gun_entity) else {
            continue;
        };
        if !gun.available {
            continue;
        }

        // Fire location: gun local transform поверх родителя (один уровень иерархии)
        let fire_transform = gun_parent
            .and_then(|parent| transforms.get(parent.parent()).ok())
            .map_or(*local, |parent| parent.mul_transform(*local));

        let has_ammo = if !gun.use_ammo {
            true
        } else if gun.must_reload {
            gun.rounds_loaded > 0
        } else {
            reserve.has_ammo(gun.ammo_id)
        };

        if gun.ready_to_fire(now) && has_ammo {
            // Цель владельца: Target на shooter или на его родителе
            let target = shooter_target
                .copied()
                .or_else(|| {
                    shooter_parent.and_then(|parent| owner_targets.get(parent.parent()).ok().copied())
                })
                .and_then(|target| target.get())
                .and_then(|target| transforms.get(target).ok())
                .map(|transform| transform.translation);

            let aim = match target {
                Some(target) if gun.aim_at_owner_target => {
                    crate::ai::locomotion::look_rotation(target - fire_transform.translation, Vec3::Y)
                        .unwrap_or(fire_transform.rotation)
                }
                _ => fire_transform.rotation,
            };

            if let Some(projectile) = &gun.projectile {
                let spread = gun.maximum_spread_degrees.abs().to_radians();
                for _ in 0..gun.maximum_to_fire {
                    let yaw = rng.rng.gen_range(-spread..=spread);
                    let pitch = rng.rng.gen_range(-spread..=spread);
                    spawn_events.write(PrefabSpawnRequested {
                        prefab: projectile.clone(),
                        position: fire_transform.translation,
                        rotation: aim * Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0),
                        requested_by: Some(gun_entity),
                    });
                }
            }

            if let Some(effect) = &gun.fire_effect {
                effect_events.write(SpawnEffect {
                    prefab: effect.clone(),
                    position: fire_transform.translation,
                    rotation: aim,
                });
            }

            gun.able_to_fire_again_at = now + gun.fire_delay;
            fired_events.write(GunFired {
                gun: gun_entity,
                shooter: request.shooter,
                position: fire_transform.translation,
            });

            if gun.use_ammo {
                reserve.consume_one(gun.ammo_id);
                gun.rounds_loaded = (gun.rounds_loaded - 1).clamp(0, gun.magazine_size);
            }
        } else if gun.use_ammo && gun.must_reload && gun.rounds_loaded == 0 && !gun.is_reloading() {
            gun.able_to_fire_again_at = now + gun.reload_time;
            if reserve.has_ammo(gun.ammo_id) {
                gun.reloading_until = Some(now + gun.reload_time);
                crate::log(&format!("🔄 Gun {:?} reloading", gun_entity));
            }
        }
    }
}

/// Система: завершение перезарядки (магазин из reserve)
pub fn finish_reloads(mut guns: Query<&mut Gun>, reserve: Res<AmmoReserve>, time: Res<Time>) {
    let now = time.elapsed_secs();

    for mut gun in guns.iter_mut() {
        let Some(until) = gun.reloading_until else {
            continue;
        };
        if now >= until {
            gun.rounds_loaded = reserve.reload_amount(gun.ammo_id, gun.magazine_size);
            gun.reloading_until = None;
        }
    }
}

/// Система: GunSmoke - рассеивание + нагрев от своих выстрелов
pub fn update_gun_smoke(mut fired_events: EventReader<GunFired>, mut smokes: Query<&mut GunSmoke>) {
    for mut smoke in smokes.iter_mut() {
        smoke.dissipate();
    }

    for fired in fired_events.read() {
        for mut smoke in smokes.iter_mut() {
            smoke.on_fire(fired.gun);
        }
    }
}

/// Система: GunPickedUp → оружие доступно
///
/// Если экипированное оружие недоступно - экипируем подобранное.
pub fn apply_gun_pickups(
    mut pickup_events: EventReader<GunPickedUp>,
    mut shooters: Query<&mut Shooter>,
    mut guns: Query<&mut Gun>,
) {
    for pickup in pickup_events.read() {
        let Ok(mut shooter) = shooters.get_mut(pickup.shooter) else {
            continue;
        };
        let Some(&gun_entity) = shooter.guns.get(pickup.gun_index) else {
            crate::log_warning(&format!(
                "Gun pickup index {} out of range for shooter {:?}",
                pickup.gun_index, pickup.shooter
            ));
            continue;
        };

        if let Ok(mut gun) = guns.get_mut(gun_entity) {
            gun.available = true;
        }

        let equipped_available = shooter
            .equipped_gun()
            .and_then(|equipped| guns.get(equipped).ok())
            .is_some_and(|gun| gun.available);
        if !equipped_available {
            shooter.equipped = pickup.gun_index;
        }
    }
}

/// Система (setup): предупреждение если у Shooter нет ни одного оружия
pub fn validate_shooters(shooters: Query<(Entity, &Shooter), Added<Shooter>>, guns: Query<&Gun>) {
    for (entity, shooter) in shooters.iter() {
        if !shooter.guns.iter().any(|&gun| guns.contains(gun)) {
            crate::log_warning(&format!("Shooter {:?} has no gun to fire from", entity));
        }
    }
}
