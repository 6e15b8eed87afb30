//! Melee hitbox (оружие врага)
//!
//! Архитектура:
//! - MeleeHitbox живёт на своей entity, включается Attacker'ом только на время атаки
//! - Sphere hitbox вокруг owner + offset
//! - Overlap detection: distance check против Actor + Health целей
//! - Одна цель получает урон не больше одного раза за swing

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::combat::{DamageRequest, Health};
use crate::components::Actor;

/// Hitbox оружия ближнего боя
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct MeleeHitbox {
    /// Кто бьёт (позиция + фракция)
    pub owner: Entity,
    /// Смещение от owner в его local space (обычно вперёд, -Z)
    pub offset: Vec3,
    /// Радиус сферы hitbox (метры)
    pub radius: f32,
    pub damage: i32,
    /// Активен только во время атаки
    pub enabled: bool,
    /// Уже задетые за текущий swing
    pub hit_this_swing: Vec<Entity>,
}

impl MeleeHitbox {
    pub fn new(owner: Entity, damage: i32, radius: f32) -> Self {
        Self {
            owner,
            offset: Vec3::new(0.0, 0.0, -1.0),
            radius,
            damage,
            enabled: false,
            hit_this_swing: Vec::new(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.hit_this_swing.clear();
    }
}

/// Bundle для hitbox entity: Rapier sensor для presentation/physics layer
///
/// Сенсор не участвует в симуляции урона (её ведёт detect_melee_hits),
/// но даёт physics layer форму оружия для debug/VFX.
pub fn melee_hitbox_bundle(hitbox: MeleeHitbox) -> impl Bundle {
    let radius = hitbox.radius;
    (
        hitbox,
        Transform::default(),
        Collider::ball(radius),
        Sensor,
        // Hitbox не блокирует LOS лучи (membership пустой)
        CollisionGroups::new(Group::NONE, Group::ALL),
    )
}

/// Система: включённые hitboxes → DamageRequest по враждебным целям
pub fn detect_melee_hits(
    mut hitboxes: Query<&mut MeleeHitbox>,
    owners: Query<(&Transform, &Actor)>,
    targets: Query<(Entity, &Transform, &Actor), With<Health>>,
    mut damage_events: EventWriter<DamageRequest>,
) {
    for mut hitbox in hitboxes.iter_mut() {
        if !hitbox.enabled {
            continue;
        }

        let Ok((owner_transform, owner_actor)) = owners.get(hitbox.owner) else {
            continue;
        };
        let center = owner_transform.transform_point(hitbox.offset);

        for (target_entity, target_transform, target_actor) in targets.iter() {
            // Не бьем самого себя и своих
            if target_entity == hitbox.owner || !owner_actor.is_hostile_to(target_actor) {
                continue;
            }
            if hitbox.hit_this_swing.contains(&target_entity) {
                continue;
            }

            if center.distance(target_transform.translation) < hitbox.radius {
                hitbox.hit_this_swing.push(target_entity);
                damage_events.write(DamageRequest {
                    target: target_entity,
                    amount: hitbox.damage,
                    source: Some(hitbox.owner),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hitbox_app() -> App {
        let mut app = App::new();
        app.add_event::<DamageRequest>()
            .add_systems(Update, detect_melee_hits);
        app
    }

    fn drain_damage(app: &mut App) -> Vec<DamageRequest> {
        app.world_mut()
            .resource_mut::<Events<DamageRequest>>()
            .drain()
            .collect()
    }

    #[test]
    fn test_enabled_hitbox_hits_hostile_once_per_swing() {
        let mut app = hitbox_app();

        let enemy = app
            .world_mut()
            .spawn((Actor::new(2), Health::new(10)))
            .id();
        let player = app
            .world_mut()
            .spawn((Actor::new(1), Health::new(10), Transform::from_xyz(0.0, 0.0, -1.2)))
            .id();
        let ally = app
            .world_mut()
            .spawn((Actor::new(2), Health::new(10), Transform::from_xyz(0.0, 0.0, -0.8)))
            .id();

        let mut hitbox = MeleeHitbox::new(enemy, 7, 1.0);
        hitbox.set_enabled(true);
        app.world_mut().spawn(hitbox);

        app.update();
        let hits = drain_damage(&mut app);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, player);
        assert_eq!(hits[0].amount, 7);
        assert_eq!(hits[0].source, Some(enemy));
        assert_ne!(hits[0].target, ally);

        // Тот же swing - повторно не бьём
        app.update();
        assert!(drain_damage(&mut app).is_empty());
    }

    #[test]
    fn test_disabled_hitbox_deals_nothing() {
        let mut app = hitbox_app();

        let enemy = app.world_mut().spawn(Actor::new(2)).id();
        app.world_mut()
            .spawn((Actor::new(1), Health::new(10), Transform::from_xyz(0.0, 0.0, -1.0)));
        app.world_mut().spawn(MeleeHitbox::new(enemy, 7, 1.0));

        app.update();
        assert!(drain_damage(&mut app).is_empty());
    }
}
