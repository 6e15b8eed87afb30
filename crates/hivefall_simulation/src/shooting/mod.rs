//! Shooting domain - оружие, стрелки и общий запас патронов
//!
//! Содержит:
//! - Gun / Shooter / GunSmoke компоненты + FireRequested/GunFired/GunPickedUp
//! - AmmoReserve resource (clamp [0, MAX_AMMO]) + JSON persistence
//! - Системы выстрела, перезарядки, дыма, pickups

use bevy::prelude::*;

pub mod ammo;
pub mod components;
pub mod systems;


// Re-export all components and functions
pub use ammo::*;
pub use components::*;

use crate::SimulationSet;

/// Shooting Plugin
///
/// Порядок (SimulationSet::Attacks, после FSM и после apply_attack_start_payloads:
/// FireRequested от Ranged атаки стреляет в тот же тик, что и AttackStarted):
/// 1. apply_ammo_pickups / apply_gun_pickups
/// 2. finish_reloads
/// 3. fire_guns
/// 4. update_gun_smoke
pub struct ShootingPlugin;

impl Plugin for ShootingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AmmoReserve>()
            .add_event::<FireRequested>()
            .add_event::<GunFired>()
            .add_event::<GunPickedUp>()
            .add_event::<AmmoPickedUp>();

        app.add_systems(Startup, ammo::load_ammo_reserve)
            .add_systems(Last, ammo::save_ammo_reserve_on_exit);

        app.add_systems(
            FixedUpdate,
            (
                systems::validate_shooters,
                ammo::apply_ammo_pickups,
                systems::apply_gun_pickups,
                systems::finish_reloads,
                systems::fire_guns,
                systems::update_gun_smoke,
            )
                .chain()
                .after(crate::combat::systems::apply_attack_start_payloads)
                .in_set(SimulationSet::Attacks),
        );
    }
}
