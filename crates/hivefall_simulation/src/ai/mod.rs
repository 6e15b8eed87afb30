//! AI decision-making module
//!
//! Enemy Behavior FSM: каждый тик решает {Idle, Moving, Attacking}.
//! - components: EnemyBehavior config, ActionFlags/ActionState, Target, animator контракт
//! - locomotion: archetype стратегии (ground, flying, stationary, hive)
//! - sight: Line-of-Sight Oracle (Rapier raycast)
//! - diversion: зоны разворота ground врагов

use bevy::prelude::*;

pub mod components;
pub mod diversion;
pub mod locomotion;
pub mod sight;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use diversion::{DiversionZone, DiversionZoneEntered};
pub use locomotion::{
    FlyingLocomotion, GroundLocomotion, Locomotion, LocomotionContext, LocomotionStrategy,
    StationaryLocomotion, StopBehavior,
};
pub use sight::{LineOfSight, ObstructionMask, RayCaster};

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения (SimulationSet::Behavior):
/// 1. acquire_player_target / validate_enemy_setup / setup_action_animator - setup новых врагов
/// 2. apply_diversion_zones - диверсии от триггер-зон
/// 3. straight_line_navigation - desired_velocity для NavAgent
/// 4. enemy_behavior_tick - атака, затем движение
/// 5. write_action_animation - ActionState → animator bools
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AnimationBoolChanged>()
            .add_event::<DiversionZoneEntered>();

        app.add_systems(
            FixedUpdate,
            (
                systems::acquire_player_target,
                systems::validate_enemy_setup,
                systems::setup_action_animator,
                diversion::apply_diversion_zones,
                systems::straight_line_navigation,
                systems::enemy_behavior_tick,
                systems::write_action_animation,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(SimulationSet::Behavior),
        );
    }
}

/// Line-of-Sight Plugin (Rapier backend)
///
/// Отдельно от AIPlugin: headless симуляция без физики выставляет
/// LineOfSight::has_sight сама.
pub struct SightPlugin;

impl Plugin for SightPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            sight::update_line_of_sight.in_set(SimulationSet::Sense),
        );
    }
}
