//! Headless pathing: прямолинейное руление NavAgent к destination.
//!
//! С настоящим navmesh эту систему заменяет navigation layer,
//! который пишет desired_velocity/arrived в тот же NavAgent.

use bevy::prelude::*;

use crate::components::NavAgent;

/// Маркер: NavAgent управляется внешним navigation layer (не headless)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ExternalNavigation;

/// Система: desired_velocity к destination по прямой
pub fn straight_line_navigation(
    mut agents: Query<(&Transform, &mut NavAgent), Without<ExternalNavigation>>,
) {
    for (transform, mut agent) in agents.iter_mut() {
        agent.steer_from(transform.translation);
    }
}
