//! Movement компоненты: контроллер движения и навигационный агент

use bevy::prelude::*;

/// Контроллер движения актора
///
/// Выключается на время смерти (Dead-Respawning), включается обратно на respawn.
/// Behavior FSM не двигает актора с выключенным контроллером.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct MovementController {
    pub enabled: bool,
}

impl Default for MovementController {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Навигационный агент (контракт с pathfinding сервисом)
///
/// Архитектура:
/// - ECS пишет destination (`request_move_to` / `stop`)
/// - Navigation layer (navmesh) пишет `desired_velocity` и `arrived`
/// - Headless: `straight_line_navigation` система рулит напрямую к destination
///
/// Флаг `arrived` относится только к текущему destination и сбрасывается при смене цели.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    /// Куда идём (None = стоим)
    pub destination: Option<Vec3>,
    /// Желаемая скорость от pathfinding (м/с, world space)
    pub desired_velocity: Vec3,
    /// Дошли до destination
    pub arrived: bool,
    /// Дистанция на которой destination считается достигнутым (метры)
    pub stopping_distance: f32,
    /// Скорость агента (м/с)
    pub speed: f32,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: None,
            desired_velocity: Vec3::ZERO,
            arrived: false,
            stopping_distance: 0.1,
            speed: 3.5,
        }
    }
}

impl NavAgent {
    pub fn with_speed(speed: f32) -> Self {
        Self {
            speed,
            ..default()
        }
    }

    /// RequestMoveTo: новый destination сбрасывает arrived
    pub fn request_move_to(&mut self, position: Vec3) {
        if self.destination != Some(position) {
            self.destination = Some(position);
            self.arrived = false;
        }
    }

    /// Остановиться (destination = None, velocity = 0)
    pub fn stop(&mut self) {
        self.destination = None;
        self.desired_velocity = Vec3::ZERO;
        self.arrived = false;
    }

    pub fn current_desired_velocity(&self) -> Vec3 {
        self.desired_velocity
    }

    pub fn has_arrived(&self) -> bool {
        self.destination.is_some() && self.arrived
    }

    /// Прямолинейное руление к destination (headless pathing)
    ///
    /// Игнорирует высоту: ground агенты ходят по плоскости XZ.
    pub fn steer_from(&mut self, position: Vec3) {
        let Some(destination) = self.destination else {
            self.desired_velocity = Vec3::ZERO;
            return;
        };

        let mut offset = destination - position;
        offset.y = 0.0;

        if offset.length() <= self.stopping_distance {
            self.desired_velocity = Vec3::ZERO;
            self.arrived = true;
        } else {
            self.desired_velocity = offset.normalize() * self.speed;
            self.arrived = false;
        }
    }
}
