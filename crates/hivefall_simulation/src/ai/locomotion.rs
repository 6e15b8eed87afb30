//! Locomotion стратегии врагов (archetypes)
//!
//! Контракт из двух функций: desired_position + desired_rotation.
//! Вся логика gating (LOS, attack, can_move) общая и живёт в Behavior FSM -
//! архетипы отвечают только за "куда и как повернуться".
//!
//! Archetypes:
//! - Ground: преследование через NavAgent до stop distance + временная диверсия к точке
//! - Flying: прямой подлёт, у цели - зависание или облёт по/против часовой
//! - Stationary: турели, никогда не двигаются
//! - Hive: босс, стоит на месте (спавнит миньонов через Swarm атаку)

use bevy::prelude::*;

use crate::components::NavAgent;

/// Снимок мира для одной locomotion оценки (один актор, один тик)
#[derive(Debug, Clone, Copy)]
pub struct LocomotionContext {
    pub position: Vec3,
    pub rotation: Quat,
    /// Позиция цели (None = цели нет или она despawned)
    pub target: Option<Vec3>,
    pub move_speed: f32,
    pub delta: f32,
    pub now: f32,
    /// Результат Line-of-Sight Oracle на этот тик
    pub has_sight: bool,
    /// Желаемая скорость от NavAgent (ground)
    pub nav_velocity: Vec3,
}

impl LocomotionContext {
    pub fn at_rest(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            target: None,
            move_speed: 0.0,
            delta: 0.0,
            now: 0.0,
            has_sight: false,
            nav_velocity: Vec3::ZERO,
        }
    }

    /// Локальная ось "вверх" актора
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn distance_to_target(&self) -> Option<f32> {
        self.target.map(|target| self.position.distance(target))
    }
}

/// Capability interface: желаемое движение и поворот за тик
///
/// Дефолтные реализации = текущая поза (no-op), так ведут себя турели.
pub trait LocomotionStrategy {
    fn desired_position(&self, ctx: &LocomotionContext) -> Vec3 {
        ctx.position
    }

    fn desired_rotation(&self, ctx: &LocomotionContext) -> Quat {
        ctx.rotation
    }
}

/// Rotation у которой -Z смотрит по `direction` (None если direction вырожден)
pub(crate) fn look_rotation(direction: Vec3, up: Vec3) -> Option<Quat> {
    if direction.length_squared() < 1e-8 {
        return None;
    }
    Some(Transform::default().looking_to(direction, up).rotation)
}

/// Только yaw: проекция направления на XZ
pub(crate) fn yaw_rotation(direction: Vec3) -> Option<Quat> {
    look_rotation(Vec3::new(direction.x, 0.0, direction.z), Vec3::Y)
}

// ============================================================================
// Ground
// ============================================================================

/// Временное отклонение ground агента к точке (turn-arounder)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Diversion {
    pub point: Vec3,
    /// Время (elapsed secs) после которого возвращаемся к основной цели
    pub until: f32,
}

/// Ground archetype: navmesh агент
#[derive(Debug, Clone, Reflect)]
pub struct GroundLocomotion {
    /// Дистанция остановки перед целью (метры)
    pub stop_distance: f32,
    /// Внутри stop distance без LOS - продолжаем идти (обходим укрытие)
    pub line_of_sight_to_stop: bool,
    /// true: всегда смотрим на цель (yaw only), false: смотрим по направлению движения
    pub always_face_target: bool,
    /// Активная диверсия (None = преследуем основную цель)
    pub diversion: Option<Diversion>,
}

impl Default for GroundLocomotion {
    fn default() -> Self {
        Self {
            stop_distance: 2.0,
            line_of_sight_to_stop: true,
            always_face_target: true,
            diversion: None,
        }
    }
}

impl GroundLocomotion {
    /// Идти к `point` не дольше `time_to_spend` секунд, потом вернуться к цели
    pub fn go_to_point(&mut self, point: Vec3, time_to_spend: f32, now: f32) {
        self.diversion = Some(Diversion {
            point,
            until: now + time_to_spend.max(0.0),
        });
    }

    pub fn is_diverting(&self) -> bool {
        self.diversion.is_some()
    }

    /// Идёт ли агент куда-то на этом тике (диверсия или преследование)
    pub fn is_seeking(&self, ctx: &LocomotionContext) -> bool {
        self.is_diverting() || self.should_seek(ctx)
    }

    /// Нужно ли идти к основной цели
    fn should_seek(&self, ctx: &LocomotionContext) -> bool {
        let Some(distance) = ctx.distance_to_target() else {
            return false;
        };

        distance > self.stop_distance || (self.line_of_sight_to_stop && !ctx.has_sight)
    }

    /// Обновить destination NavAgent на этот тик
    ///
    /// Диверсия игнорирует gating и отменяется по таймауту или по прибытию.
    /// Без диверсии: seek к цели только если движение разрешено FSM.
    pub fn update_navigation(
        &mut self,
        ctx: &LocomotionContext,
        agent: &mut NavAgent,
        movement_permitted: bool,
    ) {
        if let Some(diversion) = self.diversion {
            let reached = agent.destination == Some(diversion.point) && agent.has_arrived();

            if ctx.now >= diversion.until || reached {
                self.diversion = None;
                match ctx.target {
                    Some(target) => agent.request_move_to(target),
                    None => agent.stop(),
                }
            } else {
                agent.request_move_to(diversion.point);
            }
            return;
        }

        match ctx.target {
            Some(target) if movement_permitted && self.should_seek(ctx) => {
                agent.request_move_to(target);
            }
            _ => agent.stop(),
        }
    }
}

impl LocomotionStrategy for GroundLocomotion {
    fn desired_position(&self, ctx: &LocomotionContext) -> Vec3 {
        if self.is_seeking(ctx) {
            ctx.position + ctx.nav_velocity * ctx.delta
        } else {
            ctx.position
        }
    }

    fn desired_rotation(&self, ctx: &LocomotionContext) -> Quat {
        if self.always_face_target {
            if let Some(target) = ctx.target {
                return yaw_rotation(target - ctx.position).unwrap_or(ctx.rotation);
            }
        } else if let Some(rotation) = yaw_rotation(ctx.nav_velocity) {
            // Смотрим по направлению движения
            return rotation;
        }
        ctx.rotation
    }
}

// ============================================================================
// Flying
// ============================================================================

/// Поведение flying врага внутри stop distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum StopBehavior {
    /// Зависнуть на месте
    Stop,
    /// Облёт по часовой (cross(to_target, up))
    #[default]
    CircleClockwise,
    /// Облёт против часовой
    CircleAnticlockwise,
}

/// Flying archetype: прямой подлёт без pathfinding
#[derive(Debug, Clone, Reflect)]
pub struct FlyingLocomotion {
    pub stop_distance: f32,
    pub stop_behavior: StopBehavior,
}

impl Default for FlyingLocomotion {
    fn default() -> Self {
        Self {
            stop_distance: 5.0,
            stop_behavior: StopBehavior::CircleClockwise,
        }
    }
}

impl LocomotionStrategy for FlyingLocomotion {
    fn desired_position(&self, ctx: &LocomotionContext) -> Vec3 {
        let Some(target) = ctx.target else {
            return ctx.position;
        };

        let to_target = target - ctx.position;
        let step = ctx.move_speed * ctx.delta;

        if to_target.length() > self.stop_distance {
            return ctx.position + to_target.normalize_or_zero() * step;
        }

        let orbit = to_target.cross(ctx.up()).normalize_or_zero();
        match self.stop_behavior {
            StopBehavior::Stop => ctx.position,
            StopBehavior::CircleClockwise => ctx.position + orbit * step,
            StopBehavior::CircleAnticlockwise => ctx.position - orbit * step,
        }
    }

    fn desired_rotation(&self, ctx: &LocomotionContext) -> Quat {
        ctx.target
            .and_then(|target| look_rotation(target - ctx.position, Vec3::Y))
            .unwrap_or(ctx.rotation)
    }
}

// ============================================================================
// Stationary
// ============================================================================

/// Stationary archetype (турели): поза не меняется
#[derive(Debug, Clone, Copy, Default, Reflect)]
pub struct StationaryLocomotion;

impl LocomotionStrategy for StationaryLocomotion {}

// ============================================================================
// Component
// ============================================================================

/// Locomotion archetype актора (выбирается при спавне)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub enum Locomotion {
    Ground(GroundLocomotion),
    Flying(FlyingLocomotion),
    Stationary(StationaryLocomotion),
    /// Босс-улей: стоит на месте, его уничтожение = LevelCleared
    Hive(StationaryLocomotion),
}

impl Default for Locomotion {
    fn default() -> Self {
        Self::Stationary(StationaryLocomotion)
    }
}

impl Locomotion {
    pub fn ground() -> Self {
        Self::Ground(GroundLocomotion::default())
    }

    pub fn flying() -> Self {
        Self::Flying(FlyingLocomotion::default())
    }

    pub fn as_ground_mut(&mut self) -> Option<&mut GroundLocomotion> {
        match self {
            Self::Ground(ground) => Some(ground),
            _ => None,
        }
    }

    pub fn is_hive(&self) -> bool {
        matches!(self, Self::Hive(_))
    }
}

impl LocomotionStrategy for Locomotion {
    fn desired_position(&self, ctx: &LocomotionContext) -> Vec3 {
        match self {
            Self::Ground(ground) => ground.desired_position(ctx),
            Self::Flying(flying) => flying.desired_position(ctx),
            Self::Stationary(stationary) | Self::Hive(stationary) => {
                stationary.desired_position(ctx)
            }
        }
    }

    fn desired_rotation(&self, ctx: &LocomotionContext) -> Quat {
        match self {
            Self::Ground(ground) => ground.desired_rotation(ctx),
            Self::Flying(flying) => flying.desired_rotation(ctx),
            Self::Stationary(stationary) | Self::Hive(stationary) => {
                stationary.desired_rotation(ctx)
            }
        }
    }
}
