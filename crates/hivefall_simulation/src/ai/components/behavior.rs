//! Enemy Behavior FSM components (config, action flags, target reference).

use bevy::prelude::*;

use crate::ai::sight::LineOfSight;
use crate::components::PrefabPath;

/// Параметры поведения врага (общие для всех locomotion archetypes)
///
/// Required Components: ActionFlags + ActionState (результат тика),
/// Target (кого преследуем), LineOfSight (результат Oracle).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(ActionFlags, ActionState, Target, LineOfSight)]
pub struct EnemyBehavior {
    /// Скорость перемещения (м/с)
    pub move_speed: f32,
    /// Может ли враг двигаться вообще (турель = false)
    pub can_move: bool,
    /// Дистанция атаки (строго меньше → в радиусе)
    pub maximum_attack_range: f32,
    /// Атакует ли враг (требует Attacker)
    pub does_attack: bool,
    /// Атака только при прямой видимости цели
    pub line_of_sight_to_attack: bool,
    /// Двигаться во время атаки (flying стрелки)
    pub move_while_attacking: bool,
    /// Двигаться только при прямой видимости цели
    pub needs_line_of_sight_to_move: bool,
    /// Эффект в позиции врага при старте атаки (вспышка, рык)
    pub attack_effect: Option<PrefabPath>,
}

impl Default for EnemyBehavior {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            can_move: true,
            maximum_attack_range: 5.0,
            does_attack: false,
            line_of_sight_to_attack: true,
            move_while_attacking: false,
            needs_line_of_sight_to_move: true,
            attack_effect: None,
        }
    }
}

impl EnemyBehavior {
    /// Враг который атакует в радиусе `range`
    pub fn attacking(range: f32) -> Self {
        Self {
            does_attack: true,
            maximum_attack_range: range,
            ..default()
        }
    }

    /// LOS не требуется ни для атаки, ни для движения
    pub fn without_sight_checks(mut self) -> Self {
        self.line_of_sight_to_attack = false;
        self.needs_line_of_sight_to_move = false;
        self
    }
}

/// Цель врага (weak reference)
///
/// Entity может быть despawned - резолвится через Query каждый тик,
/// отсутствие цели молча выключает атаку и преследование.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Target(pub Option<Entity>);

impl Target {
    /// SetTarget: заменить цель в любой момент
    pub fn set(&mut self, target: Option<Entity>) {
        self.0 = target;
    }

    pub fn get(&self) -> Option<Entity> {
        self.0
    }
}

/// Сырые флаги тика (что FSM решила на этом тике)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ActionFlags {
    pub is_idle: bool,
    pub is_moving: bool,
    pub is_attacking: bool,
}

impl Default for ActionFlags {
    fn default() -> Self {
        Self {
            is_idle: true,
            is_moving: false,
            is_attacking: false,
        }
    }
}

impl ActionFlags {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Итог тика по правилам FSM
    pub fn resolve(is_attacking: bool, is_moving: bool) -> Self {
        Self {
            is_idle: !is_attacking && !is_moving,
            is_moving,
            is_attacking,
        }
    }
}

/// Текущее действие врага (ровно одно в каждый момент)
///
/// Приоритет: Attacking > Moving > Idle.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum ActionState {
    #[default]
    Idle,
    Moving,
    Attacking,
}

impl From<ActionFlags> for ActionState {
    fn from(flags: ActionFlags) -> Self {
        if flags.is_attacking {
            Self::Attacking
        } else if flags.is_moving {
            Self::Moving
        } else {
            Self::Idle
        }
    }
}
