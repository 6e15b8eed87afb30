//! Animation контракт: какие bool параметры FSM пишет в animator.

use bevy::prelude::*;

use crate::ai::ActionState;

/// Bool параметры которые реально есть в animation asset
///
/// Заполняется presentation layer при загрузке модели.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AnimationParameters(pub Vec<String>);

impl AnimationParameters {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|parameter| parameter == name)
    }
}

/// Имена animator параметров для Idle/Moving/Attacking
///
/// Пустое имя = параметр не используется. Наличие в asset проверяется
/// один раз на setup, результат кэшируется в `*_present`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct ActionAnimator {
    pub idle_parameter: String,
    pub move_parameter: String,
    pub attack_parameter: String,
    pub idle_present: bool,
    pub move_present: bool,
    pub attack_present: bool,
}

impl Default for ActionAnimator {
    fn default() -> Self {
        Self {
            idle_parameter: "Idle".into(),
            move_parameter: "Moving".into(),
            attack_parameter: "Attacking".into(),
            idle_present: false,
            move_present: false,
            attack_present: false,
        }
    }
}

impl ActionAnimator {
    /// Кэширует наличие параметров, возвращает имена которых нет в asset
    pub fn validate(&mut self, parameters: &AnimationParameters) -> Vec<String> {
        let mut missing = Vec::new();

        let mut check = |name: &str| {
            if name.is_empty() {
                return false;
            }
            let present = parameters.contains(name);
            if !present {
                missing.push(name.to_string());
            }
            present
        };

        let idle = check(&self.idle_parameter);
        let moving = check(&self.move_parameter);
        let attacking = check(&self.attack_parameter);

        self.idle_present = idle;
        self.move_present = moving;
        self.attack_present = attacking;

        missing
    }

    /// (parameter, value) пары для записи в animator
    pub fn parameters_for(&self, state: ActionState) -> Vec<(String, bool)> {
        [
            (self.idle_present, &self.idle_parameter, state == ActionState::Idle),
            (self.move_present, &self.move_parameter, state == ActionState::Moving),
            (self.attack_present, &self.attack_parameter, state == ActionState::Attacking),
        ]
        .into_iter()
        .filter(|(present, _, _)| *present)
        .map(|(_, name, value)| (name.clone(), value))
        .collect()
    }
}

/// Выходное событие: выставить bool параметр animator
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AnimationBoolChanged {
    pub entity: Entity,
    pub parameter: String,
    pub value: bool,
}
