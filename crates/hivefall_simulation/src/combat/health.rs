//! Health/Lifecycle FSM
//!
//! Состояния:
//! - Alive (vulnerable / invulnerable по `invulnerable_until`)
//! - Respawning: мёртв, ждёт `at` (только с lives)
//! - Dead: финальная смерть
//!
//! Все методы чистые (принимают `now`), события пишет `systems::health`.

use bevy::prelude::*;

use crate::components::PrefabPath;

/// Состояние жизни актора
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum LifeState {
    #[default]
    Alive,
    /// Мёртв, respawn в момент `at`
    Respawning { at: f32 },
    /// Финальная смерть (game over / destroy)
    Dead,
}

/// Что случилось при смерти
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Death {
    /// Жизни остались - respawn запланирован
    Respawn { at: f32 },
    /// Жизней нет (или lives не используются)
    Final,
}

/// Результат изменения здоровья (damage или heal)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthChange {
    pub previous: i32,
    pub current: i32,
    /// Some = это изменение вызвало переход в смерть (ровно один раз)
    pub death: Option<Death>,
}

/// Health компонент (HP + lives + respawn)
///
/// Инварианты: `0 <= current <= maximum`, `0 <= lives <= maximum_lives`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub default_health: i32,
    pub maximum_health: i32,
    pub current_health: i32,
    /// Неуязвимость после попадания (секунды)
    pub invincibility_time: f32,
    /// Урон никогда не проходит (боссы-декорации, тестовые манекены)
    pub always_invincible: bool,
    /// Deadline неуязвимости (elapsed secs)
    pub invulnerable_until: f32,
    pub use_lives: bool,
    pub current_lives: i32,
    pub maximum_lives: i32,
    /// Задержка respawn после смерти (секунды)
    pub respawn_wait_time: f32,
    /// Точка respawn (None = позиция при спавне, выставляется на setup)
    pub respawn_point: Option<Vec3>,
    pub state: LifeState,
    /// Эффект при получении урона
    pub hit_effect: Option<PrefabPath>,
    /// Эффект при смерти
    pub death_effect: Option<PrefabPath>,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            default_health: 1,
            maximum_health: 1,
            current_health: 1,
            invincibility_time: 3.0,
            always_invincible: false,
            invulnerable_until: f32::NEG_INFINITY,
            use_lives: false,
            current_lives: 3,
            maximum_lives: 5,
            respawn_wait_time: 3.0,
            respawn_point: None,
            state: LifeState::Alive,
            hit_effect: None,
            death_effect: None,
        }
    }
}

impl Health {
    pub fn new(maximum: i32) -> Self {
        let maximum = maximum.max(0);
        Self {
            default_health: maximum,
            maximum_health: maximum,
            current_health: maximum,
            ..default()
        }
    }

    pub fn with_lives(mut self, lives: i32, maximum_lives: i32) -> Self {
        self.use_lives = true;
        self.maximum_lives = maximum_lives.max(0);
        self.current_lives = lives.clamp(0, self.maximum_lives);
        self
    }

    pub fn with_invincibility_time(mut self, seconds: f32) -> Self {
        self.invincibility_time = seconds;
        self
    }

    pub fn with_respawn_wait_time(mut self, seconds: f32) -> Self {
        self.respawn_wait_time = seconds;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    pub fn is_invulnerable(&self, now: f32) -> bool {
        self.always_invincible || now < self.invulnerable_until
    }

    /// Нанести урон
    ///
    /// None = no-op (неуязвим, уже мёртв, always_invincible).
    /// Отрицательный amount лечит (clamp в [0, max]).
    pub fn take_damage(&mut self, amount: i32, now: f32) -> Option<HealthChange> {
        if !self.is_alive() || self.current_health <= 0 || self.is_invulnerable(now) {
            return None;
        }

        self.invulnerable_until = now + self.invincibility_time;

        let previous = self.current_health;
        self.set_clamped(previous.saturating_sub(amount));

        Some(HealthChange {
            previous,
            current: self.current_health,
            death: self.check_death(now),
        })
    }

    /// Вылечить (отрицательный amount - урон в обход неуязвимости)
    ///
    /// Мёртвые не лечатся: None.
    pub fn receive_healing(&mut self, amount: i32, now: f32) -> Option<HealthChange> {
        if !self.is_alive() {
            return None;
        }

        let previous = self.current_health;
        self.set_clamped(previous.saturating_add(amount));

        Some(HealthChange {
            previous,
            current: self.current_health,
            death: self.check_death(now),
        })
    }

    /// Добавить жизни (только с lives), clamp в [0, max_lives]
    pub fn add_lives(&mut self, amount: i32) -> bool {
        if !self.use_lives {
            return false;
        }
        self.current_lives = self
            .current_lives
            .saturating_add(amount)
            .clamp(0, self.maximum_lives);
        true
    }

    pub fn set_respawn_point(&mut self, point: Vec3) {
        self.respawn_point = Some(point);
    }

    /// Пора ли возрождаться (Respawning и deadline прошёл)
    pub fn respawn_due(&self, now: f32) -> bool {
        matches!(self.state, LifeState::Respawning { at } if now >= at)
    }

    /// Возрождение: здоровье по умолчанию, неуязвимость снята
    pub fn respawn(&mut self) {
        self.state = LifeState::Alive;
        self.set_clamped(self.default_health);
        self.invulnerable_until = f32::NEG_INFINITY;
    }

    fn set_clamped(&mut self, value: i32) {
        self.current_health = value.clamp(0, self.maximum_health.max(0));
    }

    fn check_death(&mut self, now: f32) -> Option<Death> {
        if self.current_health > 0 {
            return None;
        }
        Some(self.die(now))
    }

    fn die(&mut self, now: f32) -> Death {
        if self.use_lives {
            self.current_lives = (self.current_lives - 1).max(0);
            if self.current_lives > 0 {
                let at = now + self.respawn_wait_time.max(0.0);
                self.state = LifeState::Respawning { at };
                return Death::Respawn { at };
            }
        }

        self.state = LifeState::Dead;
        Death::Final
    }
}

/// Ragdoll настроен: при смерти тело остаётся и убирается через `lifetime`
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Ragdoll {
    /// Сколько секунд живёт труп
    pub lifetime: f32,
}

impl Default for Ragdoll {
    fn default() -> Self {
        Self { lifetime: 10.0 }
    }
}

/// Маркер: актор сейчас в ragdoll (физика тела отдана presentation layer)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Ragdolled;
