//! Attacker component - Attack Executor (одна атака за раз + cooldown)
//!
//! Фазы: Ready → Attacking{ends_at} → Cooldown{ready_at} → Ready.
//! Ожидания хранятся как deadlines (elapsed secs), никаких таймеров-корутин.
//!
//! Варианты атаки отличаются только payload (что происходит на старте и в конце)
//! и источником длительности (clip override или attack_duration).

use bevy::prelude::*;
use rand::Rng;

use crate::components::PrefabPath;

/// Фаза Attack Executor
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum AttackPhase {
    #[default]
    Ready,
    /// Атака идёт до `ends_at`
    Attacking { ends_at: f32 },
    /// Ждём cooldown до `ready_at`
    Cooldown { ready_at: f32 },
}

/// Payload атаки (вариант поведения)
#[derive(Debug, Clone, Default, Reflect)]
pub enum AttackPayload {
    /// Без эффекта (только лог)
    #[default]
    Instant,
    /// Включает hitbox entities на время атаки
    Melee { hitboxes: Vec<Entity> },
    /// Один выстрел из shooter на старте
    Ranged { shooter: Option<Entity> },
    /// Взрыв в конце атаки (камикадзе)
    Explosive {
        effect: Option<PrefabPath>,
        die_on_explosion: bool,
    },
    /// Спавн миньонов в конце атаки через случайные спавнеры
    Swarm {
        spawners: Vec<Entity>,
        minimum_to_spawn: u32,
        maximum_to_spawn: u32,
    },
}

impl AttackPayload {
    pub fn explosive(effect: Option<PrefabPath>) -> Self {
        Self::Explosive {
            effect,
            die_on_explosion: true,
        }
    }

    /// Payload-специфичная готовность (Ranged без shooter стрелять не может)
    pub fn is_ready(&self) -> bool {
        match self {
            Self::Ranged { shooter } => shooter.is_some(),
            _ => true,
        }
    }
}

/// Переход фазы за тик (драйвит start/end payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackTransition {
    /// Attacking → Cooldown: время применить end payload
    Finished,
    /// Cooldown → Ready
    Recovered,
}

/// Событие: атака запущена (Behavior FSM → start payload)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackStarted {
    pub attacker: Entity,
}

/// Attacker - компонент для акторов которые могут атаковать
///
/// `can_attack()` = false всё время атаки плюс cooldown. Атаки не перекрываются.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Attacker {
    /// Длительность атаки (секунды)
    pub attack_duration: f32,
    /// Cooldown после окончания атаки (секунды)
    pub cooldown: f32,
    /// Длина animation clip (если задана - заменяет attack_duration)
    pub clip_duration: Option<f32>,
    pub phase: AttackPhase,
    pub payload: AttackPayload,
}

impl Default for Attacker {
    fn default() -> Self {
        Self {
            attack_duration: 0.5,
            cooldown: 1.0,
            clip_duration: None,
            phase: AttackPhase::Ready,
            payload: AttackPayload::Instant,
        }
    }
}

impl Attacker {
    pub fn new(payload: AttackPayload) -> Self {
        Self {
            payload,
            ..default()
        }
    }

    pub fn with_timing(mut self, attack_duration: f32, cooldown: f32) -> Self {
        self.attack_duration = attack_duration;
        self.cooldown = cooldown;
        self
    }

    /// Эффективная длительность атаки
    pub fn duration(&self) -> f32 {
        self.clip_duration.unwrap_or(self.attack_duration).max(0.0)
    }

    /// Готов ли к новой атаке
    pub fn can_attack(&self) -> bool {
        self.phase == AttackPhase::Ready && self.payload.is_ready()
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.phase, AttackPhase::Attacking { .. })
    }

    /// Запустить атаку если возможно
    ///
    /// false = атака не запущена (идёт атака, cooldown, payload не готов),
    /// состояние не меняется.
    pub fn try_attack(&mut self, now: f32) -> bool {
        if !self.can_attack() {
            return false;
        }

        self.phase = AttackPhase::Attacking {
            ends_at: now + self.duration(),
        };
        true
    }

    /// Продвинуть фазу по часам симуляции
    pub fn advance(&mut self, now: f32) -> Option<AttackTransition> {
        match self.phase {
            AttackPhase::Attacking { ends_at } if now >= ends_at => {
                self.phase = AttackPhase::Cooldown {
                    ready_at: now + self.cooldown.max(0.0),
                };
                Some(AttackTransition::Finished)
            }
            AttackPhase::Cooldown { ready_at } if now >= ready_at => {
                self.phase = AttackPhase::Ready;
                Some(AttackTransition::Recovered)
            }
            _ => None,
        }
    }
}

/// Количество миньонов swarm атаки: равномерно в [min, max]
///
/// min > max → max = min + 1 (второй элемент = была ли коррекция).
pub fn roll_swarm_count(minimum: u32, maximum: u32, rng: &mut impl Rng) -> (u32, bool) {
    let corrected = minimum > maximum;
    let maximum = if corrected {
        minimum.saturating_add(1)
    } else {
        maximum
    };

    (rng.gen_range(minimum..=maximum), corrected)
}
