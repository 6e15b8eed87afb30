//! Combat system module
//!
//! ECS ответственность:
//! - Attack Executor: фазы атаки, cooldown, payloads (melee, ranged, explosive, swarm)
//! - Health/Lifecycle FSM: урон, неуязвимость, смерть, ragdoll, lives/respawn
//! - Events: DamageDealt, ActorDied, ActorRespawned, GameOver
//!
//! Presentation ответственность:
//! - Анимации атак, VFX по SpawnEffect
//! - Физика ragdoll после Ragdolled

use bevy::prelude::*;

pub mod attacker;
pub mod damage;
pub mod health;
pub mod hitbox;
pub mod systems;

// Re-export основных типов
pub use attacker::{
    roll_swarm_count, AttackPayload, AttackPhase, AttackStarted, AttackTransition, Attacker,
};
pub use damage::{
    ActorDied, ActorRespawned, AddLivesRequest, DamageDealt, DamageRequest, GameOver, HealRequest,
    HealthChanged,
};
pub use health::{Death, Health, HealthChange, LifeState, Ragdoll, Ragdolled};
pub use hitbox::{melee_hitbox_bundle, MeleeHitbox};

use crate::SimulationSet;

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate (60Hz).
///
/// Порядок выполнения:
/// 1. advance_attacks (Timers) - фазы атак + end payloads, до решения FSM
/// 2. apply_attack_start_payloads → detect_melee_hits (Attacks) - после FSM
/// 3. Health (Damage): requests → смерть → respawn
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<AttackStarted>()
            .add_event::<DamageRequest>()
            .add_event::<HealRequest>()
            .add_event::<AddLivesRequest>()
            .add_event::<DamageDealt>()
            .add_event::<HealthChanged>()
            .add_event::<ActorDied>()
            .add_event::<ActorRespawned>()
            .add_event::<GameOver>();

        // Регистрация систем в FixedUpdate
        app.add_systems(
            FixedUpdate,
            systems::advance_attacks.in_set(SimulationSet::Timers),
        )
        .add_systems(
            FixedUpdate,
            (systems::apply_attack_start_payloads, hitbox::detect_melee_hits)
                .chain()
                .in_set(SimulationSet::Attacks),
        )
        .add_systems(
            FixedUpdate,
            (
                systems::init_respawn_points,
                systems::apply_damage_requests,
                systems::apply_heal_requests,
                systems::apply_add_lives_requests,
                systems::handle_actor_deaths,
                systems::tick_respawns,
            )
                .chain() // Последовательное выполнение
                .in_set(SimulationSet::Damage),
        );
    }
}
