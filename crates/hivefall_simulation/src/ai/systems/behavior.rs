//! Enemy Behavior FSM systems (setup, per-tick decision, animation output).

use std::collections::HashMap;

use bevy::prelude::*;

use crate::ai::{
    ActionAnimator, ActionFlags, ActionState, AnimationBoolChanged, AnimationParameters,
    EnemyBehavior, LineOfSight, Locomotion, LocomotionContext, LocomotionStrategy, Target,
};
use crate::combat::{AttackStarted, Attacker, Health};
use crate::components::{MovementController, NavAgent, Player};
use crate::lifecycle::SpawnEffect;

/// Система: setup цели для новых врагов
///
/// Враг без явного Target получает entity с маркером Player (если есть).
pub fn acquire_player_target(
    mut enemies: Query<(Entity, &mut Target), Added<EnemyBehavior>>,
    players: Query<Entity, With<Player>>,
) {
    for (entity, mut target) in enemies.iter_mut() {
        if target.0.is_some() {
            continue;
        }

        if let Some(player) = players.iter().next() {
            target.set(Some(player));
            crate::log(&format!("🎯 Enemy {:?} acquired player {:?} as target", entity, player));
        }
    }
}

/// Система: проверка конфигурации атакующих врагов (один раз на спавне)
pub fn validate_enemy_setup(
    enemies: Query<(Entity, &EnemyBehavior, Option<&Attacker>), Added<EnemyBehavior>>,
) {
    for (entity, behavior, attacker) in enemies.iter() {
        if behavior.does_attack && attacker.is_none() {
            crate::log_warning(&format!(
                "Enemy {:?} has does_attack = true but no Attacker component",
                entity
            ));
        }
    }
}

/// Система: главный тик Enemy Behavior FSM
///
/// Порядок решений (общий для всех archetypes):
/// 1. LOS gate для атаки
/// 2. Дистанция до цели < maximum_attack_range
/// 3. Атака (try_attack) → is_attacking; запущенная атака держит флаг до конца
/// 4. Движение разрешено: can_move && (move_while_attacking || !attacking) && LOS gate
///    → Locomotion пишет Transform напрямую, is_moving = true.
///    Ground диверсия обходит gating (кроме can_move и controller).
/// 5. Иначе attacking (не idle) или idle
/// 6. ActionState из флагов (Attacking > Moving > Idle)
pub fn enemy_behavior_tick(
    time: Res<Time>,
    targets: Query<&Target, With<EnemyBehavior>>,
    mut params: ParamSet<(
        Query<&Transform>,
        Query<(
            Entity,
            &EnemyBehavior,
            &Target,
            &LineOfSight,
            &MovementController,
            &mut Transform,
            &mut ActionFlags,
            &mut ActionState,
            Option<&mut Attacker>,
            Option<&mut Locomotion>,
            Option<&mut NavAgent>,
            Option<&Health>,
        )>,
    )>,
    mut attack_events: EventWriter<AttackStarted>,
    mut effect_events: EventWriter<SpawnEffect>,
) {
    let now = time.elapsed_secs();
    let delta = time.delta_secs();

    // Позиции целей до мутации Transform (цель может быть другим врагом)
    let target_positions: HashMap<Entity, Vec3> = {
        let transforms = params.p0();
        targets
            .iter()
            .filter_map(|target| target.0)
            .filter_map(|entity| {
                transforms
                    .get(entity)
                    .ok()
                    .map(|transform| (entity, transform.translation))
            })
            .collect()
    };

    for (
        entity,
        behavior,
        target,
        sight,
        controller,
        mut transform,
        mut flags,
        mut state,
        mut attacker,
        mut locomotion,
        mut nav_agent,
        health,
    ) in params.p1().iter_mut()
    {
        // Мёртвые (в т.ч. ожидающие respawn) ничего не делают
        if health.is_some_and(|health| !health.is_alive()) {
            if let Some(agent) = nav_agent.as_deref_mut() {
                agent.stop();
            }
            set_flags(&mut flags, &mut state, ActionFlags::idle());
            continue;
        }

        let target_position = target.get().and_then(|e| target_positions.get(&e).copied());
        let position = transform.translation;

        // 1-3. Атака
        let sight_for_attack = !behavior.line_of_sight_to_attack || sight.has_sight;
        let in_attack_range = target_position
            .is_some_and(|target| position.distance(target) < behavior.maximum_attack_range);

        let is_attacking = match attacker.as_deref_mut() {
            // Атаки не отменяются: пока идёт - враг атакует
            Some(attacker) if attacker.is_attacking() => true,
            Some(attacker) if behavior.does_attack && in_attack_range && sight_for_attack => {
                let launched = attacker.try_attack(now);
                if launched {
                    attack_events.write(AttackStarted { attacker: entity });

                    if let Some(effect) = &behavior.attack_effect {
                        effect_events.write(SpawnEffect {
                            prefab: effect.clone(),
                            position,
                            rotation: Quat::IDENTITY,
                        });
                    }
                }
                launched
            }
            _ => false,
        };

        // 4. Движение
        let sight_for_movement = !behavior.needs_line_of_sight_to_move || sight.has_sight;
        let movement_permitted = behavior.can_move
            && controller.enabled
            && (behavior.move_while_attacking || !is_attacking)
            && sight_for_movement;

        let ctx = LocomotionContext {
            position,
            rotation: transform.rotation,
            target: target_position,
            move_speed: behavior.move_speed,
            delta,
            now,
            has_sight: sight.has_sight,
            nav_velocity: nav_agent
                .as_deref()
                .map_or(Vec3::ZERO, NavAgent::current_desired_velocity),
        };

        if let (Some(Locomotion::Ground(ground)), Some(agent)) =
            (locomotion.as_deref_mut(), nav_agent.as_deref_mut())
        {
            ground.update_navigation(&ctx, agent, movement_permitted);
        }

        // Диверсия уводит ground врага даже без LOS и посреди атаки
        let diverting = matches!(
            locomotion.as_deref(),
            Some(Locomotion::Ground(ground)) if ground.is_diverting()
        );
        let steering = movement_permitted || (diverting && behavior.can_move && controller.enabled);

        let is_moving = if steering {
            if let Some(locomotion) = locomotion.as_deref() {
                transform.translation = locomotion.desired_position(&ctx);
                transform.rotation = locomotion.desired_rotation(&ctx);
            }
            true
        } else {
            false
        };

        // 5-6. Флаги и состояние
        set_flags(&mut flags, &mut state, ActionFlags::resolve(is_attacking, is_moving));
    }
}

/// Пишем только при изменении (Changed<ActionState> драйвит анимацию)
fn set_flags(flags: &mut Mut<ActionFlags>, state: &mut Mut<ActionState>, resolved: ActionFlags) {
    flags.set_if_neq(resolved);
    state.set_if_neq(ActionState::from(resolved));
}

/// Система: проверка animator параметров (один раз, на setup)
///
/// Отсутствующие в asset параметры кэшируются как выключенные + warning.
pub fn setup_action_animator(
    mut animators: Query<(Entity, &mut ActionAnimator, Option<&AnimationParameters>), Added<ActionAnimator>>,
) {
    for (entity, mut animator, parameters) in animators.iter_mut() {
        let empty = AnimationParameters::default();
        let missing = animator.validate(parameters.unwrap_or(&empty));

        for name in missing {
            crate::log_warning(&format!(
                "Enemy {:?} does not have an animation boolean named '{}' \
                 (make sure the name matches the animator parameter)",
                entity, name
            ));
        }
    }
}

/// Система: ActionState → AnimationBoolChanged (только для кэшированных параметров)
pub fn write_action_animation(
    animators: Query<(Entity, &ActionState, &ActionAnimator), Changed<ActionState>>,
    mut animation_events: EventWriter<AnimationBoolChanged>,
) {
    for (entity, state, animator) in animators.iter() {
        for (parameter, value) in animator.parameters_for(*state) {
            animation_events.write(AnimationBoolChanged {
                entity,
                parameter,
                value,
            });
        }
    }
}
