//! Attack Executor systems (phase timers + start/end payloads).

use bevy::prelude::*;

use crate::combat::{
    roll_swarm_count, AttackPayload, AttackStarted, AttackTransition, Attacker, Health,
    MeleeHitbox,
};
use crate::lifecycle::{DestroyRequested, SpawnEffect};
use crate::shooting::FireRequested;
use crate::spawning::SpawnerTriggered;
use crate::DeterministicRng;
use rand::Rng;

/// Система: продвижение фаз атак + end payload
///
/// Attacking → Cooldown применяет payload конца атаки:
/// - Instant: только лог
/// - Melee: выключить hitboxes
/// - Explosive: эффект взрыва, опционально самоуничтожение
/// - Swarm: N миньонов через случайные спавнеры
///
/// Мёртвый (в т.ч. ragdoll) атакующий только гасит hitboxes: не взрывается и не спавнит.
pub fn advance_attacks(
    mut attackers: Query<(Entity, &mut Attacker, &Transform, Option<&Health>)>,
    mut hitboxes: Query<&mut MeleeHitbox>,
    mut rng: ResMut<DeterministicRng>,
    mut effect_events: EventWriter<SpawnEffect>,
    mut destroy_events: EventWriter<DestroyRequested>,
    mut spawner_events: EventWriter<SpawnerTriggered>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();

    for (entity, mut attacker, transform, health) in attackers.iter_mut() {
        if attacker.advance(now) != Some(AttackTransition::Finished) {
            continue;
        }

        if health.is_some_and(|health| !health.is_alive()) {
            if let AttackPayload::Melee { hitboxes: owned } = &attacker.payload {
                set_hitboxes(&mut hitboxes, owned, false);
            }
            continue;
        }

        match &attacker.payload {
            AttackPayload::Instant => {
                crate::log(&format!("⚔️ Attack made by {:?}", entity));
            }
            AttackPayload::Melee { hitboxes: owned } => {
                set_hitboxes(&mut hitboxes, owned, false);
            }
            AttackPayload::Ranged { .. } => {}
            AttackPayload::Explosive {
                effect,
                die_on_explosion,
            } => {
                if let Some(effect) = effect {
                    effect_events.write(SpawnEffect {
                        prefab: effect.clone(),
                        position: transform.translation,
                        rotation: transform.rotation,
                    });
                }
                crate::log(&format!("💥 {:?} exploded", entity));

                if *die_on_explosion {
                    destroy_events.write(DestroyRequested { entity });
                }
            }
            AttackPayload::Swarm {
                spawners,
                minimum_to_spawn,
                maximum_to_spawn,
            } => {
                if spawners.is_empty() {
                    crate::log_warning(&format!(
                        "Swarm attacker {:?} has no spawners to delegate minions to",
                        entity
                    ));
                    continue;
                }

                let (count, corrected) =
                    roll_swarm_count(*minimum_to_spawn, *maximum_to_spawn, &mut rng.rng);
                if corrected {
                    crate::log_warning(&format!(
                        "Swarm attacker {:?}: minimum_to_spawn ({}) > maximum_to_spawn ({}), using {}..={}",
                        entity,
                        minimum_to_spawn,
                        maximum_to_spawn,
                        minimum_to_spawn,
                        minimum_to_spawn + 1
                    ));
                }

                for _ in 0..count {
                    let spawner = spawners[rng.rng.gen_range(0..spawners.len())];
                    spawner_events.write(SpawnerTriggered { spawner });
                }
            }
        }
    }
}

/// Система: AttackStarted → start payload
///
/// - Melee: включить hitboxes
/// - Ranged: один FireRequested в shooter
pub fn apply_attack_start_payloads(
    mut started_events: EventReader<AttackStarted>,
    attackers: Query<&Attacker>,
    mut hitboxes: Query<&mut MeleeHitbox>,
    mut fire_events: EventWriter<FireRequested>,
) {
    for event in started_events.read() {
        let Ok(attacker) = attackers.get(event.attacker) else {
            continue;
        };

        match &attacker.payload {
            AttackPayload::Melee { hitboxes: owned } => {
                set_hitboxes(&mut hitboxes, owned, true);
            }
            AttackPayload::Ranged {
                shooter: Some(shooter),
            } => {
                fire_events.write(FireRequested { shooter: *shooter });
            }
            _ => {}
        }
    }
}

fn set_hitboxes(hitboxes: &mut Query<&mut MeleeHitbox>, owned: &[Entity], enabled: bool) {
    for &entity in owned {
        if let Ok(mut hitbox) = hitboxes.get_mut(entity) {
            hitbox.set_enabled(enabled);
        }
    }
}
