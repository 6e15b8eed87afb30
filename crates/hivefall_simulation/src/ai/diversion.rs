//! Diversion zones ("turn-arounders")
//!
//! Триггер-зона разворачивает ground врагов: отправляет к случайной точке
//! рядом с target_location на случайное время, потом они возвращаются к цели.
//! Overlap детектит presentation/physics layer → DiversionZoneEntered.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::Locomotion;
use crate::DeterministicRng;

/// Зона диверсии
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct DiversionZone {
    /// Выключенная зона игнорирует входящих
    pub enabled: bool,
    /// Куда разворачиваем
    pub target_location: Vec3,
    /// Разброс точки по X/Z (метры)
    pub location_variance: f32,
    /// Минимум времени на попытку дойти (секунды)
    pub minimum_time: f32,
    /// Максимум времени на попытку дойти (секунды)
    pub maximum_time: f32,
}

impl Default for DiversionZone {
    fn default() -> Self {
        Self {
            enabled: true,
            target_location: Vec3::ZERO,
            location_variance: 0.0,
            minimum_time: 1.0,
            maximum_time: 5.0,
        }
    }
}

impl DiversionZone {
    pub fn new(target_location: Vec3) -> Self {
        Self {
            target_location,
            ..default()
        }
    }

    pub fn turn_on(&mut self) {
        self.enabled = true;
    }

    pub fn turn_off(&mut self) {
        self.enabled = false;
    }

    /// Случайная точка + время на диверсию
    pub fn roll_order(&self, rng: &mut impl Rng) -> (Vec3, f32) {
        let variance = self.location_variance.abs();
        let offset = Vec3::new(
            rng.gen_range(-variance..=variance),
            0.0,
            rng.gen_range(-variance..=variance),
        );

        let (low, high) = if self.minimum_time <= self.maximum_time {
            (self.minimum_time, self.maximum_time)
        } else {
            (self.maximum_time, self.minimum_time)
        };

        (self.target_location + offset, rng.gen_range(low..=high))
    }
}

/// Событие: актор вошёл (или находится) в зоне диверсии
#[derive(Event, Debug, Clone, Copy)]
pub struct DiversionZoneEntered {
    pub zone: Entity,
    pub actor: Entity,
}

/// Система: назначение диверсий ground врагам
///
/// Не-ground акторы (flying, турели) зону игнорируют.
pub fn apply_diversion_zones(
    mut entered_events: EventReader<DiversionZoneEntered>,
    zones: Query<&DiversionZone>,
    mut actors: Query<&mut Locomotion>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();

    for event in entered_events.read() {
        let Ok(zone) = zones.get(event.zone) else {
            continue;
        };
        if !zone.enabled {
            continue;
        }

        let Ok(mut locomotion) = actors.get_mut(event.actor) else {
            continue;
        };
        let Some(ground) = locomotion.as_ground_mut() else {
            continue;
        };

        let (point, time_to_spend) = zone.roll_order(&mut rng.rng);
        ground.go_to_point(point, time_to_spend, now);

        crate::log(&format!(
            "↩️ Diversion: {:?} → {:?} for {:.1}s",
            event.actor, point, time_to_spend
        ));
    }
}
