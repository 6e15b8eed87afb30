//! Shooting components: Gun, Shooter, GunSmoke + fire events.
//!
//! Architecture:
//! - Gun живёт на своей entity (child актора), Transform = fire location
//! - Shooter на акторе: список guns + какой экипирован
//! - FireRequested (input игрока или Ranged атака) → fire_guns → GunFired
//! - GunFired читают наблюдатели (GunSmoke фильтрует по своему gun)

use bevy::prelude::*;

use crate::components::PrefabPath;

/// Огнестрельное оружие
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Gun {
    /// Пауза между выстрелами (секунды)
    pub fire_delay: f32,
    /// Снаряд (None = выстрел без projectile, только эффект)
    pub projectile: Option<PrefabPath>,
    /// Эффект выстрела (вспышка)
    pub fire_effect: Option<PrefabPath>,
    /// Снарядов за выстрел (дробовик > 1)
    pub maximum_to_fire: u32,
    /// Максимальный разброс (градусы, по yaw и pitch)
    pub maximum_spread_degrees: f32,
    /// Доступно ли оружие (подобрано)
    pub available: bool,
    pub use_ammo: bool,
    pub ammo_id: u32,
    pub must_reload: bool,
    pub magazine_size: i32,
    pub rounds_loaded: i32,
    /// Длительность перезарядки (секунды)
    pub reload_time: f32,
    /// Вражеское оружие: всегда целится в Target владельца
    pub aim_at_owner_target: bool,
    /// Deadline следующего выстрела (elapsed secs)
    pub able_to_fire_again_at: f32,
    /// Deadline окончания перезарядки
    pub reloading_until: Option<f32>,
}

impl Default for Gun {
    fn default() -> Self {
        Self {
            fire_delay: 0.02,
            projectile: None,
            fire_effect: None,
            maximum_to_fire: 1,
            maximum_spread_degrees: 0.0,
            available: false,
            use_ammo: false,
            ammo_id: 0,
            must_reload: false,
            magazine_size: 1,
            rounds_loaded: 0,
            reload_time: 1.0,
            aim_at_owner_target: true,
            able_to_fire_again_at: 0.0,
            reloading_until: None,
        }
    }
}

impl Gun {
    pub fn new(projectile: impl Into<PrefabPath>) -> Self {
        Self {
            projectile: Some(projectile.into()),
            available: true,
            ..default()
        }
    }

    pub fn with_magazine(mut self, ammo_id: u32, magazine_size: i32, reload_time: f32) -> Self {
        self.use_ammo = true;
        self.must_reload = true;
        self.ammo_id = ammo_id;
        self.magazine_size = magazine_size.max(1);
        self.reload_time = reload_time;
        self
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading_until.is_some()
    }

    pub fn ready_to_fire(&self, now: f32) -> bool {
        !self.is_reloading() && self.able_to_fire_again_at <= now
    }
}

/// Стрелок: набор оружия актора
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Shooter {
    pub guns: Vec<Entity>,
    /// Индекс экипированного gun в `guns`
    pub equipped: usize,
}

impl Shooter {
    pub fn new(guns: Vec<Entity>) -> Self {
        Self { guns, equipped: 0 }
    }

    pub fn equipped_gun(&self) -> Option<Entity> {
        self.guns.get(self.equipped).copied()
    }
}

/// Дым от ствола: "нагрев" растёт от выстрелов и рассеивается каждый тик
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct GunSmoke {
    /// Чей дым (наблюдаем только выстрелы этого gun)
    pub gun: Entity,
    pub heat: f32,
    pub heat_increment_on_fire: f32,
    /// Потеря heat за тик
    pub heat_dissipation_rate: f32,
}

impl GunSmoke {
    pub fn new(gun: Entity) -> Self {
        Self {
            gun,
            heat: 0.0,
            heat_increment_on_fire: 0.15,
            heat_dissipation_rate: 0.1,
        }
    }

    pub fn dissipate(&mut self) {
        self.heat = (self.heat - self.heat_dissipation_rate).max(0.0);
    }

    pub fn on_fire(&mut self, fired: Entity) {
        if fired == self.gun {
            self.heat += self.heat_increment_on_fire;
        }
    }
}

/// Запрос: выстрелить из экипированного оружия
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireRequested {
    pub shooter: Entity,
}

/// Событие: оружие выстрелило
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GunFired {
    pub gun: Entity,
    pub shooter: Entity,
    pub position: Vec3,
}

/// Событие: подобран gun pickup (сделать оружие с индексом доступным)
#[derive(Event, Debug, Clone, Copy)]
pub struct GunPickedUp {
    pub shooter: Entity,
    pub gun_index: usize,
}
