//! Базовые компоненты акторов: Actor, Player

use bevy::prelude::*;

use crate::components::{MovementController, PrefabPath};

/// Актор (игрок, враг, босс) - базовый компонент для всех damageable сущностей
///
/// Required Components: Transform (позиция) + MovementController (движение вкл/выкл).
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, MovementController)]
pub struct Actor {
    /// Stable ID фракции (melee hitbox не бьёт своих)
    pub faction_id: u64,
}

impl Actor {
    pub fn new(faction_id: u64) -> Self {
        Self { faction_id }
    }

    pub fn is_hostile_to(&self, other: &Actor) -> bool {
        self.faction_id != other.faction_id
    }
}

/// Marker component для player-controlled entity
///
/// - Враги без явного Target получают Player как цель на setup
/// - Финальная смерть Player → GameOver
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Эффект который спавнится когда entity уничтожается (взрыв, giblets, труп)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct OnDestroyEffect {
    pub prefab: PrefabPath,
}
