//! World компоненты: PrefabPath (визуальные/спавнящиеся ассеты)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Путь к prefab (эффект, враг, дроп, projectile)
///
/// ECS не инстанцирует ассеты сам - только пишет PrefabSpawnRequested / SpawnEffect
/// с этим путём, presentation layer загружает и спавнит.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct PrefabPath {
    pub path: String,
}

impl PrefabPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl From<&str> for PrefabPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
