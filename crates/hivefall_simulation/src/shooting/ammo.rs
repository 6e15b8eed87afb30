//! Shared ammo reserve + persistence.
//!
//! Один AmmoReserve resource на всю симуляцию (ammo id → count).
//! Все read-modify-write идут внутри систем с `ResMut<AmmoReserve>`,
//! так что мутация по ключу сериализована.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Максимум патронов одного типа
pub const MAX_AMMO: i32 = 100;

/// Запас патронов по типам
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoReserve {
    ammo: BTreeMap<u32, i32>,
}

impl AmmoReserve {
    /// Количество патронов типа (отсутствующий тип = 0)
    pub fn get(&self, ammo_id: u32) -> i32 {
        self.ammo.get(&ammo_id).copied().unwrap_or(0)
    }

    pub fn has_ammo(&self, ammo_id: u32) -> bool {
        self.get(ammo_id) > 0
    }

    /// Добавить (или отнять) патроны, clamp в [0, MAX_AMMO]
    pub fn add(&mut self, ammo_id: u32, amount: i32) -> i32 {
        let value = self.get(ammo_id).saturating_add(amount).clamp(0, MAX_AMMO);
        self.ammo.insert(ammo_id, value);
        value
    }

    /// Выстрел: минус один патрон
    pub fn consume_one(&mut self, ammo_id: u32) -> i32 {
        self.add(ammo_id, -1)
    }

    /// Сколько патронов войдёт в магазин при перезарядке
    pub fn reload_amount(&self, ammo_id: u32, magazine_size: i32) -> i32 {
        self.get(ammo_id).clamp(0, magazine_size.max(0))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.ammo.iter().map(|(&id, &count)| (id, count))
    }

    /// Привести загруженные данные к инварианту [0, MAX_AMMO]
    fn clamped(mut self) -> Self {
        for count in self.ammo.values_mut() {
            *count = (*count).clamp(0, MAX_AMMO);
        }
        self
    }
}

/// Errors surfaced by ammo persistence.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Хранилище ammo reserve между сессиями
pub trait AmmoStore: Send + Sync {
    /// None = сохранения ещё нет
    fn load(&self) -> Result<Option<AmmoReserve>>;
    fn save(&self, reserve: &AmmoReserve) -> Result<()>;
}

/// JSON файл (человекочитаемый, atomic rename при записи)
pub struct JsonFileAmmoStore {
    path: PathBuf,
}

impl JsonFileAmmoStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AmmoStore for JsonFileAmmoStore {
    fn load(&self) -> Result<Option<AmmoReserve>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let reserve: AmmoReserve = serde_json::from_str(&json)?;
        Ok(Some(reserve.clamped()))
    }

    fn save(&self, reserve: &AmmoReserve) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(reserve)?;
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

/// Resource-обёртка над настроенным хранилищем
#[derive(Resource)]
pub struct AmmoPersistence(pub Box<dyn AmmoStore>);

/// Событие: подобран ammo pickup
#[derive(Event, Debug, Clone, Copy)]
pub struct AmmoPickedUp {
    pub ammo_id: u32,
    pub amount: i32,
}

/// Система (Startup): загрузить reserve из хранилища
///
/// Ошибка загрузки логируется, reserve остаётся пустым.
pub fn load_ammo_reserve(persistence: Option<Res<AmmoPersistence>>, mut reserve: ResMut<AmmoReserve>) {
    let Some(persistence) = persistence else {
        return;
    };

    match persistence.0.load() {
        Ok(Some(loaded)) => {
            crate::log_info(&format!("📦 Ammo reserve loaded: {:?}", loaded));
            *reserve = loaded;
        }
        Ok(None) => {}
        Err(error) => {
            crate::log_error(&format!("Failed to load ammo reserve: {}", error));
        }
    }
}

/// Система: сохранить reserve при выходе
pub fn save_ammo_reserve_on_exit(
    mut exit_events: EventReader<AppExit>,
    persistence: Option<Res<AmmoPersistence>>,
    reserve: Res<AmmoReserve>,
) {
    if exit_events.read().next().is_none() {
        return;
    }
    let Some(persistence) = persistence else {
        return;
    };

    if let Err(error) = persistence.0.save(&reserve) {
        crate::log_error(&format!("Failed to save ammo reserve: {}", error));
    }
}

/// Система: AmmoPickedUp → AmmoReserve
pub fn apply_ammo_pickups(mut pickup_events: EventReader<AmmoPickedUp>, mut reserve: ResMut<AmmoReserve>) {
    for pickup in pickup_events.read() {
        let total = reserve.add(pickup.ammo_id, pickup.amount);
        crate::log(&format!(
            "📦 Ammo pickup: +{} of type {} (now {})",
            pickup.amount, pickup.ammo_id, total
        ));
    }
}
