//! Конфигурация симуляции (seed, частота тика, сохранение патронов)

use std::path::PathBuf;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Глобальные настройки SimulationPlugin
///
/// Отсутствующие в JSON поля берутся из Default.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed для DeterministicRng
    pub seed: u64,
    /// Частота FixedUpdate (Hz)
    pub tick_hz: f64,
    /// Файл AmmoReserve (None = без persistence)
    pub ammo_save_path: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_hz: 60.0,
            ammo_save_path: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// tick_hz <= 0 → 60Hz
    pub fn effective_tick_hz(&self) -> f64 {
        if self.tick_hz > 0.0 {
            self.tick_hz
        } else {
            60.0
        }
    }
}
