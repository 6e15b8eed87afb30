//! EnemyDrops - лут при окончательной смерти врага.
//!
//! Выбор дропа намеренно "смещённый": кандидаты сортируются по вероятности
//! по возрастанию, обход идёт с конца, на каждого кандидата свой бросок.
//! Первый с `percentage >= rand` выигрывает. Реальные частоты поэтому
//! отличаются от заданных процентов (частые дропы перетягивают вероятность).

use bevy::prelude::*;
use rand::Rng;

use crate::combat::ActorDied;
use crate::components::PrefabPath;
use crate::lifecycle::PrefabSpawnRequested;
use crate::DeterministicRng;

/// Таблица дропов врага
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct EnemyDrops {
    /// Сколько бросков при смерти
    pub number_of_drops: u32,
    pub drops: Vec<PrefabPath>,
    /// Вероятность каждого дропа в [0, 1], той же длины что `drops`
    pub percentages: Vec<f32>,
}

impl Default for EnemyDrops {
    fn default() -> Self {
        Self {
            number_of_drops: 1,
            drops: Vec::new(),
            percentages: Vec::new(),
        }
    }
}

impl EnemyDrops {
    pub fn new(table: impl IntoIterator<Item = (PrefabPath, f32)>) -> Self {
        let (drops, percentages) = table.into_iter().unzip();
        Self {
            drops,
            percentages,
            ..default()
        }
    }

    pub fn with_count(mut self, number_of_drops: u32) -> Self {
        self.number_of_drops = number_of_drops;
        self
    }

    /// Пары (drop, percentage), отсортированные по percentage по возрастанию
    ///
    /// Несовпадение длин списков → обрезка до короткого.
    pub fn sorted_table(&self) -> Vec<(&PrefabPath, f32)> {
        let mut table: Vec<_> = self
            .drops
            .iter()
            .zip(self.percentages.iter().copied())
            .collect();
        table.sort_by(|a, b| a.1.total_cmp(&b.1));
        table
    }

    pub fn is_consistent(&self) -> bool {
        self.drops.len() == self.percentages.len()
    }

    /// Все броски: Vec выигравших дропов (может быть пустым)
    pub fn roll(&self, rng: &mut impl Rng) -> Vec<PrefabPath> {
        let table = self.sorted_table();
        (0..self.number_of_drops)
            .filter_map(|_| roll_biased(&table, rng).cloned())
            .collect()
    }
}

/// Один бросок по отсортированной (по возрастанию) таблице
pub fn roll_biased<'a, T>(sorted: &[(&'a T, f32)], rng: &mut impl Rng) -> Option<&'a T> {
    sorted
        .iter()
        .rev()
        .find(|(_, percentage)| *percentage >= rng.gen::<f32>())
        .map(|(drop, _)| *drop)
}

/// Система: ActorDied (final) → PrefabSpawnRequested для каждого дропа
///
/// Дропы появляются в позиции и с поворотом умершего врага.
pub fn spawn_enemy_drops(
    mut died_events: EventReader<ActorDied>,
    droppers: Query<(&EnemyDrops, &Transform)>,
    mut spawn_events: EventWriter<PrefabSpawnRequested>,
    mut rng: ResMut<DeterministicRng>,
) {
    for died in died_events.read() {
        if !died.final_death {
            continue;
        }
        let Ok((drops, transform)) = droppers.get(died.entity) else {
            continue;
        };

        if !drops.is_consistent() {
            crate::log_warning(&format!(
                "Drops of {:?}: {} prefabs vs {} percentages, using the shorter list",
                died.entity,
                drops.drops.len(),
                drops.percentages.len()
            ));
        }

        for prefab in drops.roll(&mut rng.rng) {
            crate::log(&format!("🎁 {:?} dropped {}", died.entity, prefab.path));
            spawn_events.write(PrefabSpawnRequested {
                prefab,
                position: transform.translation,
                rotation: transform.rotation,
                requested_by: Some(died.entity),
            });
        }
    }
}
