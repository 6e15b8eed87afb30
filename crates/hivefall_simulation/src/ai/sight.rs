//! Line-of-Sight Oracle - raycast проверка видимости цели
//!
//! Правило: LOS чистый только если ПЕРВОЕ препятствие на луче - сама цель
//! или её потомок (коллайдер на child entity: голова, hitbox).
//! Нет цели / нет попадания / попали в стену → LOS заблокирован.
//!
//! Backend абстрагирован через `RayCaster`:
//! - production: Rapier query pipeline (`RapierContext`)
//! - тесты: fake caster с заранее известным попаданием

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::ai::Target;

/// Слои препятствий для LOS луча (bitmask)
///
/// Маппится на Rapier `Group`: луч видит только коллайдеры
/// с membership в этих группах.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct ObstructionMask(pub u32);

impl ObstructionMask {
    pub const ALL: Self = Self(u32::MAX);

    pub fn group(self) -> Group {
        Group::from_bits_truncate(self.0)
    }
}

impl Default for ObstructionMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Результат LOS проверки актора (обновляется каждый тик)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct LineOfSight {
    pub mask: ObstructionMask,
    /// Видит ли актор свою цель на текущем тике
    pub has_sight: bool,
    /// Высота глаз над origin (луч из головы, не из ног)
    pub eye_height: f32,
}

/// Raycast backend
pub trait RayCaster {
    /// Ближайшая entity на луче (direction нормализован)
    ///
    /// Коллайдеры, для которых `include` вернул false, луч пропускает насквозь.
    fn first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ObstructionMask,
        include: &dyn Fn(Entity) -> bool,
    ) -> Option<Entity>;
}

impl RayCaster for RapierContext<'_> {
    fn first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ObstructionMask,
        include: &dyn Fn(Entity) -> bool,
    ) -> Option<Entity> {
        let filter = QueryFilter::new()
            .groups(CollisionGroups::new(Group::ALL, mask.group()))
            .predicate(&include);

        self.cast_ray(origin, direction, max_distance, true, filter)
            .map(|(entity, _toi)| entity)
    }
}

/// `candidate` == `ancestor` или его потомок (подъём по ChildOf)
pub fn is_self_or_descendant(
    candidate: Entity,
    ancestor: Entity,
    parent_of: impl Fn(Entity) -> Option<Entity>,
) -> bool {
    let mut current = Some(candidate);
    while let Some(entity) = current {
        if entity == ancestor {
            return true;
        }
        current = parent_of(entity);
    }
    false
}

/// Есть ли у `from` прямая видимость на `target`
///
/// Чистая функция: никаких side effects, состояние не хранится.
/// Коллайдеры самого `viewer` и его потомков луч не блокируют.
pub fn has_sight(
    caster: &impl RayCaster,
    parent_of: impl Fn(Entity) -> Option<Entity>,
    from: Vec3,
    viewer: Option<Entity>,
    target: Option<(Entity, Vec3)>,
    mask: ObstructionMask,
) -> bool {
    let Some((target_entity, target_position)) = target else {
        return false;
    };

    let offset = target_position - from;
    let distance = offset.length();
    let Some(direction) = offset.try_normalize() else {
        // Цель в той же точке - луч не построить
        return false;
    };

    // Чуть дальше цели: попадание в её коллайдер на границе должно засчитаться
    let include =
        |hit: Entity| !viewer.is_some_and(|viewer| is_self_or_descendant(hit, viewer, &parent_of));
    let Some(hit) = caster.first_hit(from, direction, distance + 0.5, mask, &include) else {
        return false;
    };

    is_self_or_descendant(hit, target_entity, &parent_of)
}

/// Система: обновление LineOfSight через Rapier query pipeline
///
/// Без RapierContext (headless без физики) - has_sight не трогаем,
/// его выставляет внешний код/тесты.
pub fn update_line_of_sight(
    rapier: ReadRapierContext,
    mut viewers: Query<(Entity, &GlobalTransform, &Target, &mut LineOfSight)>,
    targets: Query<&GlobalTransform>,
    hierarchy: Query<&ChildOf>,
) {
    let Ok(context) = rapier.single() else {
        return;
    };

    let parent_of = |entity: Entity| hierarchy.get(entity).ok().map(|child_of| child_of.parent());

    for (entity, transform, target, mut sight) in viewers.iter_mut() {
        let target = target
            .0
            .and_then(|target| targets.get(target).ok().map(|t| (target, t.translation())));

        let from = transform.translation() + Vec3::Y * sight.eye_height;
        let visible = has_sight(&context, parent_of, from, Some(entity), target, sight.mask);

        if sight.has_sight != visible {
            sight.has_sight = visible;
        }
    }
}
