//! Who the enemies are after.
//!
//! The rat and the suit are looked up lazily by marker component and cached
//! in [`TargetCache`]; a cached entity that stops existing is re-resolved on
//! the next refresh.  The resolved target is the suit while it is Occupied
//! and the rat otherwise, so an Empty suit is never a target.

use crate::physics_query::self_and_ancestors;
use crate::possession::{FreeActor, Inactive, Possession, Vehicle};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct TargetCache {
    pub free_actor: Option<Entity>,
    pub vehicle: Option<Entity>,
}

/// Vehicle if it is Occupied, otherwise the free actor.
pub fn resolve_target(cache: &TargetCache, vehicle_occupied: bool) -> Option<Entity> {
    match cache.vehicle {
        Some(vehicle) if vehicle_occupied => Some(vehicle),
        _ => cache.free_actor,
    }
}

pub fn refresh_target_cache_system(
    mut cache: ResMut<TargetCache>,
    actors: Query<Entity, With<FreeActor>>,
    vehicles: Query<Entity, With<Vehicle>>,
) {
    if cache.free_actor.is_none_or(|e| !actors.contains(e)) {
        cache.free_actor = actors.iter().next();
        if let Some(actor) = cache.free_actor {
            debug!("[ai] free actor resolved: {:?}", actor);
        }
    }
    if cache.vehicle.is_none_or(|e| !vehicles.contains(e)) {
        cache.vehicle = vehicles.iter().next();
        if let Some(vehicle) = cache.vehicle {
            debug!("[ai] vehicle resolved: {:?}", vehicle);
        }
    }
}

/// Resolved target as seen by an AI this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub entity: Entity,
    pub position: Vec2,
    /// False while hidden inside the suit.
    pub active: bool,
}

/// Read-only view of the target registry shared by the AI systems.
#[derive(SystemParam)]
pub struct TargetView<'w, 's> {
    cache: Res<'w, TargetCache>,
    vehicles: Query<'w, 's, &'static Possession, With<Vehicle>>,
    bodies: Query<'w, 's, (&'static Transform, Has<Inactive>)>,
    parents: Query<'w, 's, &'static ChildOf>,
}

impl TargetView<'_, '_> {
    pub fn vehicle_occupied(&self) -> bool {
        self.cache
            .vehicle
            .and_then(|v| self.vehicles.get(v).ok())
            .is_some_and(|p| p.is_occupied())
    }

    pub fn target(&self) -> Option<TargetInfo> {
        let entity = resolve_target(&self.cache, self.vehicle_occupied())?;
        let (transform, inactive) = self.bodies.get(entity).ok()?;
        Some(TargetInfo {
            entity,
            position: transform.translation.truncate(),
            active: !inactive,
        })
    }

    /// The suit, when it exists and is Empty (transparent to gunner sight).
    pub fn empty_vehicle(&self) -> Option<Entity> {
        let vehicle = self.cache.vehicle?;
        let possession = self.vehicles.get(vehicle).ok()?;
        (!possession.is_occupied()).then_some(vehicle)
    }

    /// `entity` is `root` or one of its descendants.
    pub fn belongs_to(&self, entity: Entity, root: Entity) -> bool {
        self_and_ancestors(entity, &self.parents).contains(&root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupied_vehicle_is_preferred() {
        let mut world = World::new();
        let rat = world.spawn_empty().id();
        let suit = world.spawn_empty().id();
        let cache = TargetCache {
            free_actor: Some(rat),
            vehicle: Some(suit),
        };
        assert_eq!(resolve_target(&cache, true), Some(suit));
        assert_eq!(resolve_target(&cache, false), Some(rat));
    }

    #[test]
    fn missing_vehicle_falls_back_to_actor() {
        let mut world = World::new();
        let rat = world.spawn_empty().id();
        let cache = TargetCache {
            free_actor: Some(rat),
            vehicle: None,
        };
        assert_eq!(resolve_target(&cache, true), Some(rat));
        assert_eq!(resolve_target(&TargetCache::default(), false), None);
    }

    #[test]
    fn cache_re_resolves_after_despawn() {
        let mut app = App::new();
        app.init_resource::<TargetCache>();
        app.add_systems(Update, refresh_target_cache_system);

        app.update();
        assert_eq!(app.world().resource::<TargetCache>().free_actor, None);

        let first = app.world_mut().spawn(FreeActor).id();
        app.update();
        assert_eq!(app.world().resource::<TargetCache>().free_actor, Some(first));

        app.world_mut().despawn(first);
        let second = app.world_mut().spawn(FreeActor).id();
        app.update();
        assert_eq!(app.world().resource::<TargetCache>().free_actor, Some(second));
    }
}
