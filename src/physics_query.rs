//! Scene-query seam between the gameplay core and Rapier.
//!
//! Every AI and finisher system reads the world through [`PhysicsQuery`]:
//! overlap circle/box, nearest raycast and all-hits raycast.  [`RapierQuery`]
//! implements it on top of `bevy_rapier2d`'s scene queries; tests use a
//! scripted fake.
//!
//! ## Collision layers
//!
//! | Group | Members |
//! |-------|---------|
//! | [`layers::GROUND`] | floors and platforms |
//! | [`layers::WALL`] | walls and the door |
//! | [`layers::ACTOR`] | rat and suit bodies |
//! | [`layers::ENEMY`] | gunners and spitters |
//! | [`layers::PLAYER_SHOT`] | suit bullets |
//! | [`layers::ENEMY_SHOT`] | slow bullets and acid |
//! | [`layers::INTERACT`] | suit / panel interaction zones |

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::collections::HashSet;

pub mod layers {
    use bevy_rapier2d::geometry::Group;

    pub const GROUND: Group = Group::GROUP_1;
    pub const ACTOR: Group = Group::GROUP_2;
    pub const ENEMY: Group = Group::GROUP_3;
    pub const PLAYER_SHOT: Group = Group::GROUP_4;
    pub const ENEMY_SHOT: Group = Group::GROUP_5;
    pub const INTERACT: Group = Group::GROUP_6;
    pub const WALL: Group = Group::GROUP_7;

    /// Everything a body can stand on or be blocked by.
    pub const SOLID: Group = GROUND.union(WALL);
}

/// One raycast hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    /// Distance from the ray origin (the direction is normalised).
    pub distance: f32,
}

/// Read-only scene queries consumed by the gameplay core.
pub trait PhysicsQuery {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: Group) -> Option<Entity>;

    fn overlap_box(&self, center: Vec2, half_extents: Vec2, mask: Group) -> Option<Entity>;

    fn raycast(&self, origin: Vec2, dir: Vec2, max_dist: f32, mask: Group) -> Option<RayHit>;

    /// All hits along the ray, unsorted.
    fn raycast_all(&self, origin: Vec2, dir: Vec2, max_dist: f32, mask: Group) -> Vec<RayHit>;
}

/// [`PhysicsQuery`] backed by the Rapier scene.
pub struct RapierQuery<'a> {
    context: &'a RapierContext<'a>,
}

impl<'a> RapierQuery<'a> {
    pub fn new(context: &'a RapierContext<'a>) -> Self {
        Self { context }
    }

    fn filter(mask: Group) -> QueryFilter<'static> {
        QueryFilter::default().groups(CollisionGroups::new(Group::ALL, mask))
    }
}

impl PhysicsQuery for RapierQuery<'_> {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: Group) -> Option<Entity> {
        let shape = Collider::ball(radius);
        let mut hit = None;
        self.context
            .intersect_shape(center, 0.0, &*shape.raw, Self::filter(mask), |entity| {
                hit = Some(entity);
                false
            });
        hit
    }

    fn overlap_box(&self, center: Vec2, half_extents: Vec2, mask: Group) -> Option<Entity> {
        let shape = Collider::cuboid(half_extents.x, half_extents.y);
        let mut hit = None;
        self.context
            .intersect_shape(center, 0.0, &*shape.raw, Self::filter(mask), |entity| {
                hit = Some(entity);
                false
            });
        hit
    }

    fn raycast(&self, origin: Vec2, dir: Vec2, max_dist: f32, mask: Group) -> Option<RayHit> {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }
        self.context
            .cast_ray(origin, dir, max_dist, true, Self::filter(mask))
            .map(|(entity, distance)| RayHit { entity, distance })
    }

    fn raycast_all(&self, origin: Vec2, dir: Vec2, max_dist: f32, mask: Group) -> Vec<RayHit> {
        let dir = dir.normalize_or_zero();
        let mut hits = Vec::new();
        if dir == Vec2::ZERO {
            return hits;
        }
        self.context.intersect_ray(
            origin,
            dir,
            max_dist,
            true,
            Self::filter(mask),
            |entity, intersection| {
                hits.push(RayHit {
                    entity,
                    distance: intersection.time_of_impact,
                });
                true
            },
        );
        hits
    }
}

/// Sort hits nearest-first.
pub fn sort_by_distance(hits: &mut [RayHit]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}

// ── Pairwise collision ignores ───────────────────────────────────────────────

/// Collider pairs whose contacts the gameplay layer must not react to.
///
/// Bullets are sensors, so "ignoring" a pair means every hit-resolution
/// system skips `CollisionEvent`s between the two entities.
#[derive(Resource, Debug, Default)]
pub struct CollisionIgnores {
    pairs: HashSet<(Entity, Entity)>,
}

impl CollisionIgnores {
    fn key(a: Entity, b: Entity) -> (Entity, Entity) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn ignore_pair(&mut self, a: Entity, b: Entity, ignore: bool) {
        if ignore {
            self.pairs.insert(Self::key(a, b));
        } else {
            self.pairs.remove(&Self::key(a, b));
        }
    }

    pub fn is_ignored(&self, a: Entity, b: Entity) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Drop ignore pairs that reference despawned entities.
pub fn prune_collision_ignores_system(mut ignores: ResMut<CollisionIgnores>, alive: Query<()>) {
    if ignores.is_empty() {
        return;
    }
    ignores
        .pairs
        .retain(|(a, b)| alive.contains(*a) && alive.contains(*b));
}

// ── Hierarchy helpers ────────────────────────────────────────────────────────

/// `entity` followed by each of its ancestors, nearest first.
pub fn self_and_ancestors(entity: Entity, parents: &Query<&ChildOf>) -> Vec<Entity> {
    let mut chain = vec![entity];
    let mut current = entity;
    while let Ok(child_of) = parents.get(current) {
        current = child_of.parent();
        chain.push(current);
    }
    chain
}

/// Top-most ancestor of `entity` (itself when it has no parent).
pub fn root_of(entity: Entity, parents: &Query<&ChildOf>) -> Entity {
    let mut current = entity;
    while let Ok(child_of) = parents.get(current) {
        current = child_of.parent();
    }
    current
}

/// Membership groups of a collider; Rapier treats a missing component as `ALL`.
pub fn memberships(groups: Option<&CollisionGroups>) -> Group {
    groups.map(|g| g.memberships).unwrap_or(Group::ALL)
}
