//! Scene probes used by the enemy brains: sight, ground and walls.
//!
//! Everything here is a plain function over [`PhysicsQuery`] so the rules can
//! be checked against a scripted scene.

use crate::physics_query::{sort_by_distance, PhysicsQuery};
use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;

/// Sight through a hit list: hits for which `transparent` holds are skipped,
/// the first remaining hit decides.  No hits means nothing was seen.
pub fn sees_through<P: PhysicsQuery + ?Sized>(
    physics: &P,
    from: Vec2,
    to: Vec2,
    mask: Group,
    transparent: impl Fn(Entity) -> bool,
    is_target: impl Fn(Entity) -> bool,
) -> bool {
    let delta = to - from;
    let dist = delta.length();
    if dist <= f32::EPSILON {
        return true;
    }

    let mut hits = physics.raycast_all(from, delta, dist, mask);
    sort_by_distance(&mut hits);

    for hit in hits {
        if transparent(hit.entity) {
            continue;
        }
        return is_target(hit.entity);
    }
    false
}

/// Sight decided by the nearest hit only.
pub fn sees_first_hit<P: PhysicsQuery + ?Sized>(
    physics: &P,
    from: Vec2,
    to: Vec2,
    mask: Group,
    is_target: impl Fn(Entity) -> bool,
) -> bool {
    let delta = to - from;
    let dist = delta.length();
    if dist <= f32::EPSILON {
        return true;
    }
    physics
        .raycast(from, delta, dist, mask)
        .is_some_and(|hit| is_target(hit.entity))
}

/// Overlap at the feet; a body without a ground-check point counts as grounded.
pub fn is_grounded<P: PhysicsQuery + ?Sized>(
    physics: &P,
    check_point: Option<Vec2>,
    radius: f32,
    mask: Group,
) -> bool {
    match check_point {
        Some(point) => physics.overlap_circle(point, radius, mask).is_some(),
        None => true,
    }
}

/// Downward ray `forward` units ahead of `origin` in direction `dir` (±1).
pub fn ground_ahead<P: PhysicsQuery + ?Sized>(
    physics: &P,
    origin: Vec2,
    dir: f32,
    forward: f32,
    down: f32,
    mask: Group,
) -> bool {
    let probe = origin + Vec2::new(forward * dir, 0.0);
    physics.raycast(probe, Vec2::NEG_Y, down, mask).is_some()
}

/// Short horizontal ray from `origin + offset` (offset mirrored by `dir`).
pub fn wall_ahead<P: PhysicsQuery + ?Sized>(
    physics: &P,
    origin: Vec2,
    offset: Vec2,
    dir: f32,
    dist: f32,
    mask: Group,
) -> bool {
    let start = origin + Vec2::new(offset.x * dir, offset.y);
    physics
        .raycast(start, Vec2::new(dir, 0.0), dist, mask)
        .is_some()
}

#[cfg(test)]
pub(crate) mod scripted {
    //! Scripted scene for brain and sense tests.

    use crate::physics_query::{PhysicsQuery, RayHit};
    use bevy::prelude::*;
    use bevy_rapier2d::geometry::Group;

    #[derive(Default)]
    pub struct ScriptedScene {
        /// Returned by `raycast_all` regardless of the ray (unsorted on purpose).
        pub ray_hits: Vec<RayHit>,
        /// Returned by `raycast` when the ray points down.
        pub floor: Option<Entity>,
        /// Returned by `raycast` for horizontal rays with x > 0 / x < 0.
        pub wall_right: Option<Entity>,
        pub wall_left: Option<Entity>,
        /// Returned by `overlap_circle`.
        pub overlap: Option<Entity>,
    }

    impl PhysicsQuery for ScriptedScene {
        fn overlap_circle(&self, _c: Vec2, _r: f32, _m: Group) -> Option<Entity> {
            self.overlap
        }

        fn overlap_box(&self, _c: Vec2, _h: Vec2, _m: Group) -> Option<Entity> {
            self.overlap
        }

        fn raycast(&self, _o: Vec2, dir: Vec2, max_dist: f32, _m: Group) -> Option<RayHit> {
            let entity = if dir.y < 0.0 && dir.x == 0.0 {
                self.floor
            } else if dir.y == 0.0 && dir.x > 0.0 {
                self.wall_right
            } else if dir.y == 0.0 && dir.x < 0.0 {
                self.wall_left
            } else {
                let mut hits = self.ray_hits.clone();
                crate::physics_query::sort_by_distance(&mut hits);
                return hits.first().copied();
            };
            entity.map(|entity| RayHit {
                entity,
                distance: max_dist * 0.5,
            })
        }

        fn raycast_all(&self, _o: Vec2, _d: Vec2, _m: f32, _mask: Group) -> Vec<RayHit> {
            self.ray_hits.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::scripted::ScriptedScene;
    use super::*;
    use crate::physics_query::RayHit;

    struct Scene {
        suit: Entity,
        rat: Entity,
        crate_box: Entity,
    }

    fn entities() -> Scene {
        let mut world = World::new();
        Scene {
            suit: world.spawn_empty().id(),
            rat: world.spawn_empty().id(),
            crate_box: world.spawn_empty().id(),
        }
    }

    fn hit(entity: Entity, distance: f32) -> RayHit {
        RayHit { entity, distance }
    }

    #[test]
    fn empty_suit_in_front_is_transparent() {
        let s = entities();
        let scene = ScriptedScene {
            ray_hits: vec![hit(s.rat, 4.0), hit(s.suit, 2.0)],
            ..Default::default()
        };
        let sees = sees_through(
            &scene,
            Vec2::ZERO,
            Vec2::new(5.0, 0.0),
            Group::ALL,
            |e| e == s.suit,
            |e| e == s.rat,
        );
        assert!(sees);
    }

    #[test]
    fn occupied_suit_in_front_blocks() {
        let s = entities();
        let scene = ScriptedScene {
            ray_hits: vec![hit(s.rat, 4.0), hit(s.suit, 2.0)],
            ..Default::default()
        };
        let sees = sees_through(
            &scene,
            Vec2::ZERO,
            Vec2::new(5.0, 0.0),
            Group::ALL,
            |_| false,
            |e| e == s.rat,
        );
        assert!(!sees);
    }

    #[test]
    fn obstacle_before_target_blocks_and_no_hits_is_blind() {
        let s = entities();
        let scene = ScriptedScene {
            ray_hits: vec![hit(s.crate_box, 1.0), hit(s.rat, 3.0)],
            ..Default::default()
        };
        assert!(!sees_through(&scene, Vec2::ZERO, Vec2::X * 4.0, Group::ALL, |_| false, |e| e == s.rat));

        let empty = ScriptedScene::default();
        assert!(!sees_through(&empty, Vec2::ZERO, Vec2::X * 4.0, Group::ALL, |_| false, |e| e == s.rat));
    }

    #[test]
    fn first_hit_sight_uses_nearest_hit() {
        let s = entities();
        let scene = ScriptedScene {
            ray_hits: vec![hit(s.rat, 3.0), hit(s.suit, 1.0)],
            ..Default::default()
        };
        assert!(!sees_first_hit(&scene, Vec2::ZERO, Vec2::new(1.0, 1.0), Group::ALL, |e| e == s.rat));
    }

    #[test]
    fn missing_ground_check_means_grounded() {
        let scene = ScriptedScene::default();
        assert!(is_grounded(&scene, None, 0.1, Group::ALL));
        assert!(!is_grounded(&scene, Some(Vec2::ZERO), 0.1, Group::ALL));
    }

    #[test]
    fn ground_and_wall_rays_follow_direction() {
        let s = entities();
        let scene = ScriptedScene {
            floor: Some(s.crate_box),
            wall_left: Some(s.crate_box),
            ..Default::default()
        };
        assert!(ground_ahead(&scene, Vec2::ZERO, 1.0, 0.6, 1.5, Group::ALL));
        assert!(wall_ahead(&scene, Vec2::ZERO, Vec2::new(0.15, 0.0), -1.0, 0.25, Group::ALL));
        assert!(!wall_ahead(&scene, Vec2::ZERO, Vec2::new(0.15, 0.0), 1.0, 0.25, Group::ALL));
    }
}
