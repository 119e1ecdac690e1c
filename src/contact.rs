//! Melee contact damage (the spitter hurting whoever touches it).
//!
//! Two systems split the work so the damage rule runs without Rapier:
//!
//! 1. [`gather_touch_contacts_system`] copies the colliders currently touching
//!    each emitter into its [`TouchContacts`].
//! 2. [`contact_damage_system`] evaluates every touching collider, every frame.
//!
//! One `next_touch_at` deadline is shared by all targets of an emitter, and it
//! only re-arms when a hit actually landed: touching an Empty suit or an
//! invulnerable rat does not burn the cooldown.

use crate::damage::{DamageResolver, DamageSource, StrikeReach};
use crate::possession::{FreeActor, Vehicle};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

#[derive(Component, Debug, Clone)]
pub struct ContactDamage {
    pub damage: u32,
    pub cooldown: f32,
    next_touch_at: f32,
}

impl ContactDamage {
    pub fn new(damage: u32, cooldown: f32) -> Self {
        Self {
            damage: damage.max(1),
            cooldown: cooldown.max(0.0),
            next_touch_at: f32::NEG_INFINITY,
        }
    }

    #[inline]
    pub fn ready(&self, now: f32) -> bool {
        now >= self.next_touch_at
    }

    #[inline]
    pub fn next_touch_at(&self) -> f32 {
        self.next_touch_at
    }

    fn arm(&mut self, now: f32) {
        self.next_touch_at = now + self.cooldown;
    }
}

/// Colliders currently touching an emitter.
#[derive(Component, Debug, Clone, Default)]
pub struct TouchContacts {
    pub touching: Vec<Entity>,
}

pub fn gather_touch_contacts_system(
    mut q: Query<(Entity, &mut TouchContacts)>,
    rapier_context: ReadRapierContext,
) {
    let Ok(rapier) = rapier_context.single() else {
        return;
    };

    for (emitter, mut contacts) in q.iter_mut() {
        contacts.touching.clear();

        for contact_pair in rapier.contact_pairs_with(emitter) {
            if !contact_pair.has_any_active_contact() {
                continue;
            }
            let Some(e1) = contact_pair.collider1() else {
                continue;
            };
            let Some(e2) = contact_pair.collider2() else {
                continue;
            };
            contacts.touching.push(if e1 == emitter { e2 } else { e1 });
        }

        for (e1, e2, intersecting) in rapier.intersection_pairs_with(emitter) {
            if intersecting {
                contacts.touching.push(if e1 == emitter { e2 } else { e1 });
            }
        }
    }
}

/// Apply contact damage to eligible touching bodies.
///
/// The rat is always eligible; the suit only while Occupied (enforced by the
/// occupancy gate inside [`DamageResolver::strike`]).
pub fn contact_damage_system(
    mut emitters: Query<(Entity, &mut ContactDamage, &TouchContacts)>,
    tagged: Query<(), Or<(With<FreeActor>, With<Vehicle>)>>,
    mut resolver: DamageResolver,
) {
    let now = resolver.now();
    for (emitter, mut contact, contacts) in emitters.iter_mut() {
        if !contact.ready(now) {
            continue;
        }

        for &other in &contacts.touching {
            let eligible = resolver
                .chain(other)
                .into_iter()
                .any(|e| tagged.contains(e));
            if !eligible {
                continue;
            }

            if resolver.strike(other, contact.damage, DamageSource::Contact, StrikeReach::HealthOnly) {
                contact.arm(now);
                debug!("[contact] {:?} touched {:?}", emitter, other);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::damage::DamageDealt;
    use crate::effects::PresentationCue;
    use crate::health::{Health, HealthTuning};
    use crate::possession::Possession;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn contact_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
        app.add_message::<PresentationCue>();
        app.add_message::<DamageDealt>();
        app.insert_resource(GameConfig::default());
        app.add_systems(Update, contact_damage_system);
        app
    }

    /// Rat whose invulnerability ends before the emitter cooldown does.
    fn spawn_rat(app: &mut App) -> Entity {
        let mut config = GameConfig::default();
        config.actor_max_hp = 10;
        config.flash_count = 1;
        config.flash_interval = 0.05;
        config.actor_extra_invuln = 0.0;
        app.world_mut()
            .spawn((FreeActor, Health::new(HealthTuning::actor(&config))))
            .id()
    }

    fn hp(app: &App, e: Entity) -> u32 {
        app.world().get::<Health>(e).unwrap().hp()
    }

    #[test]
    fn cooldown_limits_hits_and_rearms() {
        let mut app = contact_app();
        let rat = spawn_rat(&mut app);
        let frog = app
            .world_mut()
            .spawn((
                ContactDamage::new(1, 0.6),
                TouchContacts {
                    touching: vec![rat],
                },
            ))
            .id();

        app.update(); // t = 0.0, first hit
        assert_eq!(hp(&app, rat), 9);

        app.update(); // t = 0.1, still cooling down
        app.update(); // t = 0.2
        assert_eq!(hp(&app, rat), 9);

        for _ in 0..5 {
            app.update(); // t = 0.3 .. 0.7
        }
        assert_eq!(hp(&app, rat), 8);
        let contact = app.world().get::<ContactDamage>(frog).unwrap();
        assert!(contact.next_touch_at() > 0.6);
    }

    #[test]
    fn empty_suit_does_not_consume_cooldown() {
        let mut app = contact_app();
        let config = GameConfig::default();
        let suit = app
            .world_mut()
            .spawn((
                Vehicle,
                Possession::new(0.35),
                Health::new(HealthTuning::suit(&config)),
            ))
            .id();
        let rat = spawn_rat(&mut app);
        let frog = app
            .world_mut()
            .spawn((
                ContactDamage::new(1, 0.6),
                TouchContacts {
                    touching: vec![suit, rat],
                },
            ))
            .id();

        app.update();

        assert_eq!(hp(&app, suit), config.suit_max_hp);
        assert_eq!(hp(&app, rat), 9);
        assert!(!app.world().get::<ContactDamage>(frog).unwrap().ready(0.1));
    }

    #[test]
    fn untagged_bodies_are_ignored() {
        let mut app = contact_app();
        let config = GameConfig::default();
        let other = app
            .world_mut()
            .spawn(Health::new(HealthTuning::spitter(&config)))
            .id();
        let frog = app
            .world_mut()
            .spawn((
                ContactDamage::new(1, 0.6),
                TouchContacts {
                    touching: vec![other],
                },
            ))
            .id();

        app.update();
        assert_eq!(hp(&app, other), config.spitter_max_hp);
        assert!(app.world().get::<ContactDamage>(frog).unwrap().ready(0.0));
    }
}
