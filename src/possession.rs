//! Suit possession: the rat climbs into the suit and back out.
//!
//! ## State machine
//!
//! ```text
//!            interact ∧ candidate ∧ now ≥ lockout_until
//!   Empty ───────────────────────────────────────────────▶ Occupied
//!     ▲                                                      │
//!     └──────────────────────── interact ────────────────────┘
//!                   (lockout_until = now + reenter_block_time)
//! ```
//!
//! [`Possession`] is the pure state machine; the systems below apply its
//! transitions to the world:
//!
//! - **Enter**: the rat is hidden and its rigid body and collider disabled
//!   ([`Inactive`]), the suit's friction switches to the driven profile,
//!   [`VehicleDrive`] is enabled and the camera retargets to the suit.
//! - **Exit**: the rat reappears at the eject point with an eject velocity
//!   along the suit's facing, the suit parks (friction restored, drive off)
//!   and the camera goes back to the rat.
//! - **Wreck**: a suit whose `Health` dies while Occupied ejects its occupant
//!   the same way before it is removed.
//!
//! Candidate tracking comes from Rapier collision events on the suit's
//! [`SuitZone`] sensor and is only live while the suit is Empty.

use crate::config::GameConfig;
use crate::control::{Facing, InteractPressed};
use crate::effects::{PresentationCue, SoundCue};
use crate::error::{CoreError, CoreResult};
use crate::health::{Damageable, Health};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Markers ───────────────────────────────────────────────────────────────────

/// The rat: the default player-controlled body.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct FreeActor;

/// The possessable suit.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Vehicle;

/// Hidden and physically disabled (the rat while inside the suit).
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Inactive;

/// Sensor child of the suit that detects the rat.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct SuitZone;

/// The suit's own movement behaviour; only runs while Occupied.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct VehicleDrive {
    pub enabled: bool,
}

/// Friction values swapped on the suit's collider when it is entered or left.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PhysicalProfile {
    pub parked: f32,
    pub driven: f32,
}

impl PhysicalProfile {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            parked: config.suit_friction_parked,
            driven: config.suit_friction_driven,
        }
    }

    pub fn friction(&self, state: PossessionState) -> Friction {
        let coefficient = match state {
            PossessionState::Empty => self.parked,
            PossessionState::Occupied => self.driven,
        };
        Friction {
            coefficient,
            combine_rule: CoefficientCombineRule::Min,
        }
    }
}

/// Entity the camera is following.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CameraFollow {
    pub target: Option<Entity>,
}

// ── State machine ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PossessionState {
    #[default]
    Empty,
    Occupied,
}

/// What an interact press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered { occupant: Entity },
    Exited { occupant: Option<Entity> },
}

#[derive(Component, Debug, Clone)]
pub struct Possession {
    state: PossessionState,
    lockout_until: f32,
    lockout_duration: f32,
    candidate: Option<Entity>,
    occupant: Option<Entity>,
    prompt_shown: bool,
}

impl Possession {
    pub fn new(lockout_duration: f32) -> Self {
        Self {
            state: PossessionState::Empty,
            lockout_until: f32::NEG_INFINITY,
            lockout_duration: lockout_duration.max(0.0),
            candidate: None,
            occupant: None,
            prompt_shown: false,
        }
    }

    #[inline]
    pub fn state(&self) -> PossessionState {
        self.state
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.state == PossessionState::Occupied
    }

    #[inline]
    pub fn candidate(&self) -> Option<Entity> {
        self.candidate
    }

    #[inline]
    pub fn occupant(&self) -> Option<Entity> {
        self.occupant
    }

    #[inline]
    pub fn lockout_until(&self) -> f32 {
        self.lockout_until
    }

    /// An eligible rat entered the interaction zone.
    pub fn candidate_entered(&mut self, entity: Entity) {
        if self.state == PossessionState::Empty {
            self.candidate = Some(entity);
        }
    }

    /// A body left the interaction zone.
    pub fn candidate_left(&mut self, entity: Entity) {
        if self.state == PossessionState::Empty && self.candidate == Some(entity) {
            self.candidate = None;
        }
    }

    pub fn try_enter(&mut self, now: f32) -> CoreResult<Entity> {
        if self.state == PossessionState::Occupied {
            return Err(CoreError::AlreadyOccupied);
        }
        let Some(candidate) = self.candidate else {
            return Err(CoreError::NoCandidate);
        };
        if now < self.lockout_until {
            return Err(CoreError::ReentryLocked {
                until: self.lockout_until,
            });
        }
        self.candidate = None;
        self.occupant = Some(candidate);
        self.state = PossessionState::Occupied;
        Ok(candidate)
    }

    /// Leave the suit; returns the stored occupant, if any.
    pub fn exit(&mut self, now: f32) -> CoreResult<Option<Entity>> {
        if self.state == PossessionState::Empty {
            return Err(CoreError::NotOccupied);
        }
        self.lockout_until = now + self.lockout_duration;
        self.state = PossessionState::Empty;
        Ok(self.occupant.take())
    }

    /// Exit when Occupied, otherwise try to enter.
    pub fn interact(&mut self, now: f32) -> CoreResult<Transition> {
        match self.state {
            PossessionState::Occupied => self
                .exit(now)
                .map(|occupant| Transition::Exited { occupant }),
            PossessionState::Empty => self
                .try_enter(now)
                .map(|occupant| Transition::Entered { occupant }),
        }
    }

    /// Interaction prompt visibility: Empty with a candidate and no lockout.
    pub fn prompt_visible(&self, now: f32) -> bool {
        self.state == PossessionState::Empty && self.candidate.is_some() && now >= self.lockout_until
    }

    /// Record the prompt state; returns the new value when it changed.
    fn sync_prompt(&mut self, now: f32) -> Option<bool> {
        let visible = self.prompt_visible(now);
        if visible != self.prompt_shown {
            self.prompt_shown = visible;
            Some(visible)
        } else {
            None
        }
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Track the rat entering / leaving each suit's interaction zone.
pub fn suit_zone_system(
    mut collision_events: MessageReader<CollisionEvent>,
    zones: Query<&ChildOf, With<SuitZone>>,
    actors: Query<(), (With<FreeActor>, Without<Inactive>)>,
    mut suits: Query<&mut Possession>,
) {
    for event in collision_events.read() {
        let (e1, e2, started) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2, true),
            CollisionEvent::Stopped(e1, e2, _) => (*e1, *e2, false),
        };

        let (zone, other) = if zones.contains(e1) {
            (e1, e2)
        } else if zones.contains(e2) {
            (e2, e1)
        } else {
            continue;
        };

        let Ok(child_of) = zones.get(zone) else {
            continue;
        };
        let Ok(mut possession) = suits.get_mut(child_of.parent()) else {
            continue;
        };

        if started {
            if actors.contains(other) {
                possession.candidate_entered(other);
            }
        } else {
            possession.candidate_left(other);
        }
    }
}

/// Put the occupant back into the world beside the suit at `suit_at`.
fn eject(
    commands: &mut Commands,
    occupant: Entity,
    (transform, velocity, visibility): (&mut Transform, &mut Velocity, &mut Visibility),
    suit_at: Vec2,
    side: f32,
    config: &GameConfig,
) {
    let offset = Vec2::new(config.eject_offset.0 * side, config.eject_offset.1);
    let eject_point = suit_at + offset;
    transform.translation.x = eject_point.x;
    transform.translation.y = eject_point.y;
    velocity.linvel = Vec2::new(side * config.eject_speed_x, config.eject_speed_y);
    *visibility = Visibility::Inherited;
    commands
        .entity(occupant)
        .try_remove::<(Inactive, RigidBodyDisabled, ColliderDisabled)>();
}

/// Apply interact presses to every suit.
#[allow(clippy::type_complexity)]
pub fn possession_interact_system(
    mut commands: Commands,
    mut interacts: MessageReader<InteractPressed>,
    mut suits: Query<(
        Entity,
        &mut Possession,
        &Transform,
        &Facing,
        &PhysicalProfile,
        &mut Friction,
        &mut VehicleDrive,
    )>,
    mut actors: Query<
        (&mut Transform, &mut Velocity, &mut Visibility),
        (With<FreeActor>, Without<Possession>),
    >,
    mut cues: MessageWriter<PresentationCue>,
    time: Res<Time>,
    config: Res<GameConfig>,
) {
    let presses = interacts.read().count();
    if presses == 0 {
        return;
    }

    let now = time.elapsed_secs();
    let mut rng = rand::thread_rng();

    for (suit, mut possession, suit_tf, facing, profile, mut friction, mut drive) in suits.iter_mut()
    {
        let transition = match possession.interact(now) {
            Ok(t) => t,
            Err(CoreError::NoCandidate) => continue,
            Err(e) => {
                debug!("[possession] {:?}: {}", suit, e);
                continue;
            }
        };

        match transition {
            Transition::Entered { occupant } => {
                if let Ok((_, mut velocity, mut visibility)) = actors.get_mut(occupant) {
                    velocity.linvel = Vec2::ZERO;
                    *visibility = Visibility::Hidden;
                }
                commands
                    .entity(occupant)
                    .try_insert((Inactive, RigidBodyDisabled, ColliderDisabled));

                *friction = profile.friction(PossessionState::Occupied);
                drive.enabled = true;

                cues.write(PresentationCue::sound(SoundCue::EnterSuit, &config, &mut rng));
                cues.write(PresentationCue::CameraRetarget { target: suit });
                info!("[possession] {:?} entered suit {:?}", occupant, suit);
            }
            Transition::Exited { occupant } => {
                cues.write(PresentationCue::sound(SoundCue::ExitSuit, &config, &mut rng));

                *friction = profile.friction(PossessionState::Empty);
                drive.enabled = false;

                let Some(occupant) = occupant else {
                    warn!("[possession] {}", CoreError::OccupantMissing);
                    continue;
                };
                let Ok((mut actor_tf, mut velocity, mut visibility)) = actors.get_mut(occupant)
                else {
                    warn!("[possession] {}", CoreError::OccupantMissing);
                    continue;
                };

                eject(
                    &mut commands,
                    occupant,
                    (&mut *actor_tf, &mut *velocity, &mut *visibility),
                    suit_tf.translation.truncate(),
                    facing.sign(),
                    &config,
                );

                cues.write(PresentationCue::CameraRetarget { target: occupant });
                info!("[possession] {:?} left suit {:?}", occupant, suit);
            }
        }
    }
}

/// Throw the occupant out of a suit that died while Occupied.
#[allow(clippy::type_complexity)]
pub fn wrecked_suit_eject_system(
    mut commands: Commands,
    mut suits: Query<(
        Entity,
        &mut Possession,
        &Health,
        &Transform,
        &Facing,
        &mut VehicleDrive,
    )>,
    mut actors: Query<
        (&mut Transform, &mut Velocity, &mut Visibility),
        (With<FreeActor>, Without<Possession>),
    >,
    mut cues: MessageWriter<PresentationCue>,
    time: Res<Time>,
    config: Res<GameConfig>,
) {
    let now = time.elapsed_secs();
    for (suit, mut possession, health, suit_tf, facing, mut drive) in suits.iter_mut() {
        if !health.is_dead() || !possession.is_occupied() {
            continue;
        }
        drive.enabled = false;
        let Ok(Some(occupant)) = possession.exit(now) else {
            warn!("[possession] {}", CoreError::OccupantMissing);
            continue;
        };
        let Ok((mut actor_tf, mut velocity, mut visibility)) = actors.get_mut(occupant) else {
            warn!("[possession] {}", CoreError::OccupantMissing);
            continue;
        };

        eject(
            &mut commands,
            occupant,
            (&mut *actor_tf, &mut *velocity, &mut *visibility),
            suit_tf.translation.truncate(),
            facing.sign(),
            &config,
        );
        cues.write(PresentationCue::CameraRetarget { target: occupant });
        info!("[possession] suit {:?} wrecked, {:?} thrown clear", suit, occupant);
    }
}

/// Emit a prompt cue whenever a suit's prompt visibility changes.
pub fn possession_prompt_system(
    mut suits: Query<(Entity, &mut Possession)>,
    mut cues: MessageWriter<PresentationCue>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();
    for (suit, mut possession) in suits.iter_mut() {
        if let Some(visible) = possession.sync_prompt(now) {
            cues.write(PresentationCue::Prompt {
                owner: suit,
                visible,
            });
        }
    }
}

/// Keep [`CameraFollow`] in step with camera retarget cues.
pub fn camera_retarget_system(
    mut cues: MessageReader<PresentationCue>,
    mut follow: ResMut<CameraFollow>,
) {
    for cue in cues.read() {
        if let PresentationCue::CameraRetarget { target } = cue {
            follow.target = Some(*target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(world: &mut World) -> Entity {
        world.spawn_empty().id()
    }

    #[test]
    fn enter_requires_candidate() {
        let mut p = Possession::new(0.35);
        assert_eq!(p.try_enter(0.0), Err(CoreError::NoCandidate));
        assert_eq!(p.state(), PossessionState::Empty);
    }

    #[test]
    fn enter_consumes_candidate_and_stores_occupant() {
        let mut world = World::new();
        let rat = entity(&mut world);
        let mut p = Possession::new(0.35);
        p.candidate_entered(rat);
        assert!(p.prompt_visible(0.0));

        assert_eq!(p.try_enter(0.0), Ok(rat));
        assert!(p.is_occupied());
        assert_eq!(p.candidate(), None);
        assert_eq!(p.occupant(), Some(rat));
        assert!(!p.prompt_visible(0.0));
    }

    #[test]
    fn exit_only_from_occupied() {
        let mut p = Possession::new(0.35);
        assert_eq!(p.exit(1.0), Err(CoreError::NotOccupied));
    }

    #[test]
    fn reentry_is_locked_until_deadline() {
        let mut world = World::new();
        let rat = entity(&mut world);
        let mut p = Possession::new(0.35);
        p.candidate_entered(rat);
        p.try_enter(1.0).unwrap();

        assert_eq!(p.exit(2.0), Ok(Some(rat)));
        assert!((p.lockout_until() - 2.35).abs() < 1e-6);

        p.candidate_entered(rat);
        assert!(!p.prompt_visible(2.1));
        assert!(matches!(p.try_enter(2.1), Err(CoreError::ReentryLocked { .. })));
        assert_eq!(p.state(), PossessionState::Empty);
        assert_eq!(p.candidate(), Some(rat));

        assert_eq!(p.try_enter(2.35), Ok(rat));
    }

    #[test]
    fn zone_changes_while_occupied_are_ignored() {
        let mut world = World::new();
        let rat = entity(&mut world);
        let other = entity(&mut world);
        let mut p = Possession::new(0.35);
        p.candidate_entered(rat);
        p.try_enter(0.0).unwrap();

        p.candidate_entered(other);
        p.candidate_left(rat);
        assert_eq!(p.candidate(), None);
        assert_eq!(p.occupant(), Some(rat));
    }

    #[test]
    fn leaving_zone_clears_only_current_candidate() {
        let mut world = World::new();
        let rat = entity(&mut world);
        let other = entity(&mut world);
        let mut p = Possession::new(0.35);
        p.candidate_entered(rat);
        p.candidate_left(other);
        assert_eq!(p.candidate(), Some(rat));
        p.candidate_left(rat);
        assert_eq!(p.candidate(), None);
    }

    #[test]
    fn interact_alternates_enter_and_exit() {
        let mut world = World::new();
        let rat = entity(&mut world);
        let mut p = Possession::new(0.0);
        p.candidate_entered(rat);
        assert_eq!(p.interact(0.0), Ok(Transition::Entered { occupant: rat }));
        assert_eq!(
            p.interact(0.5),
            Ok(Transition::Exited {
                occupant: Some(rat)
            })
        );
        assert_eq!(p.interact(0.6), Err(CoreError::NoCandidate));
    }

    #[test]
    fn profile_swaps_friction() {
        let profile = PhysicalProfile {
            parked: 0.6,
            driven: 0.0,
        };
        assert_eq!(profile.friction(PossessionState::Empty).coefficient, 0.6);
        assert_eq!(profile.friction(PossessionState::Occupied).coefficient, 0.0);
    }
}
