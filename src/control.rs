//! Player input and movement for the rat and the driven suit.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`intent_clear_system`]: resets [`ActorIntent`].
//! 2. [`keyboard_to_intent_system`]: A/D or arrows, Space, E, J/left-ctrl.
//! 3. [`gamepad_to_intent_system`]: left stick, South, West, right trigger.
//! 4. [`ground_probe_system`]: refreshes [`Grounded`] from a small overlap circle at the feet.
//! 5. [`wall_probe_system`]: short side rays feed the rat's [`WallJump`].
//! 6. [`actor_motion_system`] / [`vehicle_drive_system`]: turn the intent into `Velocity`.
//!
//! ## Rat wall moves
//!
//! Airborne against a wall the rat slides (fall speed capped), and a jump
//! pushes it off and away from that wall.  Horizontal input is ignored for a
//! moment after the push, and the same wall cannot be grabbed again right
//! away, so a single wall cannot be climbed.  The suit has no wall moves but
//! its jump is cut short when the button is released while rising.
//!
//! The **input abstraction layer** (`ActorIntent`) keeps movement testable:
//! tests populate the resource directly and run only the motion systems.
//! Interact is edge-triggered and published as an [`InteractPressed`]
//! message, consumed by the suit and by control panels.

use crate::ai::senses::wall_ahead;
use crate::config::GameConfig;
use crate::constants::WALL_PROBE_REACH;
use crate::effects::{PresentationCue, SoundCue};
use crate::physics_query::{layers, PhysicsQuery, RapierQuery};
use crate::possession::{FreeActor, Inactive, VehicleDrive};
use bevy::input::gamepad::{GamepadAxis, GamepadButton, GamepadConnection, GamepadConnectionEvent};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── State ─────────────────────────────────────────────────────────────────────

/// Per-frame control intent, filled by the input systems.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ActorIntent {
    /// Horizontal axis in `[-1, 1]`.
    pub move_x: f32,
    /// Jump went down this frame.
    pub jump: bool,
    /// Jump came up this frame.
    pub jump_released: bool,
    /// Fire went down this frame.
    pub fire: bool,
    /// Interact went down this frame.
    pub interact: bool,
}

/// Interact was pressed this frame.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractPressed;

/// Most recently connected gamepad.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct PreferredGamepad(pub Option<Entity>);

/// Horizontal facing: `1.0` right, `-1.0` left.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Facing(pub f32);

impl Default for Facing {
    fn default() -> Self {
        Facing(1.0)
    }
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        if self.0 < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    /// Face along `dx`; zero keeps the current facing.
    pub fn look_along(&mut self, dx: f32) {
        if dx > 0.0 {
            self.0 = 1.0;
        } else if dx < 0.0 {
            self.0 = -1.0;
        }
    }

    pub fn flip(&mut self) {
        self.0 = -self.sign();
    }
}

/// Feet overlap probe, relative to the body origin.
#[derive(Component, Debug, Clone, Copy)]
pub struct GroundProbe {
    pub offset: Vec2,
    pub radius: f32,
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grounded(pub bool);

/// Horizontal speed and jump impulse of a controllable body.
#[derive(Component, Debug, Clone, Copy)]
pub struct MoveStats {
    pub speed: f32,
    pub jump_speed: f32,
    /// Share of the rising speed kept when jump is released early.
    pub jump_cut: f32,
}

/// Variable-height jump: releasing while rising scales the vertical speed.
pub fn cut_jump(velocity_y: f32, multiplier: f32) -> f32 {
    if velocity_y > 0.0 {
        velocity_y * multiplier
    } else {
        velocity_y
    }
}

/// Side rays for wall contact, mirrored left and right of the body origin.
#[derive(Component, Debug, Clone, Copy)]
pub struct WallProbe {
    /// Ray start for the right side; `x` is mirrored for the left.
    pub offset: Vec2,
    pub reach: f32,
}

impl WallProbe {
    pub fn beside(half_extents: Vec2) -> Self {
        Self {
            offset: Vec2::new(half_extents.x, 0.0),
            reach: WALL_PROBE_REACH,
        }
    }
}

/// Wall slide and wall jump state.
///
/// Sides are `-1.0` (wall on the left), `1.0` (right) or `0.0` (none).
#[derive(Component, Debug, Clone)]
pub struct WallJump {
    pub slide_speed: f32,
    /// Push-off velocity; `x` is applied away from the wall.
    pub force: Vec2,
    pub lock_time: f32,
    pub coyote_time: f32,
    pub regrab_block: f32,
    touching: bool,
    wall_side: f32,
    coyote_until: f32,
    locked_until: f32,
    blocked_side: f32,
    blocked_until: f32,
}

impl WallJump {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            slide_speed: config.wall_slide_speed,
            force: Vec2::from(config.wall_jump_force),
            lock_time: config.wall_jump_lock_time,
            coyote_time: config.wall_coyote_time,
            regrab_block: config.wall_regrab_block_time,
            touching: false,
            wall_side: 0.0,
            coyote_until: f32::NEG_INFINITY,
            locked_until: f32::NEG_INFINITY,
            blocked_side: 0.0,
            blocked_until: f32::NEG_INFINITY,
        }
    }

    #[inline]
    pub fn is_touching(&self) -> bool {
        self.touching
    }

    #[inline]
    pub fn wall_side(&self) -> f32 {
        self.wall_side
    }

    /// Feed this frame's probe results.  Airborne contact with a wall that
    /// is not blocked refreshes the wall coyote window.
    pub fn sense(&mut self, now: f32, grounded: bool, left: bool, right: bool) {
        let blocking = now < self.blocked_until;
        let left = left && !(blocking && self.blocked_side < 0.0);
        let right = right && !(blocking && self.blocked_side > 0.0);

        self.touching = !grounded && (left || right);
        if self.touching {
            self.wall_side = if right { 1.0 } else { -1.0 };
            self.coyote_until = now + self.coyote_time;
        }
    }

    /// Cap the fall speed while sliding down a wall.
    pub fn slide(&self, velocity: &mut Vec2) {
        if self.touching && velocity.y < 0.0 {
            velocity.y = velocity.y.max(-self.slide_speed);
        }
    }

    /// Push off the last wall if still inside the wall coyote window.
    /// Returns the new velocity.
    pub fn try_jump(&mut self, now: f32) -> Option<Vec2> {
        if now >= self.coyote_until || self.wall_side == 0.0 {
            return None;
        }
        let away = -self.wall_side;
        self.locked_until = now + self.lock_time;
        self.coyote_until = f32::NEG_INFINITY;
        self.blocked_side = self.wall_side;
        self.blocked_until = now + self.regrab_block;
        self.touching = false;
        Some(Vec2::new(away * self.force.x, self.force.y))
    }

    /// Horizontal input is ignored right after a push-off.
    #[inline]
    pub fn input_locked(&self, now: f32) -> bool {
        now < self.locked_until
    }
}

/// Coyote time and jump buffering.
///
/// A jump is granted when it was requested within `jump_buffer` seconds and
/// the body was grounded within `coyote_time` seconds.  Both stamps are
/// consumed by the jump so one press never produces two jumps.
#[derive(Component, Debug, Clone, Copy)]
pub struct JumpAssist {
    last_grounded_at: f32,
    requested_at: f32,
}

impl Default for JumpAssist {
    fn default() -> Self {
        Self {
            last_grounded_at: f32::NEG_INFINITY,
            requested_at: f32::NEG_INFINITY,
        }
    }
}

impl JumpAssist {
    pub fn note_grounded(&mut self, now: f32) {
        self.last_grounded_at = now;
    }

    pub fn request(&mut self, now: f32) {
        self.requested_at = now;
    }

    /// Drop a pending request (another jump used the press).
    pub fn cancel_request(&mut self) {
        self.requested_at = f32::NEG_INFINITY;
    }

    pub fn try_consume(&mut self, now: f32, coyote_time: f32, jump_buffer: f32) -> bool {
        let coyote_open = now - self.last_grounded_at <= coyote_time;
        let buffered = now - self.requested_at <= jump_buffer;
        if coyote_open && buffered {
            self.last_grounded_at = f32::NEG_INFINITY;
            self.requested_at = f32::NEG_INFINITY;
            true
        } else {
            false
        }
    }
}

// ── Step 1: Clear ─────────────────────────────────────────────────────────────

pub fn intent_clear_system(mut intent: ResMut<ActorIntent>) {
    *intent = ActorIntent::default();
}

// ── Step 2a: Keyboard → Intent ────────────────────────────────────────────────

/// Translate keys into [`ActorIntent`].
///
/// - **A / ←**, **D / →** → `move_x`
/// - **Space / W / ↑** → `jump`
/// - **E** → `interact` (+ [`InteractPressed`])
/// - **J / Left Ctrl** → `fire` (one shot per press)
///
/// Does nothing when the input plugin is absent (headless tests).
pub fn keyboard_to_intent_system(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut intent: ResMut<ActorIntent>,
    mut interact: MessageWriter<InteractPressed>,
) {
    let Some(keys) = keys else {
        return;
    };

    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        intent.move_x -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        intent.move_x += 1.0;
    }
    let jump_keys = [KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp];
    if keys.any_just_pressed(jump_keys) {
        intent.jump = true;
    }
    if keys.any_just_released(jump_keys) {
        intent.jump_released = true;
    }
    if keys.any_just_pressed([KeyCode::KeyJ, KeyCode::ControlLeft]) {
        intent.fire = true;
    }
    if keys.just_pressed(KeyCode::KeyE) {
        intent.interact = true;
        interact.write(InteractPressed);
    }
}

// ── Step 2b: Gamepad ──────────────────────────────────────────────────────────

/// Track gamepad connect / disconnect events and update [`PreferredGamepad`].
pub fn gamepad_connection_system(
    mut events: MessageReader<GamepadConnectionEvent>,
    mut preferred: ResMut<PreferredGamepad>,
) {
    for event in events.read() {
        match &event.connection {
            GamepadConnection::Connected { .. } => {
                preferred.0 = Some(event.gamepad);
                info!("[gamepad] Gamepad {:?} connected (now preferred)", event.gamepad);
            }
            GamepadConnection::Disconnected => {
                info!("[gamepad] Gamepad {:?} disconnected", event.gamepad);
                if preferred.0 == Some(event.gamepad) {
                    preferred.0 = None;
                }
            }
        }
    }
}

/// Left stick → `move_x`, South → jump, West → interact, right trigger → fire.
pub fn gamepad_to_intent_system(
    preferred: Res<PreferredGamepad>,
    gamepads: Query<&Gamepad>,
    mut intent: ResMut<ActorIntent>,
    mut interact: MessageWriter<InteractPressed>,
) {
    let Some(gamepad_entity) = preferred.0 else {
        return;
    };
    let Ok(gamepad) = gamepads.get(gamepad_entity) else {
        return;
    };

    let lx = gamepad.get(GamepadAxis::LeftStickX).unwrap_or(0.0);
    if lx.abs() > 0.2 {
        intent.move_x = lx.clamp(-1.0, 1.0);
    }
    if gamepad.just_pressed(GamepadButton::South) {
        intent.jump = true;
    }
    if gamepad.just_released(GamepadButton::South) {
        intent.jump_released = true;
    }
    if gamepad.just_pressed(GamepadButton::RightTrigger2) {
        intent.fire = true;
    }
    if gamepad.just_pressed(GamepadButton::West) && !intent.interact {
        intent.interact = true;
        interact.write(InteractPressed);
    }
}

// ── Step 3: Ground probe ──────────────────────────────────────────────────────

pub fn ground_probe_system(
    mut q: Query<(&Transform, &GroundProbe, &mut Grounded, Option<&mut JumpAssist>), Without<Inactive>>,
    rapier_context: ReadRapierContext,
    time: Res<Time>,
) {
    let Ok(rapier) = rapier_context.single() else {
        return;
    };
    let physics = RapierQuery::new(&rapier);
    let now = time.elapsed_secs();

    for (transform, probe, mut grounded, assist) in q.iter_mut() {
        let feet = transform.translation.truncate() + probe.offset;
        grounded.0 = physics
            .overlap_circle(feet, probe.radius, layers::SOLID)
            .is_some();
        if grounded.0 {
            if let Some(mut assist) = assist {
                assist.note_grounded(now);
            }
        }
    }
}

/// Cast the side rays against the wall layer and update [`WallJump`].
pub fn wall_probe_system(
    mut q: Query<(&Transform, &WallProbe, &Grounded, &mut WallJump), Without<Inactive>>,
    rapier_context: ReadRapierContext,
    time: Res<Time>,
) {
    let Ok(rapier) = rapier_context.single() else {
        return;
    };
    let physics = RapierQuery::new(&rapier);
    let now = time.elapsed_secs();

    for (transform, probe, grounded, mut wall) in q.iter_mut() {
        let origin = transform.translation.truncate();
        let left = wall_ahead(&physics, origin, probe.offset, -1.0, probe.reach, layers::WALL);
        let right = wall_ahead(&physics, origin, probe.offset, 1.0, probe.reach, layers::WALL);
        wall.sense(now, grounded.0, left, right);
    }
}

// ── Step 4: Intent → Velocity ─────────────────────────────────────────────────

/// Shared move, assisted jump, wall moves and jump cut for any controllable
/// body.  Returns true when a jump started this frame.
#[allow(clippy::too_many_arguments)]
fn drive_body(
    intent: &ActorIntent,
    velocity: &mut Velocity,
    facing: &mut Facing,
    assist: &mut JumpAssist,
    mut wall: Option<&mut WallJump>,
    stats: &MoveStats,
    now: f32,
    config: &GameConfig,
) -> bool {
    let locked = wall.as_deref().is_some_and(|w| w.input_locked(now));
    if !locked {
        velocity.linvel.x = intent.move_x * stats.speed;
        facing.look_along(intent.move_x);
    }

    if intent.jump {
        assist.request(now);
    }
    let mut jumped = false;
    if assist.try_consume(now, config.coyote_time, config.jump_buffer) {
        velocity.linvel.y = stats.jump_speed;
        jumped = true;
    } else if intent.jump {
        if let Some(push) = wall.as_deref_mut().and_then(|w| w.try_jump(now)) {
            assist.cancel_request();
            velocity.linvel = push;
            facing.look_along(push.x);
            jumped = true;
        }
    }

    if intent.jump_released {
        velocity.linvel.y = cut_jump(velocity.linvel.y, stats.jump_cut);
    }
    if let Some(wall) = wall {
        wall.slide(&mut velocity.linvel);
    }
    jumped
}

/// Drive the rat while it is not inside the suit.
#[allow(clippy::type_complexity)]
pub fn actor_motion_system(
    intent: Res<ActorIntent>,
    mut q: Query<
        (
            &mut Velocity,
            &mut Facing,
            &mut JumpAssist,
            Option<&mut WallJump>,
            &MoveStats,
        ),
        (With<FreeActor>, Without<Inactive>),
    >,
    mut cues: MessageWriter<PresentationCue>,
    time: Res<Time>,
    config: Res<GameConfig>,
) {
    let now = time.elapsed_secs();
    let mut rng = rand::thread_rng();
    for (mut velocity, mut facing, mut assist, mut wall, stats) in q.iter_mut() {
        let wall = wall.as_deref_mut();
        if drive_body(&intent, &mut velocity, &mut facing, &mut assist, wall, stats, now, &config) {
            cues.write(PresentationCue::sound(SoundCue::Jump, &config, &mut rng));
        }
    }
}

/// Drive the suit while its [`VehicleDrive`] is enabled.
pub fn vehicle_drive_system(
    intent: Res<ActorIntent>,
    mut q: Query<(&VehicleDrive, &mut Velocity, &mut Facing, &mut JumpAssist, &MoveStats)>,
    time: Res<Time>,
    config: Res<GameConfig>,
) {
    let now = time.elapsed_secs();
    for (drive, mut velocity, mut facing, mut assist, stats) in q.iter_mut() {
        if !drive.enabled {
            continue;
        }
        drive_body(&intent, &mut velocity, &mut facing, &mut assist, None, stats, now, &config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    #[test]
    fn coyote_window_allows_late_jump() {
        let mut assist = JumpAssist::default();
        assist.note_grounded(1.0);
        assist.request(1.1);
        assert!(assist.try_consume(1.1, 0.12, 0.12));
    }

    #[test]
    fn jump_after_coyote_window_is_refused() {
        let mut assist = JumpAssist::default();
        assist.note_grounded(1.0);
        assist.request(1.2);
        assert!(!assist.try_consume(1.2, 0.12, 0.12));
    }

    #[test]
    fn buffered_press_fires_on_landing() {
        let mut assist = JumpAssist::default();
        assist.request(2.0);
        assert!(!assist.try_consume(2.0, 0.12, 0.12));
        assist.note_grounded(2.08);
        assert!(assist.try_consume(2.08, 0.12, 0.12));
        // Consumed: the same press does not jump again.
        assert!(!assist.try_consume(2.09, 0.12, 0.12));
    }

    #[test]
    fn facing_keeps_sign_on_zero_input() {
        let mut facing = Facing(-1.0);
        facing.look_along(0.0);
        assert_eq!(facing.sign(), -1.0);
        facing.look_along(0.5);
        assert_eq!(facing.sign(), 1.0);
        facing.flip();
        assert_eq!(facing.sign(), -1.0);
    }

    #[test]
    fn inactive_actor_ignores_intent() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
        app.insert_resource(GameConfig::default());
        app.add_message::<PresentationCue>();
        app.insert_resource(ActorIntent {
            move_x: 1.0,
            ..Default::default()
        });
        app.add_systems(Update, actor_motion_system);

        let stats = MoveStats {
            speed: 4.0,
            jump_speed: 6.0,
            jump_cut: 1.0,
        };
        let active = app
            .world_mut()
            .spawn((FreeActor, Velocity::zero(), Facing(-1.0), JumpAssist::default(), stats))
            .id();
        let hidden = app
            .world_mut()
            .spawn((FreeActor, Inactive, Velocity::zero(), Facing(-1.0), JumpAssist::default(), stats))
            .id();

        app.update();

        assert_eq!(app.world().get::<Velocity>(active).unwrap().linvel.x, 4.0);
        assert_eq!(app.world().get::<Facing>(active).unwrap().sign(), 1.0);
        assert_eq!(app.world().get::<Velocity>(hidden).unwrap().linvel.x, 0.0);
    }

    fn wall() -> WallJump {
        WallJump::from_config(&GameConfig::default())
    }

    #[test]
    fn wall_slide_caps_fall_speed() {
        let mut w = wall();
        w.sense(0.0, false, true, false);
        assert!(w.is_touching());

        let mut falling = Vec2::new(1.0, -5.0);
        w.slide(&mut falling);
        assert_eq!(falling.y, -w.slide_speed);

        let mut rising = Vec2::new(0.0, 3.0);
        w.slide(&mut rising);
        assert_eq!(rising.y, 3.0);

        // Grounded against a wall is not a slide.
        w.sense(0.1, true, true, false);
        let mut standing = Vec2::new(0.0, -5.0);
        w.slide(&mut standing);
        assert_eq!(standing.y, -5.0);
    }

    #[test]
    fn wall_jump_pushes_away_and_locks_input() {
        let mut w = wall();
        w.sense(1.0, false, false, true);
        assert_eq!(w.wall_side(), 1.0);

        let push = w.try_jump(1.0).unwrap();
        assert_eq!(push, Vec2::new(-w.force.x, w.force.y));
        assert!(w.input_locked(1.0 + w.lock_time * 0.5));
        assert!(!w.input_locked(1.0 + w.lock_time));
        // One push per contact.
        assert_eq!(w.try_jump(1.01), None);
    }

    #[test]
    fn same_wall_cannot_be_regrabbed_right_away() {
        let mut w = wall();
        w.sense(0.0, false, true, false);
        assert!(w.try_jump(0.0).is_some());

        w.sense(0.05, false, true, false);
        assert!(!w.is_touching());
        assert_eq!(w.try_jump(0.05), None);

        // The opposite wall is fine.
        w.sense(0.1, false, false, true);
        assert!(w.is_touching());

        let mut w = wall();
        w.sense(0.0, false, true, false);
        w.try_jump(0.0);
        let later = w.regrab_block + 0.01;
        w.sense(later, false, true, false);
        assert!(w.is_touching());
        assert!(w.try_jump(later).is_some());
    }

    #[test]
    fn wall_coyote_window_after_leaving_wall() {
        let mut w = wall();
        w.sense(0.0, false, false, true);
        w.sense(0.05, false, false, false);
        assert!(!w.is_touching());
        assert!(w.try_jump(0.05).is_some());

        let mut w = wall();
        w.sense(0.0, false, false, true);
        w.sense(0.5, false, false, false);
        assert_eq!(w.try_jump(0.5), None);
    }

    #[test]
    fn released_jump_is_cut_only_while_rising() {
        assert_eq!(cut_jump(8.0, 0.5), 4.0);
        assert_eq!(cut_jump(-3.0, 0.5), -3.0);
        assert_eq!(cut_jump(8.0, 1.0), 8.0);
    }

    #[test]
    fn airborne_jump_against_wall_pushes_off() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
        app.insert_resource(GameConfig::default());
        app.add_message::<PresentationCue>();
        app.insert_resource(ActorIntent {
            move_x: 1.0,
            jump: true,
            ..Default::default()
        });
        app.add_systems(Update, actor_motion_system);

        let config = GameConfig::default();
        let mut wall = WallJump::from_config(&config);
        wall.sense(0.0, false, false, true);
        let stats = MoveStats {
            speed: 4.0,
            jump_speed: 6.0,
            jump_cut: 1.0,
        };
        let rat = app
            .world_mut()
            .spawn((FreeActor, Velocity::zero(), Facing(1.0), JumpAssist::default(), wall, stats))
            .id();

        app.update();

        let (fx, fy) = config.wall_jump_force;
        assert_eq!(app.world().get::<Velocity>(rat).unwrap().linvel, Vec2::new(-fx, fy));
        assert_eq!(app.world().get::<Facing>(rat).unwrap().sign(), -1.0);
        assert!(app
            .world()
            .get::<WallJump>(rat)
            .unwrap()
            .input_locked(0.0));
    }

    #[test]
    fn suit_jump_is_cut_on_release() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.insert_resource(ActorIntent {
            jump_released: true,
            ..Default::default()
        });
        app.add_systems(Update, vehicle_drive_system);

        let suit = app
            .world_mut()
            .spawn((
                VehicleDrive { enabled: true },
                Velocity::linear(Vec2::new(0.0, 6.0)),
                Facing(1.0),
                JumpAssist::default(),
                MoveStats {
                    speed: 3.0,
                    jump_speed: 7.5,
                    jump_cut: 0.5,
                },
            ))
            .id();

        app.update();
        assert_eq!(app.world().get::<Velocity>(suit).unwrap().linvel.y, 3.0);
    }

    #[test]
    fn holding_fire_gives_one_shot_intent() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<ActorIntent>();
        app.init_resource::<ButtonInput<KeyCode>>();
        app.add_message::<InteractPressed>();
        app.add_systems(Update, (intent_clear_system, keyboard_to_intent_system).chain());

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyJ);
        app.update();
        assert!(app.world().resource::<ActorIntent>().fire);

        // Still held, no new press.
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
        app.update();
        assert!(!app.world().resource::<ActorIntent>().fire);
    }
}
