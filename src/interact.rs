//! Control panels and the sliding doors they open.

use crate::config::GameConfig;
use crate::control::InteractPressed;
use crate::effects::{PresentationCue, SoundCue};
use crate::physics_query::root_of;
use crate::possession::{FreeActor, Inactive};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Cubic ease-in-out on `[0, 1]`.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// A door travelling between two positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorMotion {
    pub from: Vec2,
    pub to: Vec2,
    pub start: f32,
    pub duration: f32,
}

impl DoorMotion {
    /// Position at `now`, and whether the motion has finished.
    pub fn sample(&self, now: f32) -> (Vec2, bool) {
        if self.duration <= 0.0 || now >= self.start + self.duration {
            return (self.to, true);
        }
        let t = ((now - self.start) / self.duration).max(0.0);
        (self.from.lerp(self.to, smoothstep(t)), false)
    }
}

#[derive(Component, Debug, Clone)]
pub struct SlidingDoor {
    pub closed_at: Vec2,
    /// Added to `closed_at` when open.
    pub open_offset: Vec2,
    pub open_time: f32,
    is_open: bool,
    motion: Option<DoorMotion>,
}

impl SlidingDoor {
    pub fn new(closed_at: Vec2, config: &GameConfig) -> Self {
        Self {
            closed_at,
            open_offset: Vec2::new(0.0, config.door_open_height),
            open_time: config.door_open_time,
            is_open: false,
            motion: None,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    fn start(&mut self, now: f32, from: Vec2, to: Vec2) {
        self.motion = Some(DoorMotion {
            from,
            to,
            start: now,
            duration: self.open_time,
        });
    }

    /// Returns false if already open or moving.
    pub fn open(&mut self, now: f32) -> bool {
        if self.is_open || self.is_moving() {
            return false;
        }
        self.start(now, self.closed_at, self.closed_at + self.open_offset);
        true
    }

    /// Returns false if already closed or moving.
    pub fn close(&mut self, now: f32) -> bool {
        if !self.is_open || self.is_moving() {
            return false;
        }
        self.start(now, self.closed_at + self.open_offset, self.closed_at);
        true
    }

    /// Advance the motion; returns the position to apply, if moving.
    pub fn step(&mut self, now: f32) -> Option<Vec2> {
        let motion = self.motion?;
        let (pos, done) = motion.sample(now);
        if done {
            self.motion = None;
            self.is_open = motion.to != self.closed_at;
        }
        Some(pos)
    }
}

#[derive(Component, Debug, Clone)]
pub struct ControlPanel {
    pub door: Option<Entity>,
    pub one_use: bool,
    used: bool,
    actor_in_range: bool,
}

impl ControlPanel {
    pub fn new(door: Option<Entity>, one_use: bool) -> Self {
        Self {
            door,
            one_use,
            used: false,
            actor_in_range: false,
        }
    }

    #[inline]
    pub fn is_used(&self) -> bool {
        self.used
    }

    #[inline]
    pub fn actor_in_range(&self) -> bool {
        self.actor_in_range
    }

    pub fn prompt_visible(&self) -> bool {
        self.actor_in_range && !(self.one_use && self.used)
    }

    /// Accept an interact press.  Returns the door to open, if any.
    pub fn press(&mut self) -> Option<Option<Entity>> {
        if !self.actor_in_range || (self.one_use && self.used) {
            return None;
        }
        self.used = true;
        Some(self.door)
    }
}

/// Track the rat entering / leaving panel trigger zones.
pub fn panel_zone_system(
    mut collision_events: MessageReader<CollisionEvent>,
    mut panels: Query<(Entity, &mut ControlPanel)>,
    actors: Query<(), With<FreeActor>>,
    parents: Query<&ChildOf>,
    mut cues: MessageWriter<PresentationCue>,
) {
    for event in collision_events.read() {
        let (e1, e2, started) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2, true),
            CollisionEvent::Stopped(e1, e2, _) => (*e1, *e2, false),
        };
        let (panel, other) = if panels.contains(e1) {
            (e1, e2)
        } else if panels.contains(e2) {
            (e2, e1)
        } else {
            continue;
        };
        if !actors.contains(root_of(other, &parents)) {
            continue;
        }
        let Ok((_, mut control)) = panels.get_mut(panel) else {
            continue;
        };

        let before = control.prompt_visible();
        control.actor_in_range = started;
        let after = control.prompt_visible();
        if before != after {
            cues.write(PresentationCue::Prompt {
                owner: panel,
                visible: after,
            });
        }
    }
}

pub fn panel_interact_system(
    mut interacts: MessageReader<InteractPressed>,
    mut panels: Query<(Entity, &mut ControlPanel)>,
    mut doors: Query<&mut SlidingDoor>,
    active_actors: Query<(), (With<FreeActor>, Without<Inactive>)>,
    mut cues: MessageWriter<PresentationCue>,
    time: Res<Time>,
    config: Res<GameConfig>,
) {
    if interacts.read().count() == 0 || active_actors.is_empty() {
        return;
    }
    let now = time.elapsed_secs();
    let mut rng = rand::thread_rng();

    for (panel, mut control) in panels.iter_mut() {
        let Some(door) = control.press() else {
            continue;
        };
        cues.write(PresentationCue::sound(SoundCue::PanelInteract, &config, &mut rng));
        cues.write(PresentationCue::Prompt {
            owner: panel,
            visible: control.prompt_visible(),
        });
        if let Some(mut sliding) = door.and_then(|d| doors.get_mut(d).ok()) {
            if sliding.open(now) {
                info!("[interact] panel {:?} opened door", panel);
            }
        }
    }
}

pub fn door_motion_system(mut doors: Query<(&mut SlidingDoor, &mut Transform)>, time: Res<Time>) {
    let now = time.elapsed_secs();
    for (mut door, mut transform) in doors.iter_mut() {
        if let Some(pos) = door.step(now) {
            transform.translation.x = pos.x;
            transform.translation.y = pos.y;
        }
    }
}
