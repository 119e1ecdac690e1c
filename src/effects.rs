//! Presentation cues and delayed removal.
//!
//! The core never plays audio or spawns particle prefabs itself.  It writes
//! [`PresentationCue`] messages (flash start, death effect, impact, sound,
//! camera retarget, prompt visibility) that the presentation layer consumes,
//! and schedules entity removal through [`DespawnAfter`] so death effects get
//! a few frames to render.
//!
//! Sound cues carry a pitch and volume already rolled from the configured
//! ranges, so every consumer plays them identically.

use crate::config::GameConfig;
use bevy::prelude::*;
use rand::Rng;

/// Identifier of a one-shot visual effect (the presentation layer maps it to a prefab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectId {
    ActorDeath,
    EnemyDeath,
    SpitterDeath,
    BulletSpark,
    AcidSplash,
}

/// Identifier of a sound clip set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Hit,
    Death,
    EnterSuit,
    ExitSuit,
    Jump,
    Spit,
    SuitShot,
    PanelInteract,
}

/// Everything the core asks the presentation layer to show or play.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum PresentationCue {
    /// A hit flash started on `entity`.
    FlashStart {
        entity: Entity,
        color: Color,
        count: u32,
        interval: f32,
    },
    DeathEffect {
        position: Vec2,
        effect: EffectId,
    },
    Impact {
        position: Vec2,
        effect: EffectId,
    },
    Sound {
        cue: SoundCue,
        pitch: f32,
        volume: f32,
    },
    /// The camera should follow `target` from now on.
    CameraRetarget {
        target: Entity,
    },
    /// Show or hide the interaction prompt owned by `owner`.
    Prompt {
        owner: Entity,
        visible: bool,
    },
}

impl PresentationCue {
    /// Build a sound cue with pitch and volume rolled from the configured ranges.
    pub fn sound(cue: SoundCue, config: &GameConfig, rng: &mut impl Rng) -> Self {
        PresentationCue::Sound {
            cue,
            pitch: roll(rng, config.cue_pitch_range),
            volume: roll(rng, config.cue_volume_range),
        }
    }
}

/// Uniform sample in `[min, max]`; a degenerate range returns `min`.
pub fn roll(rng: &mut impl Rng, (min, max): (f32, f32)) -> f32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

/// Despawn the entity once the simulation clock reaches `at`.
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnAfter {
    pub at: f32,
}

pub fn despawn_after_system(
    mut commands: Commands,
    q: Query<(Entity, &DespawnAfter)>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs();
    for (entity, despawn) in q.iter() {
        if now >= despawn.at {
            commands.entity(entity).try_despawn();
        }
    }
}

/// Trace every cue at debug level; handy when running without the presentation layer.
pub fn log_cues_system(mut cues: MessageReader<PresentationCue>) {
    for cue in cues.read() {
        debug!("[cue] {:?}", cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    #[test]
    fn sound_cue_rolls_within_configured_ranges() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let PresentationCue::Sound { pitch, volume, .. } =
                PresentationCue::sound(SoundCue::Jump, &config, &mut rng)
            else {
                panic!("expected a sound cue");
            };
            assert!(pitch >= config.cue_pitch_range.0 && pitch <= config.cue_pitch_range.1);
            assert!(volume >= config.cue_volume_range.0 && volume <= config.cue_volume_range.1);
        }
    }

    #[test]
    fn degenerate_range_returns_min() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(roll(&mut rng, (1.0, 1.0)), 1.0);
        assert_eq!(roll(&mut rng, (2.0, 1.0)), 2.0);
    }

    #[test]
    fn despawn_after_waits_for_deadline() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
        app.add_systems(Update, despawn_after_system);

        let entity = app.world_mut().spawn(DespawnAfter { at: 0.25 }).id();

        app.update(); // t = 0.0 (first frame has no delta)
        app.update(); // t = 0.1
        assert!(app.world().get_entity(entity).is_ok());

        for _ in 0..3 {
            app.update();
        }
        assert!(app.world().get_entity(entity).is_err());
    }
}
