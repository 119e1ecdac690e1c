//! The suit's gun and its overheat meter.

use crate::config::GameConfig;
use crate::control::{ActorIntent, Facing};
use crate::effects::{PresentationCue, SoundCue};
use crate::physics_query::{layers, CollisionIgnores};
use crate::possession::{Possession, Vehicle};
use crate::projectile::{spawn_fast_projectile, FastProjectile};
use bevy::prelude::*;

/// Heat built up by firing.  Once the meter tops out the gun locks until it
/// cools down to `unlock_threshold`.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Overheat {
    pub max_heat: f32,
    pub heat_per_shot: f32,
    pub cool_per_second: f32,
    pub unlock_threshold: f32,
    heat: f32,
    overheated: bool,
}

impl Overheat {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            max_heat: config.overheat_max.max(1.0),
            heat_per_shot: config.overheat_per_shot,
            cool_per_second: config.overheat_cool_per_sec,
            unlock_threshold: config.overheat_unlock,
            heat: 0.0,
            overheated: false,
        }
    }

    #[inline]
    pub fn heat(&self) -> f32 {
        self.heat
    }

    #[inline]
    pub fn is_overheated(&self) -> bool {
        self.overheated
    }

    #[inline]
    pub fn can_shoot(&self) -> bool {
        !self.overheated
    }

    /// Heat as a fraction of the maximum.
    pub fn heat01(&self) -> f32 {
        (self.heat / self.max_heat).clamp(0.0, 1.0)
    }

    pub fn add_heat(&mut self) {
        if self.overheated {
            return;
        }
        self.heat = (self.heat + self.heat_per_shot).min(self.max_heat);
        if self.heat >= self.max_heat {
            self.overheated = true;
            debug!("[weapon] overheated");
        }
    }

    pub fn cool(&mut self, dt: f32) {
        self.heat = (self.heat - self.cool_per_second * dt).max(0.0);
        if self.overheated && self.heat <= self.unlock_threshold {
            self.overheated = false;
        }
    }

    pub fn reset(&mut self) {
        self.heat = 0.0;
        self.overheated = false;
    }
}

#[derive(Component, Debug, Clone)]
pub struct SuitWeapon {
    pub bullet_speed: f32,
    pub fire_cooldown: f32,
    /// Muzzle relative to the suit origin; x is mirrored by facing.
    pub muzzle_offset: Vec2,
    pub damage: u32,
    next_fire_at: f32,
}

impl SuitWeapon {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            bullet_speed: config.suit_bullet_speed,
            fire_cooldown: config.suit_fire_cooldown,
            muzzle_offset: Vec2::from(config.suit_muzzle_offset),
            damage: config.fast_bullet_damage,
            next_fire_at: f32::NEG_INFINITY,
        }
    }

    /// Consume the trigger if the gun is ready.
    pub fn try_fire(&mut self, now: f32, overheat: Option<&mut Overheat>) -> bool {
        if now < self.next_fire_at {
            return false;
        }
        if let Some(overheat) = overheat {
            if !overheat.can_shoot() {
                return false;
            }
            overheat.add_heat();
        }
        self.next_fire_at = now + self.fire_cooldown;
        true
    }

    pub fn muzzle(&self, origin: Vec2, facing: f32) -> Vec2 {
        origin + Vec2::new(self.muzzle_offset.x * facing, self.muzzle_offset.y)
    }
}

pub fn overheat_cool_system(mut q: Query<&mut Overheat>, time: Res<Time>) {
    let dt = time.delta_secs();
    for mut overheat in q.iter_mut() {
        overheat.cool(dt);
    }
}

/// Fire the suit's gun once per fire press while it is Occupied.
#[allow(clippy::too_many_arguments)]
pub fn suit_weapon_system(
    mut commands: Commands,
    intent: Res<ActorIntent>,
    mut suits: Query<
        (Entity, &Transform, &Facing, &Possession, &mut SuitWeapon, Option<&mut Overheat>),
        With<Vehicle>,
    >,
    children: Query<(Entity, &ChildOf)>,
    mut ignores: ResMut<CollisionIgnores>,
    mut cues: MessageWriter<PresentationCue>,
    time: Res<Time>,
    config: Res<GameConfig>,
) {
    if !intent.fire {
        return;
    }
    let now = time.elapsed_secs();
    let mut rng = rand::thread_rng();

    for (suit, transform, facing, possession, mut weapon, overheat) in suits.iter_mut() {
        if !possession.is_occupied() {
            continue;
        }
        if !weapon.try_fire(now, overheat.map(|o| o.into_inner())) {
            continue;
        }

        let side = facing.sign();
        let origin = weapon.muzzle(transform.translation.truncate(), side);
        let shot = spawn_fast_projectile(
            &mut commands,
            origin,
            Vec2::new(side * weapon.bullet_speed, 0.0),
            FastProjectile::new(weapon.damage, layers::SOLID | layers::ENEMY),
            now + config.fast_bullet_lifetime,
        );

        ignores.ignore_pair(shot, suit, true);
        for (child, child_of) in children.iter() {
            if child_of.parent() == suit {
                ignores.ignore_pair(shot, child, true);
            }
        }

        cues.write(PresentationCue::sound(SoundCue::SuitShot, &config, &mut rng));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn overheat() -> Overheat {
        let mut config = GameConfig::default();
        config.overheat_max = 100.0;
        config.overheat_per_shot = 40.0;
        config.overheat_cool_per_sec = 20.0;
        config.overheat_unlock = 50.0;
        Overheat::from_config(&config)
    }

    #[test]
    fn overheat_locks_until_cooled_below_threshold() {
        let mut o = overheat();
        o.add_heat();
        o.add_heat();
        assert!(o.can_shoot());
        o.add_heat();
        assert!(o.is_overheated());
        assert_eq!(o.heat(), 100.0);

        o.add_heat();
        assert_eq!(o.heat(), 100.0);

        o.cool(1.0);
        assert!(!o.can_shoot());
        o.cool(1.5);
        assert!(o.can_shoot());
        assert_eq!(o.heat01(), 0.5);
    }

    #[test]
    fn cool_never_goes_negative_and_reset_clears() {
        let mut o = overheat();
        o.add_heat();
        o.cool(10.0);
        assert_eq!(o.heat(), 0.0);
        o.add_heat();
        o.reset();
        assert_eq!(o.heat01(), 0.0);
        assert!(o.can_shoot());
    }

    #[test]
    fn cooldown_gates_fire() {
        let mut w = SuitWeapon::from_config(&GameConfig::default());
        assert!(w.try_fire(0.0, None));
        assert!(!w.try_fire(w.fire_cooldown * 0.5, None));
        assert!(w.try_fire(w.fire_cooldown, None));
    }

    #[test]
    fn muzzle_mirrors_with_facing() {
        let w = SuitWeapon::from_config(&GameConfig::default());
        let right = w.muzzle(Vec2::ZERO, 1.0);
        let left = w.muzzle(Vec2::ZERO, -1.0);
        assert_eq!(right.x, -left.x);
        assert_eq!(right.y, left.y);
    }

    fn weapon_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
        app.insert_resource(GameConfig::default());
        app.init_resource::<CollisionIgnores>();
        app.insert_resource(ActorIntent {
            fire: true,
            ..Default::default()
        });
        app.add_message::<PresentationCue>();
        app.add_systems(Update, suit_weapon_system);
        app
    }

    fn shots(app: &mut App) -> usize {
        app.world_mut()
            .query::<&FastProjectile>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn empty_suit_does_not_fire() {
        let mut app = weapon_app();
        let config = GameConfig::default();
        app.world_mut().spawn((
            Vehicle,
            Possession::new(config.reenter_block_time),
            Transform::default(),
            Facing(1.0),
            SuitWeapon::from_config(&config),
        ));
        app.update();
        assert_eq!(shots(&mut app), 0);
    }

    #[test]
    fn occupied_suit_fires_and_ignores_itself() {
        let mut app = weapon_app();
        let config = GameConfig::default();
        let rat = app.world_mut().spawn_empty().id();
        let mut possession = Possession::new(config.reenter_block_time);
        possession.candidate_entered(rat);
        possession.try_enter(0.0).unwrap();
        let suit = app
            .world_mut()
            .spawn((
                Vehicle,
                possession,
                Transform::default(),
                Facing(-1.0),
                SuitWeapon::from_config(&config),
            ))
            .id();

        app.update();
        assert_eq!(shots(&mut app), 1);
        let shot = app
            .world_mut()
            .query_filtered::<Entity, With<FastProjectile>>()
            .single(app.world())
            .unwrap();
        assert!(app.world().resource::<CollisionIgnores>().is_ignored(shot, suit));
    }
}
