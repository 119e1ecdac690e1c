//! Headless checks for enemy attacks landing on the rat and the suit.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier2d::prelude::*;
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
use ratsuit::config::GameConfig;
use ratsuit::contact::{contact_damage_system, ContactDamage, TouchContacts};
use ratsuit::damage::{DamageDealt, DamageSource};
use ratsuit::effects::{despawn_after_system, PresentationCue};
use ratsuit::health::{Health, HealthTuning};
use ratsuit::physics_query::layers;
use ratsuit::possession::{FreeActor, Possession, Vehicle};
use ratsuit::projectile::{arced_projectile_hit_system, ArcedProjectile};
use std::time::Duration;

fn combat_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
    app.insert_resource(GameConfig::default());
    app.add_message::<CollisionEvent>();
    app.add_message::<PresentationCue>();
    app.add_message::<DamageDealt>();
    app.add_systems(Update, (contact_damage_system, despawn_after_system).chain());
    app.add_systems(PostUpdate, arced_projectile_hit_system);
    app
}

fn spawn_rat(app: &mut App) -> Entity {
    let config = GameConfig::default();
    app.world_mut()
        .spawn((
            FreeActor,
            Health::new(HealthTuning::actor(&config)),
            CollisionGroups::new(layers::ACTOR, Group::ALL),
            Transform::default(),
        ))
        .id()
}

fn spawn_empty_suit(app: &mut App) -> Entity {
    let config = GameConfig::default();
    app.world_mut()
        .spawn((
            Vehicle,
            Possession::new(config.reenter_block_time),
            Health::new(HealthTuning::suit(&config)),
            CollisionGroups::new(layers::ACTOR, Group::ALL),
            Transform::default(),
        ))
        .id()
}

fn acid(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((
            ArcedProjectile::new(1, layers::SOLID | layers::ACTOR),
            Transform::default(),
        ))
        .id()
}

fn hp(app: &App, e: Entity) -> u32 {
    app.world().get::<Health>(e).unwrap().hp()
}

fn dealt(app: &mut App) -> Vec<DamageDealt> {
    app.world_mut()
        .resource_mut::<Messages<DamageDealt>>()
        .drain()
        .collect()
}

#[test]
fn acid_on_empty_suit_is_consumed_without_damage() {
    let mut app = combat_app();
    let suit = spawn_empty_suit(&mut app);
    let blob = acid(&mut app);

    app.world_mut().write_message(CollisionEvent::Started(
        blob,
        suit,
        CollisionEventFlags::SENSOR,
    ));
    app.update();

    assert_eq!(hp(&app, suit), GameConfig::default().suit_max_hp);
    assert!(app.world().get_entity(blob).is_err());
    assert!(dealt(&mut app).is_empty());
}

#[test]
fn acid_on_rat_lands_once() {
    let mut app = combat_app();
    let rat = spawn_rat(&mut app);
    let blob = acid(&mut app);

    for _ in 0..2 {
        app.world_mut().write_message(CollisionEvent::Started(
            rat,
            blob,
            CollisionEventFlags::SENSOR,
        ));
    }
    app.update();

    assert_eq!(hp(&app, rat), GameConfig::default().actor_max_hp - 1);
    let hits = dealt(&mut app);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, DamageSource::Projectile);
}

#[test]
fn contact_keeps_hurting_after_cooldown_until_death() {
    let mut app = combat_app();
    let mut config = GameConfig::default();
    config.actor_max_hp = 2;
    config.flash_count = 1;
    config.flash_interval = 0.05;
    config.actor_extra_invuln = 0.0;
    config.actor_death_grace = 0.0;
    app.insert_resource(config.clone());

    let rat = app
        .world_mut()
        .spawn((FreeActor, Health::new(HealthTuning::actor(&config))))
        .id();
    app.world_mut().spawn((
        ContactDamage::new(1, 0.3),
        TouchContacts {
            touching: vec![rat],
        },
    ));

    app.update(); // t = 0.0
    assert_eq!(hp(&app, rat), 1);

    for _ in 0..4 {
        app.update(); // t = 0.1 .. 0.4
    }
    assert!(app.world().get_entity(rat).is_err(), "second touch kills");
}
