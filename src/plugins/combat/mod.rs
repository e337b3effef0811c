//! Combat plugin: the damage pipeline shared by every destructible kind.
//!
//! ```text
//! strike / drill (FixedUpdate)
//!   -> trigger TakeDamage on the target
//!   -> per-kind observer: latch, HP, hit effect, flash tree, stagger, cascade
//!   -> SpawnEffect / Destroyed messages, PendingDespawn marker
//! FixedPostUpdate: flashes and effect lifetimes tick
//! PostUpdate:      effects spawn, marked entities despawn
//! ```
//!
//! We never despawn inside the fixed step. Dying entities are marked `PendingDespawn` and
//! removed in `PostUpdate`, after every queued command that might still name them.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::common::state::{CombatSystems, GameState};

pub mod damage;
pub mod effects;
pub mod flash;
pub mod health;
pub mod hit_test;

use damage::Destroyed;
use effects::{SpawnEffect, expire_effects, spawn_effects};
use flash::update_damage_flashes;

/// Marker: entity should be removed from the world at the end of the frame.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

/// Randomness for recover times and stun shake.
#[derive(Resource, Debug)]
pub struct CombatRng(pub StdRng);

impl Default for CombatRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl CombatRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

pub fn plugin(app: &mut App) {
    app.add_message::<SpawnEffect>();
    app.add_message::<Destroyed>();

    app.add_systems(
        FixedPostUpdate,
        (update_damage_flashes, expire_effects).in_set(CombatSystems::Timers),
    );

    app.add_systems(
        PostUpdate,
        (spawn_effects, despawn_pending)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}

fn despawn_pending(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}
