//! Core plugin: shared resources and global settings.
//!
//! Must be registered before `physics`, which reads `Tunables` at build time.

use bevy::prelude::*;

use crate::common::tunables::{Tunables, VisualSettings};
use crate::plugins::combat::CombatRng;

pub fn plugin(app: &mut App) {
    app.insert_resource(Tunables::default());
    app.insert_resource(VisualSettings::default());
    app.init_resource::<CombatRng>();
    app.insert_resource(ClearColor(Color::srgb(0.07, 0.05, 0.04)));
}
