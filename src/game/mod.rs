//! Game composition root.
//!
//! Provides two public configuration functions:
//! - `configure_full`: DefaultPlugins (window/render/log) + game plugins.
//! - `configure_headless`: minimal configuration for integration tests.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::state::{self, GameState};
use crate::plugins;
use crate::plugins::player::PlayerDied;

#[cfg(target_os = "windows")]
use bevy::render::{
    RenderPlugin,
    settings::{Backends, PowerPreference, WgpuSettings},
};

pub fn run() {
    App::new().add_plugins(configure_full).run();
}

/// Full configuration for `cargo run`.
pub fn configure_full(app: &mut App) {
    let default_plugins = DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(Window {
                title: "Burrow".into(),
                resolution: WindowResolution::new(1280, 720),
                ..default()
            }),
            ..default()
        })
        .set(LogPlugin {
            filter: "wgpu=error,naga=warn,burrow=debug".into(),
            ..default()
        });

    // Force DX12 on Windows; Vulkan is unreliable on some hybrid-GPU laptops.
    #[cfg(target_os = "windows")]
    let default_plugins = default_plugins.set(RenderPlugin {
        render_creation: WgpuSettings {
            backends: Some(Backends::DX12),
            power_preference: PowerPreference::HighPerformance,
            ..default()
        }
        .into(),
        ..default()
    });

    app.add_plugins(default_plugins);

    configure_game(app);
    plugins::register_render(app);
}

/// Headless configuration for integration tests.
///
/// Notes:
/// - Do NOT add DefaultPlugins.
/// - Do NOT add render-only plugins (camera).
pub fn configure_headless(app: &mut App) {
    configure_game(app);
}

/// Configuration shared by both full and headless apps.
fn configure_game(app: &mut App) {
    app.init_state::<GameState>();
    state::configure_sets(app);
    plugins::register_gameplay(app);
    app.add_systems(Update, handle_player_death.run_if(in_state(GameState::InGame)));
}

/// Game over: freeze the simulation where it stands.
pub(crate) fn handle_player_death(
    mut died: MessageReader<PlayerDied>,
    mut time: ResMut<Time<Virtual>>,
) {
    if died.read().count() == 0 {
        return;
    }
    if !time.is_paused() {
        info!("game over");
        time.pause();
    }
}
