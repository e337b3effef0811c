//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `burrow::game::configure_headless` to install gameplay plugins.

#![allow(dead_code)]

use bevy::asset::AssetPlugin;
use bevy::ecs::message::Messages;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use burrow::plugins::combat::CombatRng;

pub fn app_headless() -> App {
    let mut app = App::new();

    // AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));

    burrow::game::configure_headless(&mut app);
    app.insert_resource(CombatRng::seeded(0x5eed));
    app
}

/// Headless app after its first frame: `OnEnter(InGame)` has spawned the level.
pub fn app_in_game() -> App {
    let mut app = app_headless();
    app.update();
    app
}

/// Every message of type `M` still buffered, oldest first.
pub fn buffered<M: Message + Clone>(app: &App) -> Vec<M> {
    let messages = app.world().resource::<Messages<M>>();
    messages.get_cursor().read(messages).cloned().collect()
}

/// First entity carrying component `C`.
pub fn first_with<C: Component>(app: &mut App) -> Entity {
    app.world_mut()
        .query_filtered::<Entity, With<C>>()
        .iter(app.world())
        .next()
        .expect("no entity with the requested component")
}
