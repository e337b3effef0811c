//! Global state machine and the fixed-step ordering of combat work.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
}

/// Fixed-step phases shared by every combat plugin.
///
/// ```text
/// FixedUpdate:     Sense -> Act           (AI decisions, drill, strikes)
/// FixedPostUpdate: Timers -> Present      (flash/linger timers, derived visuals)
/// ```
///
/// Damage itself is resolved by observers the moment a strike's commands are applied,
/// so no set owns it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatSystems {
    Sense,
    Act,
    Timers,
    Present,
}

pub(crate) fn configure_sets(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (CombatSystems::Sense, CombatSystems::Act)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
    app.configure_sets(
        FixedPostUpdate,
        (CombatSystems::Timers, CombatSystems::Present)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}
