//! Collision layers and gameplay identity.

use avian2d::prelude::*;
use bevy::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    World,
    Player,
    Enemy,
    Destructible,
    Gimmick,
}

impl Layer {
    /// Everything the player's drill is allowed to bite into.
    pub const DRILLABLE: [Layer; 3] = [Layer::Enemy, Layer::Destructible, Layer::Gimmick];
}

/// Explicit identity used by hit-tests instead of string tags.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Player,
    Enemy,
    Neutral,
}

/// Collision layers for something that should no longer interact with anything.
///
/// Memberships and filters are both cleared: no new contacts, and spatial queries masked on
/// any layer skip it.
#[inline]
pub fn non_interacting() -> CollisionLayers {
    CollisionLayers::new(LayerMask::NONE, LayerMask::NONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interacting_leaves_every_query_mask() {
        let layers = non_interacting();
        let drillable = LayerMask::from(Layer::DRILLABLE);
        assert_eq!(layers.memberships & drillable, LayerMask::NONE);
        assert_eq!(layers.memberships & LayerMask::from(Layer::Player), LayerMask::NONE);
        assert_eq!(layers.filters, LayerMask::NONE);
    }
}
