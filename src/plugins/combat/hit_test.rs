//! Overlap queries used by strikes (enemy swings, player drill).
//!
//! The combat code only needs "which colliders touch this circle". Avian's
//! `SpatialQuery` answers that in the running game; tests answer it with a plain list.

use avian2d::prelude::*;
use bevy::prelude::*;

pub trait OverlapQuery {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<Entity>;
}

impl OverlapQuery for SpatialQuery<'_, '_> {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<Entity> {
        self.shape_intersections(
            &Collider::circle(radius),
            center,
            0.0,
            &SpatialQueryFilter::from_mask(mask),
        )
    }
}

/// Pick the hit whose position is nearest to `origin`.
///
/// Ties keep the earliest entry, so the result is stable for a given query order.
pub fn closest_to(origin: Vec2, hits: impl IntoIterator<Item = (Entity, Vec2)>) -> Option<Entity> {
    let mut best: Option<(Entity, f32)> = None;
    for (e, pos) in hits {
        let d = origin.distance_squared(pos);
        match best {
            Some((_, bd)) if bd <= d => {}
            _ => best = Some((e, d)),
        }
    }
    best.map(|(e, _)| e)
}
