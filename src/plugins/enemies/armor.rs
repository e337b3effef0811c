//! Armored core: a stationary core ringed by independently breakable armor pieces.
//!
//! The core owns its pieces by id. Pieces are siblings in the world, not children, so the
//! core breaks each one itself when it dies instead of relying on hierarchy despawn. A piece
//! never forwards damage to the core.
//!
//! All pieces are broken inline (not through nested triggers) so their break effects are
//! written before the core's explosion.

use bevy::prelude::*;

use crate::plugins::combat::damage::{DamageFeedback, DestroyedKind, TakeDamage, resolve};
use crate::plugins::combat::effects::EffectKind;
use crate::plugins::combat::health::{Damageable, HealthPool};

#[derive(Component, Debug, Clone)]
pub struct ArmoredCore {
    pool: HealthPool,
    pieces: Vec<Entity>,
}

impl ArmoredCore {
    pub fn new(max_hp: i32) -> Self {
        Self {
            pool: HealthPool::new(max_hp),
            pieces: Vec::new(),
        }
    }

    pub fn attach(&mut self, piece: Entity) {
        self.pieces.push(piece);
    }

    pub fn pieces(&self) -> &[Entity] {
        &self.pieces
    }
}

impl Damageable for ArmoredCore {
    fn pool(&self) -> &HealthPool {
        &self.pool
    }
    fn pool_mut(&mut self) -> &mut HealthPool {
        &mut self.pool
    }
}

#[derive(Component, Debug, Clone)]
pub struct ArmorPiece {
    pool: HealthPool,
}

impl ArmorPiece {
    pub fn new(max_hp: i32) -> Self {
        Self {
            pool: HealthPool::new(max_hp),
        }
    }
}

impl Damageable for ArmorPiece {
    fn pool(&self) -> &HealthPool {
        &self.pool
    }
    fn pool_mut(&mut self) -> &mut HealthPool {
        &mut self.pool
    }
}

pub(crate) fn on_core_damaged(
    ev: On<TakeDamage>,
    mut cores: Query<(&mut ArmoredCore, &Transform)>,
    mut pieces: Query<(&mut ArmorPiece, &Transform), Without<ArmoredCore>>,
    mut fx: DamageFeedback,
) {
    let hit = *ev.event();
    let Ok((mut core, tf)) = cores.get_mut(hit.entity) else {
        return;
    };

    let outcome = core.absorb(hit.amount);
    let Some(killed) = resolve(hit.entity, hit.amount, outcome) else {
        return;
    };

    fx.wounded(hit.entity, hit.point);
    if !killed {
        return;
    }

    let mut broken = 0;
    for &piece in core.pieces() {
        let Ok((mut armor, piece_tf)) = pieces.get_mut(piece) else {
            continue;
        };
        if !armor.pool_mut().force_kill() {
            continue;
        }
        broken += 1;
        fx.destroyed(
            piece,
            DestroyedKind::ArmorPiece,
            EffectKind::ArmorBreak,
            piece_tf.translation.truncate(),
        );
    }

    debug!("armored core {:?} down, broke {broken} remaining pieces", hit.entity);
    fx.destroyed(
        hit.entity,
        DestroyedKind::ArmoredCore,
        EffectKind::CoreExplosion,
        tf.translation.truncate(),
    );
}

pub(crate) fn on_armor_damaged(
    ev: On<TakeDamage>,
    mut pieces: Query<(&mut ArmorPiece, &Transform)>,
    mut fx: DamageFeedback,
) {
    let hit = *ev.event();
    let Ok((mut armor, tf)) = pieces.get_mut(hit.entity) else {
        return;
    };

    let outcome = armor.absorb(hit.amount);
    let Some(killed) = resolve(hit.entity, hit.amount, outcome) else {
        return;
    };

    fx.wounded(hit.entity, hit.point);
    if killed {
        fx.destroyed(
            hit.entity,
            DestroyedKind::ArmorPiece,
            EffectKind::ArmorBreak,
            tf.translation.truncate(),
        );
    }
}
