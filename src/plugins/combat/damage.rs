//! The universal combat entry point and the feedback every health kind shares.
//!
//! Every damageable kind registers an observer for [`TakeDamage`] that only reacts when
//! the target carries its component. Inside the observer the order is fixed:
//!
//! ```text
//! latch check -> HP decrement -> hit effect -> flash tree -> stagger -> death cascade
//! ```
//!
//! Observers run exclusively, so one damage application can never interleave with another.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::PendingDespawn;
use super::effects::{EffectKind, SpawnEffect};
use super::flash::DamageFlash;
use super::health::DamageOutcome;
use crate::plugins::enemies::ai::CombatStateMachine;
use crate::plugins::navigation::{Detached, NavAgent};

/// Deal `amount` of damage to `entity`, landing at `point`.
///
/// Entities with no damageable component ignore it.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct TakeDamage {
    pub entity: Entity,
    pub amount: i32,
    pub point: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DestroyedKind {
    Enemy,
    ArmoredCore,
    ArmorPiece,
    Gimmick,
    Wall,
}

/// Fired exactly once when a damageable entity dies and is scheduled for removal.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Destroyed {
    pub entity: Entity,
    pub kind: DestroyedKind,
}

/// Filter out hits that must not produce feedback.
///
/// Returns `Some(killed)` when the hit landed.
pub fn resolve(target: Entity, amount: i32, outcome: DamageOutcome) -> Option<bool> {
    match outcome {
        DamageOutcome::Ignored => {
            trace!("damage: {target:?} already dead, ignoring {amount}");
            None
        }
        DamageOutcome::Rejected => {
            warn!("damage: rejected negative amount {amount} on {target:?}");
            None
        }
        DamageOutcome::Wounded => Some(false),
        DamageOutcome::Killed => Some(true),
    }
}

/// Side effects shared by every health observer.
#[derive(SystemParam)]
pub struct DamageFeedback<'w, 's> {
    commands: Commands<'w, 's>,
    effects: MessageWriter<'w, SpawnEffect>,
    destroyed: MessageWriter<'w, Destroyed>,
    flashes: Query<'w, 's, &'static mut DamageFlash>,
    children: Query<'w, 's, &'static Children>,
    brains: Query<'w, 's, (&'static mut CombatStateMachine, Option<&'static mut NavAgent>)>,
}

impl<'w, 's> DamageFeedback<'w, 's> {
    pub fn effect(&mut self, kind: EffectKind, pos: Vec2, source: Entity) {
        self.effects.write(SpawnEffect { kind, pos, source });
    }

    /// Trigger every flash on `root` and on its descendants.
    pub fn flash_tree(&mut self, root: Entity) {
        let mut stack = vec![root];
        while let Some(e) = stack.pop() {
            if let Ok(mut flash) = self.flashes.get_mut(e) {
                flash.trigger();
            }
            if let Ok(children) = self.children.get(e) {
                stack.extend(children.iter());
            }
        }
    }

    /// Turn off the entity's own flash; a running pulse reverts on the next tick.
    pub fn silence(&mut self, entity: Entity) {
        if let Ok(mut flash) = self.flashes.get_mut(entity) {
            flash.set_enabled(false);
        }
    }

    /// Tell the entity's state machine it was hit, if it has one.
    pub fn stagger(&mut self, entity: Entity) {
        let Ok((mut brain, nav)) = self.brains.get_mut(entity) else {
            return;
        };
        let stunned = match nav {
            Some(mut nav) => brain.notify_damaged(&mut *nav),
            None => brain.notify_damaged(&mut Detached),
        };
        if stunned {
            trace!("stagger: {entity:?} stunned");
        }
    }

    /// Steps 3-5 of a landed hit: hit effect, flashes, stagger.
    pub fn wounded(&mut self, entity: Entity, point: Vec2) {
        self.effect(EffectKind::Hit, point, entity);
        self.flash_tree(entity);
        self.stagger(entity);
    }

    pub fn report_destroyed(&mut self, entity: Entity, kind: DestroyedKind) {
        debug!("destroyed: {entity:?} ({kind:?})");
        self.destroyed.write(Destroyed { entity, kind });
    }

    /// Mark for removal; the actual despawn happens in `PostUpdate`.
    pub fn remove(&mut self, entity: Entity) {
        self.commands.entity(entity).insert(PendingDespawn);
    }

    pub fn commands(&mut self) -> &mut Commands<'w, 's> {
        &mut self.commands
    }

    /// Death effect + notification + removal, in that order.
    pub fn destroyed(&mut self, entity: Entity, kind: DestroyedKind, effect: EffectKind, pos: Vec2) {
        self.effect(effect, pos, entity);
        self.report_destroyed(entity, kind);
        self.remove(entity);
    }
}
