//! Destructible walls: grid cells the player drills through.
//!
//! A broken wall stops interacting right away and reports its grid cell, then lingers for a
//! moment before it is removed so effects spawned on it have something to sit on. Its
//! collider is the only footprint agents and the drill ever see, so clearing its layers is
//! what opens the cell.

use std::time::Duration;

use bevy::prelude::*;

use crate::common::layers::non_interacting;
use crate::plugins::combat::PendingDespawn;
use crate::plugins::combat::damage::{DamageFeedback, DestroyedKind, TakeDamage, resolve};
use crate::plugins::combat::effects::EffectKind;
use crate::plugins::combat::health::{Damageable, HealthPool};

pub const LINGER: Duration = Duration::from_secs(1);

#[derive(Component, Debug, Clone)]
pub struct DestructibleWall {
    pool: HealthPool,
    cell: IVec2,
}

impl DestructibleWall {
    pub fn new(max_hp: i32, cell: IVec2) -> Self {
        Self {
            pool: HealthPool::new(max_hp),
            cell,
        }
    }

    #[inline]
    pub fn cell(&self) -> IVec2 {
        self.cell
    }
}

impl Damageable for DestructibleWall {
    fn pool(&self) -> &HealthPool {
        &self.pool
    }
    fn pool_mut(&mut self) -> &mut HealthPool {
        &mut self.pool
    }
}

/// Grid cell containing world position `pos`.
pub fn cell_of(pos: Vec2, tile_size: f32) -> IVec2 {
    (pos / tile_size).floor().as_ivec2()
}

/// A wall cell was destroyed. Consumed by whatever keeps the tile map.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCleared {
    pub cell: IVec2,
}

/// Broken wall waiting to be removed.
#[derive(Component, Debug)]
pub struct Lingering(pub Timer);

pub(crate) fn on_wall_damaged(
    ev: On<TakeDamage>,
    mut walls: Query<(
        &mut DestructibleWall,
        &Transform,
        Option<&mut Visibility>,
    )>,
    mut cleared: MessageWriter<CellCleared>,
    mut fx: DamageFeedback,
) {
    let hit = *ev.event();
    let Ok((mut wall, tf, visibility)) = walls.get_mut(hit.entity) else {
        return;
    };

    let outcome = wall.absorb(hit.amount);
    let Some(killed) = resolve(hit.entity, hit.amount, outcome) else {
        return;
    };

    fx.wounded(hit.entity, hit.point);
    if !killed {
        return;
    }

    let cell = wall.cell();
    debug!("wall at {cell} broken");
    cleared.write(CellCleared { cell });

    fx.silence(hit.entity);
    if let Some(mut visibility) = visibility {
        *visibility = Visibility::Hidden;
    }

    fx.effect(EffectKind::WallBreak, tf.translation.truncate(), hit.entity);
    fx.report_destroyed(hit.entity, DestroyedKind::Wall);
    fx.commands().entity(hit.entity).insert((
        non_interacting(),
        Lingering(Timer::new(LINGER, TimerMode::Once)),
    ));
}

pub(crate) fn tick_lingering(
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut Lingering), Without<PendingDespawn>>,
) {
    for (e, mut linger) in &mut q {
        linger.0.tick(time.delta());
        if linger.0.is_finished() {
            commands.entity(e).insert(PendingDespawn);
        }
    }
}
