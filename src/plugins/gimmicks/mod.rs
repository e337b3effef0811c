//! Gimmicks plugin: multi-piece props whose pieces share one HP pool on a root.
//!
//! Each `RelayPiece` keeps a back-reference to its root and is also a child of it, so the
//! root's flash tree covers every piece and despawning the root takes the pieces along.
//!
//! ```text
//! TakeDamage(piece) -> on_piece_damaged -> RelayDamage(root) -> on_relay_damaged
//! ```
//!
//! Pieces hold no HP and always forward; only the root's latch decides whether a hit lands.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::{Faction, Layer};
use crate::common::state::GameState;
use crate::common::tunables::{Tunables, VisualSettings};
use crate::plugins::combat::damage::{DamageFeedback, DestroyedKind, TakeDamage, resolve};
use crate::plugins::combat::effects::EffectKind;
use crate::plugins::combat::flash::DamageFlash;
use crate::plugins::combat::health::{Damageable, HealthPool};

/// The single HP holder of a gimmick.
#[derive(Component, Debug, Clone)]
pub struct RelayHealth {
    pool: HealthPool,
}

impl RelayHealth {
    pub fn new(max_hp: i32) -> Self {
        Self {
            pool: HealthPool::new(max_hp),
        }
    }
}

impl Damageable for RelayHealth {
    fn pool(&self) -> &HealthPool {
        &self.pool
    }
    fn pool_mut(&mut self) -> &mut HealthPool {
        &mut self.pool
    }
}

/// A hittable part of a gimmick. Forwards every hit to `root`.
#[derive(Component, Debug, Clone, Copy)]
pub struct RelayPiece {
    pub root: Entity,
}

/// Damage routed from a piece to its root.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct RelayDamage {
    pub entity: Entity,
    pub amount: i32,
    pub point: Vec2,
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_gimmicks);
    app.add_observer(on_piece_damaged);
    app.add_observer(on_relay_damaged);
}

const GIMMICK_HP: i32 = 10;

/// An L-shaped prop made of three pieces.
fn spawn_gimmicks(mut commands: Commands, tunables: Res<Tunables>, visuals: Res<VisualSettings>) {
    let tile = tunables.tile_size;
    let origin = Vec2::new(-5.0, -3.0) * tile;
    let color = Color::srgb(0.55, 0.4, 0.8);
    let layers = CollisionLayers::new(Layer::Gimmick, [Layer::Player, Layer::Enemy]);

    let root = commands
        .spawn((
            Name::new("Gimmick"),
            RelayHealth::new(GIMMICK_HP),
            Faction::Neutral,
            Transform::from_translation(origin.extend(0.5)),
            Visibility::default(),
            DespawnOnExit(GameState::InGame),
        ))
        .id();

    for (i, offset) in [IVec2::new(0, 0), IVec2::new(1, 0), IVec2::new(0, 1)]
        .into_iter()
        .enumerate()
    {
        commands.spawn((
            Name::new(format!("GimmickPiece{i}")),
            RelayPiece { root },
            Faction::Neutral,
            Sprite::from_color(color, Vec2::splat(tile)),
            DamageFlash::new(color, &visuals),
            Transform::from_translation((offset.as_vec2() * tile).extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(tile, tile),
            layers,
            ChildOf(root),
        ));
    }
}

pub(crate) fn on_piece_damaged(
    ev: On<TakeDamage>,
    pieces: Query<&RelayPiece>,
    mut commands: Commands,
) {
    let hit = *ev.event();
    let Ok(piece) = pieces.get(hit.entity) else {
        return;
    };
    commands.trigger(RelayDamage {
        entity: piece.root,
        amount: hit.amount,
        point: hit.point,
    });
}

pub(crate) fn on_relay_damaged(
    ev: On<RelayDamage>,
    mut roots: Query<(&mut RelayHealth, &Transform)>,
    mut fx: DamageFeedback,
) {
    let hit = *ev.event();
    let Ok((mut health, tf)) = roots.get_mut(hit.entity) else {
        debug!("relay: root {:?} is gone, dropping {} damage", hit.entity, hit.amount);
        return;
    };

    let outcome = health.absorb(hit.amount);
    let Some(killed) = resolve(hit.entity, hit.amount, outcome) else {
        return;
    };

    fx.wounded(hit.entity, hit.point);
    if killed {
        fx.destroyed(
            hit.entity,
            DestroyedKind::Gimmick,
            EffectKind::GimmickBreak,
            tf.translation.truncate(),
        );
    }
}
