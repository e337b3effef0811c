//! World plugin: arena bounds, floor grid and destructible wall cells.
//!
//! Everything is laid out on the `Tunables::tile_size` grid. Cell `(x, y)` covers
//! `[x, x + 1) * tile` by `[y, y + 1) * tile`, so a wall centred in its cell maps back to
//! the same cell with [`destructible::cell_of`].

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::{Faction, Layer};
use crate::common::state::{CombatSystems, GameState};
use crate::common::tunables::{Tunables, VisualSettings};
use crate::plugins::combat::flash::DamageFlash;

pub mod destructible;

use destructible::{CellCleared, DestructibleWall, on_wall_damaged, tick_lingering};

/// Arena half extents, in tiles.
const HALF_W: i32 = 12;
const HALF_H: i32 = 9;
const WALL_HP: i32 = 3;

pub fn plugin(app: &mut App) {
    app.add_message::<CellCleared>();
    app.add_systems(
        OnEnter(GameState::InGame),
        (spawn_arena, spawn_floor, spawn_destructible_walls),
    );
    app.add_observer(on_wall_damaged);
    app.add_systems(FixedPostUpdate, tick_lingering.in_set(CombatSystems::Timers));
}

fn spawn_arena(mut commands: Commands, tunables: Res<Tunables>) {
    let tile = tunables.tile_size;
    let half_w = HALF_W as f32 * tile;
    let half_h = HALF_H as f32 * tile;
    let thickness = tile;
    let wall_color = Color::srgb(0.25, 0.27, 0.33);

    let wall_layers = CollisionLayers::new(Layer::World, [Layer::Player, Layer::Enemy]);

    let mut spawn_wall = |name: &str, pos: Vec2, size: Vec2| {
        commands.spawn((
            Name::new(name.to_owned()),
            Sprite::from_color(wall_color, size),
            Transform::from_translation(pos.extend(0.0)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            wall_layers,
            DespawnOnExit(GameState::InGame),
        ));
    };

    let horizontal = Vec2::new(half_w * 2.0 + thickness * 2.0, thickness);
    let vertical = Vec2::new(thickness, half_h * 2.0);
    spawn_wall("WallTop", Vec2::new(0.0, half_h + thickness * 0.5), horizontal);
    spawn_wall("WallBottom", Vec2::new(0.0, -half_h - thickness * 0.5), horizontal);
    spawn_wall("WallLeft", Vec2::new(-half_w - thickness * 0.5, 0.0), vertical);
    spawn_wall("WallRight", Vec2::new(half_w + thickness * 0.5, 0.0), vertical);
}

/// Checkerboard floor built from solid-colour sprites, so the game has no assets.
fn spawn_floor(mut commands: Commands, tunables: Res<Tunables>) {
    let tile = tunables.tile_size;
    (-HALF_H..HALF_H)
        .flat_map(|y| (-HALF_W..HALF_W).map(move |x| IVec2::new(x, y)))
        .for_each(|cell| {
            let color = if (cell.x + cell.y).rem_euclid(2) == 0 {
                Color::srgb(0.14, 0.12, 0.10)
            } else {
                Color::srgb(0.12, 0.10, 0.09)
            };
            commands.spawn((
                Sprite::from_color(color, Vec2::splat(tile)),
                Transform::from_translation(cell_center(cell, tile).extend(-1.0)),
                DespawnOnExit(GameState::InGame),
            ));
        });
}

#[inline]
fn cell_center(cell: IVec2, tile: f32) -> Vec2 {
    (cell.as_vec2() + Vec2::splat(0.5)) * tile
}

/// Cells holding a drillable wall: a band shielding the armored core and a short spur.
fn wall_cells() -> impl Iterator<Item = IVec2> {
    let band = (-6..=6).map(|x| IVec2::new(x, 3));
    let spur = (2..=7).map(|x| IVec2::new(x, -4));
    band.chain(spur)
}

fn spawn_destructible_walls(
    mut commands: Commands,
    tunables: Res<Tunables>,
    visuals: Res<VisualSettings>,
) {
    let tile = tunables.tile_size;
    let color = Color::srgb(0.5, 0.4, 0.3);
    let layers = CollisionLayers::new(Layer::Destructible, [Layer::Player, Layer::Enemy]);

    for cell in wall_cells() {
        commands.spawn((
            Name::new(format!("Dirt({}, {})", cell.x, cell.y)),
            DestructibleWall::new(WALL_HP, cell),
            Faction::Neutral,
            Sprite::from_color(color, Vec2::splat(tile)),
            DamageFlash::new(color, &visuals),
            Transform::from_translation(cell_center(cell, tile).extend(0.0)),
            Visibility::default(),
            RigidBody::Static,
            Collider::rectangle(tile, tile),
            layers,
            DespawnOnExit(GameState::InGame),
        ));
    }
}
