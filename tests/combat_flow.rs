mod common;

use bevy::prelude::*;
use burrow::plugins::combat::damage::{Destroyed, DestroyedKind, TakeDamage};
use burrow::plugins::combat::effects::{EffectKind, SpawnEffect};
use burrow::plugins::enemies::Enemy;
use burrow::plugins::enemies::armor::ArmoredCore;
use burrow::plugins::gimmicks::{RelayHealth, RelayPiece};
use burrow::plugins::player::{PlayerDied, PlayerEntity, PlayerHpChanged};
use burrow::plugins::world::destructible::{CellCleared, DestructibleWall, Lingering};

fn hit(app: &mut App, entity: Entity, amount: i32) {
    app.world_mut().trigger(TakeDamage {
        entity,
        amount,
        point: Vec2::ZERO,
    });
    app.world_mut().flush();
}

#[test]
fn killed_grunt_is_removed_at_end_of_frame() {
    let mut app = common::app_in_game();
    let grunt = common::first_with::<Enemy>(&mut app);

    hit(&mut app, grunt, 1);
    hit(&mut app, grunt, 1);
    assert!(app.world().get_entity(grunt).is_ok());

    hit(&mut app, grunt, 1);
    app.update();

    assert!(app.world().get_entity(grunt).is_err());
    let destroyed: Vec<_> = common::buffered::<Destroyed>(&app)
        .into_iter()
        .filter(|d| d.entity == grunt)
        .collect();
    assert_eq!(destroyed.len(), 1);
    assert_eq!(destroyed[0].kind, DestroyedKind::Enemy);
}

#[test]
fn core_takes_its_armor_down_with_it() {
    let mut app = common::app_in_game();
    let core = common::first_with::<ArmoredCore>(&mut app);
    let pieces = app.world().get::<ArmoredCore>(core).unwrap().pieces().to_vec();

    hit(&mut app, core, 3);
    app.update();

    assert!(app.world().get_entity(core).is_err());
    for p in &pieces {
        assert!(app.world().get_entity(*p).is_err());
    }

    let kinds: Vec<_> = common::buffered::<SpawnEffect>(&app)
        .into_iter()
        .map(|e| e.kind)
        .collect();
    let explosion = kinds.iter().position(|k| *k == EffectKind::CoreExplosion);
    let last_break = kinds.iter().rposition(|k| *k == EffectKind::ArmorBreak);
    assert_eq!(kinds.iter().filter(|k| **k == EffectKind::ArmorBreak).count(), 4);
    assert!(last_break < explosion);
}

#[test]
fn gimmick_root_dies_from_piece_hits() {
    let mut app = common::app_in_game();
    let piece = common::first_with::<RelayPiece>(&mut app);
    let root = app.world().get::<RelayPiece>(piece).unwrap().root;

    hit(&mut app, piece, 6);
    hit(&mut app, piece, 6);
    hit(&mut app, piece, 6);
    app.update();

    assert!(app.world().get_entity(root).is_err());
    assert!(app.world().get_entity(piece).is_err());
    let gimmick_deaths = common::buffered::<Destroyed>(&app)
        .into_iter()
        .filter(|d| d.kind == DestroyedKind::Gimmick)
        .count();
    assert_eq!(gimmick_deaths, 1);
    assert_eq!(
        app.world_mut()
            .query::<&RelayHealth>()
            .iter(app.world())
            .count(),
        0
    );
}

#[test]
fn broken_wall_reports_its_cell_and_lingers() {
    let mut app = common::app_in_game();
    let wall = common::first_with::<DestructibleWall>(&mut app);
    let cell = app.world().get::<DestructibleWall>(wall).unwrap().cell();

    hit(&mut app, wall, 3);
    app.update();

    assert_eq!(common::buffered::<CellCleared>(&app), vec![CellCleared { cell }]);
    assert!(app.world().get::<Lingering>(wall).is_some());
    assert_eq!(
        *app.world().get::<Visibility>(wall).unwrap(),
        Visibility::Hidden
    );
}

#[test]
fn player_death_freezes_the_game() {
    let mut app = common::app_in_game();
    let player = app.world().resource::<PlayerEntity>().0.unwrap();

    hit(&mut app, player, 3);
    hit(&mut app, player, 3);
    app.update();

    assert_eq!(common::buffered::<PlayerDied>(&app).len(), 1);
    assert_eq!(
        common::buffered::<PlayerHpChanged>(&app).last(),
        Some(&PlayerHpChanged { current: 0, max: 3 })
    );
    assert!(app.world().resource::<Time<Virtual>>().is_paused());
    assert!(app.world().get_entity(player).is_ok());
}
