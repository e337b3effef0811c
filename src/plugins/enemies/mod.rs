//! Enemies plugin: chasing grunts driven by [`ai::CombatStateMachine`] and a stationary
//! armored core.
//!
//! ---------------------------
//! HOW THIS IS WIRED
//! ---------------------------
//! 1) FACTS live in components:
//!    - `EnemyHealth` / `ArmoredCore` / `ArmorPiece` hold HP.
//!    - `CombatStateMachine` holds behavior state, facing, cue and stun shake.
//!
//! 2) RULES mutate facts in two places:
//!    - `drive_enemy_ai` (FixedUpdate, Act) ticks every brain and runs strike hit-tests.
//!    - health observers react to `TakeDamage` the moment a strike's commands apply.
//!
//! 3) PRESENTATION is derived from facts in `present_enemies` (FixedPostUpdate, Present):
//!    body pose and shake, cue icon visibility. Colour belongs to `DamageFlash`.
//!
//! Enemies are laid out as a physics root with visual children:
//!
//! ```text
//! Enemy (collider, NavAgent, CombatStateMachine, EnemyHealth)
//!  |- EnemyBody (Sprite, DamageFlash)
//!  '- CueIcon   (Sprite, Visibility)
//! ```

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;

use crate::common::layers::{Faction, Layer, non_interacting};
use crate::common::state::{CombatSystems, GameState};
use crate::common::tunables::{Tunables, VisualSettings};
use crate::plugins::combat::damage::{DamageFeedback, DestroyedKind, TakeDamage, resolve};
use crate::plugins::combat::effects::EffectKind;
use crate::plugins::combat::flash::DamageFlash;
use crate::plugins::combat::health::{Damageable, HealthPool};
use crate::plugins::combat::hit_test::OverlapQuery;
use crate::plugins::combat::{CombatRng, PendingDespawn};
use crate::plugins::navigation::{Detached, NavAgent};
use crate::plugins::player::{Player, PlayerEntity};

pub mod ai;
pub mod armor;

use ai::{AiProfile, CombatStateMachine, Cue, Pose};
use armor::{ArmorPiece, ArmoredCore};

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone, Copy)]
pub struct Enemy;

/// Simple HP for an enemy body. Hits stagger the enemy's brain if it has one.
#[derive(Component, Debug, Clone)]
pub struct EnemyHealth {
    pool: HealthPool,
}

impl EnemyHealth {
    pub fn new(max_hp: i32) -> Self {
        Self {
            pool: HealthPool::new(max_hp),
        }
    }
}

impl Damageable for EnemyHealth {
    fn pool(&self) -> &HealthPool {
        &self.pool
    }
    fn pool_mut(&mut self) -> &mut HealthPool {
        &mut self.pool
    }
}

/// Visual child carrying the body sprite.
#[derive(Component, Debug, Clone, Copy)]
pub struct EnemyBody;

/// Visual child showing the discovered / lost icon.
#[derive(Component, Debug, Clone, Copy)]
pub struct CueIcon;

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), (spawn_grunts, spawn_armored_core));

    app.add_observer(on_enemy_damaged);
    app.add_observer(armor::on_core_damaged);
    app.add_observer(armor::on_armor_damaged);

    app.add_systems(FixedUpdate, drive_enemy_ai.in_set(CombatSystems::Act));
    app.add_systems(FixedPostUpdate, present_enemies.in_set(CombatSystems::Present));
}

// -----------------------------------------------------------------------------
// Spawn
// -----------------------------------------------------------------------------

const GRUNT_HP: i32 = 3;
const CORE_HP: i32 = 3;
const ARMOR_HP: i32 = 1;

fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Enemy,
        [Layer::World, Layer::Player, Layer::Enemy, Layer::Destructible],
    )
}

fn spawn_grunts(mut commands: Commands, tunables: Res<Tunables>, visuals: Res<VisualSettings>) {
    let tile = tunables.tile_size;
    let profile = match AiProfile::default().scaled(tile).validate() {
        Ok(p) => p,
        Err(err) => {
            warn!("enemies: grunt profile rejected: {err}");
            return;
        }
    };

    let body_color = Color::srgb(0.85, 0.3, 0.3);
    let radius = tile * 0.4;

    for (i, cell) in [IVec2::new(-8, 5), IVec2::new(8, 5), IVec2::new(0, -7)]
        .into_iter()
        .enumerate()
    {
        let pos = cell.as_vec2() * tile;
        commands.spawn((
            Name::new(format!("Grunt{i}")),
            Enemy,
            Faction::Enemy,
            EnemyHealth::new(GRUNT_HP),
            CombatStateMachine::new(profile.clone()),
            NavAgent::new(profile.move_speed, profile.stopping_distance),
            Transform::from_translation(pos.extend(1.0)),
            Visibility::default(),
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            Collider::circle(radius),
            enemy_layers(),
            LinearVelocity::ZERO,
            DespawnOnExit(GameState::InGame),
            children![
                (
                    Name::new("EnemyBody"),
                    EnemyBody,
                    Sprite::from_color(body_color, Vec2::splat(radius * 2.0)),
                    DamageFlash::new(body_color, &visuals),
                    Transform::default(),
                ),
                (
                    Name::new("CueIcon"),
                    CueIcon,
                    Sprite::from_color(Color::WHITE, Vec2::splat(tile * 0.3)),
                    Transform::from_xyz(0.0, tile * 0.7, 2.0),
                    Visibility::Hidden,
                ),
            ],
        ));
    }
}

/// Core in the middle of a ring of armor pieces.
fn spawn_armored_core(
    mut commands: Commands,
    tunables: Res<Tunables>,
    visuals: Res<VisualSettings>,
) {
    let tile = tunables.tile_size;
    let center = Vec2::new(0.0, 6.0) * tile;
    let core_color = Color::srgb(0.95, 0.6, 0.2);
    let armor_color = Color::srgb(0.45, 0.55, 0.75);

    let mut core = ArmoredCore::new(CORE_HP);
    for (i, dir) in [Vec2::X, Vec2::Y, Vec2::NEG_X, Vec2::NEG_Y].into_iter().enumerate() {
        let pos = center + dir * tile;
        let piece = commands
            .spawn((
                Name::new(format!("ArmorPiece{i}")),
                ArmorPiece::new(ARMOR_HP),
                Faction::Enemy,
                Sprite::from_color(armor_color, Vec2::splat(tile * 0.9)),
                DamageFlash::new(armor_color, &visuals),
                Transform::from_translation(pos.extend(1.0)),
                RigidBody::Static,
                Collider::rectangle(tile * 0.9, tile * 0.9),
                enemy_layers(),
                DespawnOnExit(GameState::InGame),
            ))
            .id();
        core.attach(piece);
    }

    commands.spawn((
        Name::new("ArmoredCore"),
        core,
        Faction::Enemy,
        Sprite::from_color(core_color, Vec2::splat(tile * 0.8)),
        DamageFlash::new(core_color, &visuals),
        Transform::from_translation(center.extend(1.0)),
        RigidBody::Static,
        Collider::circle(tile * 0.4),
        enemy_layers(),
        DespawnOnExit(GameState::InGame),
    ));
}

// -----------------------------------------------------------------------------
// Damage
// -----------------------------------------------------------------------------

pub(crate) fn on_enemy_damaged(
    ev: On<TakeDamage>,
    mut q: Query<(&mut EnemyHealth, &Transform)>,
    mut fx: DamageFeedback,
) {
    let hit = *ev.event();
    let Ok((mut health, tf)) = q.get_mut(hit.entity) else {
        return;
    };

    let outcome = health.absorb(hit.amount);
    let Some(killed) = resolve(hit.entity, hit.amount, outcome) else {
        return;
    };
    trace!("enemy {:?} hit for {} (hp {})", hit.entity, hit.amount, health.hp());

    fx.wounded(hit.entity, hit.point);
    if killed {
        fx.commands()
            .entity(hit.entity)
            .insert(non_interacting());
        fx.destroyed(
            hit.entity,
            DestroyedKind::Enemy,
            EffectKind::EnemyDeath,
            tf.translation.truncate(),
        );
    }
}

// -----------------------------------------------------------------------------
// Behavior
// -----------------------------------------------------------------------------

/// First overlapping entity that belongs to the player.
fn strike_target(
    overlaps: &impl OverlapQuery,
    center: Vec2,
    radius: f32,
    factions: &Query<&Faction>,
) -> Option<Entity> {
    overlaps
        .overlap_circle(center, radius, Layer::Player.into())
        .into_iter()
        .find(|e| matches!(factions.get(*e), Ok(Faction::Player)))
}

/// Brains that still get a say this step.
pub(crate) type LiveBrains<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Transform,
        &'static mut CombatStateMachine,
        Option<&'static mut NavAgent>,
    ),
    (With<Enemy>, Without<PendingDespawn>, Without<Player>),
>;

/// One fixed step for every live enemy: sync its agent, tick its brain, resolve strikes.
pub(crate) fn step_enemies(
    dt: f32,
    player: Option<Vec2>,
    brains: &mut LiveBrains,
    overlaps: &impl OverlapQuery,
    factions: &Query<&Faction>,
    rng: &mut impl Rng,
    commands: &mut Commands,
) {
    for (e, tf, mut brain, nav) in brains.iter_mut() {
        let pos = tf.translation.truncate();
        let report = match nav {
            Some(mut nav) => {
                nav.sync_position(pos);
                brain.tick(dt, player, pos, &mut *nav, &mut *rng)
            }
            None => brain.tick(dt, player, pos, &mut Detached, &mut *rng),
        };

        if let Some((from, to)) = report.transition {
            debug!("enemy {e:?}: {from:?} -> {to:?}");
        }

        if !report.strike {
            continue;
        }
        let center = brain.strike_center(pos);
        let profile = brain.profile();
        if let Some(target) = strike_target(overlaps, center, profile.attack_radius, factions) {
            commands.trigger(TakeDamage {
                entity: target,
                amount: profile.attack_damage,
                point: center,
            });
        }
    }
}

pub(crate) fn drive_enemy_ai(
    time: Res<Time<Fixed>>,
    player_e: Res<PlayerEntity>,
    q_player: Query<&Transform, With<Player>>,
    mut rng: ResMut<CombatRng>,
    mut brains: LiveBrains,
    spatial: SpatialQuery,
    factions: Query<&Faction>,
    mut commands: Commands,
) {
    let player = player_e
        .0
        .and_then(|e| q_player.get(e).ok())
        .map(|tf| tf.translation.truncate());

    step_enemies(
        time.delta_secs(),
        player,
        &mut brains,
        &spatial,
        &factions,
        &mut rng.0,
        &mut commands,
    );
}

// -----------------------------------------------------------------------------
// Presentation
// -----------------------------------------------------------------------------

fn pose_scale(pose: Pose) -> Vec3 {
    match pose {
        Pose::Normal | Pose::Damaged => Vec3::ONE,
        Pose::Prepare => Vec3::new(1.15, 0.85, 1.0),
        Pose::Attack => Vec3::new(0.9, 1.2, 1.0),
    }
}

fn cue_color(cue: Cue) -> Color {
    match cue {
        Cue::Discovered => Color::srgb(1.0, 0.9, 0.2),
        Cue::Lost => Color::srgb(0.6, 0.6, 0.7),
    }
}

pub(crate) fn present_enemies(
    q_brains: Query<(&CombatStateMachine, &Children)>,
    mut q_body: Query<&mut Transform, (With<EnemyBody>, Without<CueIcon>)>,
    mut q_icon: Query<(&mut Visibility, &mut Sprite), (With<CueIcon>, Without<EnemyBody>)>,
) {
    for (brain, children) in &q_brains {
        for child in children.iter() {
            if let Ok(mut tf) = q_body.get_mut(child) {
                let offset = brain.body_offset();
                tf.translation.x = offset.x;
                tf.translation.y = offset.y;
                tf.scale = pose_scale(brain.pose());
            } else if let Ok((mut vis, mut sprite)) = q_icon.get_mut(child) {
                match brain.cue() {
                    Some(cue) => {
                        *vis = Visibility::Inherited;
                        sprite.color = cue_color(cue);
                    }
                    None => *vis = Visibility::Hidden,
                }
            }
        }
    }
}
