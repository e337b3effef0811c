//! Player plugin: movement, drill attack and player health.
//!
//! Pipeline:
//! - Update: sample keyboard, write the `PlayerInput` resource
//! - FixedUpdate (Sense): turn input into facing / drill state
//! - FixedUpdate (Act): drive the rigid body and run the drill hit-test
//! - FixedPostUpdate: tick invulnerability, shake the body while drilling
//!
//! Player damage goes through the same `TakeDamage` event as everything else. HP changes
//! are published as `PlayerHpChanged`, death as `PlayerDied` (once). A dead player stays in
//! the world, frozen, so the last frame keeps showing where it fell.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;

use crate::common::layers::{Faction, Layer};
use crate::common::state::{CombatSystems, GameState};
use crate::common::tunables::{Seconds, Tunables, VisualSettings};
use crate::plugins::combat::{CombatRng, PendingDespawn};
use crate::plugins::combat::damage::{DamageFeedback, TakeDamage};
use crate::plugins::combat::flash::DamageFlash;
use crate::plugins::combat::health::{DamageOutcome, Damageable, HealthPool};
use crate::plugins::combat::hit_test::{OverlapQuery, closest_to};
use crate::plugins::world::destructible::Lingering;

// -----------------------------------------------------------------------------
// Components / resources / messages
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone, Copy)]
pub struct Player;

/// Handle of the live player entity, set on spawn.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct PlayerEntity(pub Option<Entity>);

#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub drill: bool,
}

/// Visual child carrying the player sprite.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerBody;

#[derive(Component, Debug, Clone)]
pub struct PlayerHealth {
    pool: HealthPool,
    iframes: Seconds,
    invulnerable: f32,
}

impl PlayerHealth {
    pub fn new(max_hp: i32, iframes: Seconds) -> Self {
        Self {
            pool: HealthPool::new(max_hp),
            iframes,
            invulnerable: 0.0,
        }
    }

    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable > 0.0
    }

    /// Apply a hit unless invulnerable. A landed, non-lethal hit starts the i-frames.
    pub fn take_hit(&mut self, amount: i32) -> DamageOutcome {
        if self.is_invulnerable() {
            return DamageOutcome::Ignored;
        }
        let outcome = self.pool.absorb(amount);
        if outcome == DamageOutcome::Wounded {
            self.invulnerable = self.iframes.get();
        }
        outcome
    }

    pub fn tick(&mut self, dt: f32) {
        self.invulnerable = (self.invulnerable - dt).max(0.0);
    }
}

impl Damageable for PlayerHealth {
    fn pool(&self) -> &HealthPool {
        &self.pool
    }
    fn pool_mut(&mut self) -> &mut HealthPool {
        &mut self.pool
    }
}

/// Facing and drill state.
#[derive(Component, Debug, Clone)]
pub struct PlayerDrill {
    facing: Vec2,
    active: bool,
    cooldown: f32,
}

impl Default for PlayerDrill {
    fn default() -> Self {
        Self {
            facing: Vec2::NEG_Y,
            active: false,
            cooldown: 0.0,
        }
    }
}

impl PlayerDrill {
    #[inline]
    pub fn facing(&self) -> Vec2 {
        self.facing
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Snap a direction to the dominant axis. Ties go vertical.
pub fn cardinal(dir: Vec2) -> Vec2 {
    if dir.x.abs() > dir.y.abs() {
        Vec2::new(dir.x.signum(), 0.0)
    } else {
        Vec2::new(0.0, dir.y.signum())
    }
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHpChanged {
    pub current: i32,
    pub max: i32,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerDied;

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayerInput>()
        .init_resource::<PlayerEntity>()
        .add_message::<PlayerHpChanged>()
        .add_message::<PlayerDied>()
        .add_observer(on_player_damaged)
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(Update, gather_input.run_if(in_state(GameState::InGame)))
        .add_systems(FixedUpdate, apply_input.in_set(CombatSystems::Sense))
        .add_systems(
            FixedUpdate,
            (apply_movement, drill_strike).in_set(CombatSystems::Act),
        )
        .add_systems(FixedPostUpdate, tick_invulnerability.in_set(CombatSystems::Timers))
        .add_systems(FixedPostUpdate, shake_drilling_body.in_set(CombatSystems::Present));
}

// -----------------------------------------------------------------------------
// Spawn
// -----------------------------------------------------------------------------

fn spawn(
    mut commands: Commands,
    tunables: Res<Tunables>,
    visuals: Res<VisualSettings>,
    mut hp_changed: MessageWriter<PlayerHpChanged>,
) {
    let layers = CollisionLayers::new(
        Layer::Player,
        [Layer::World, Layer::Enemy, Layer::Destructible, Layer::Gimmick],
    );
    let color = Color::srgb(0.2, 0.75, 0.9);
    let radius = tunables.tile_size * 0.4;
    let health = PlayerHealth::new(tunables.player_max_hp, tunables.player_iframes);
    let (current, max) = (health.hp(), health.pool().max());

    let e = commands
        .spawn((
            Name::new("Player"),
            Player,
            Faction::Player,
            health,
            PlayerDrill::default(),
            Transform::from_xyz(0.0, 0.0, 1.0),
            Visibility::default(),
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            Collider::circle(radius),
            layers,
            LinearVelocity::ZERO,
            DespawnOnExit(GameState::InGame),
            children![(
                Name::new("PlayerBody"),
                PlayerBody,
                Sprite::from_color(color, Vec2::splat(radius * 2.0)),
                DamageFlash::new(color, &visuals).with_flash(visuals.flash_color, tunables.player_iframes),
                Transform::default(),
            )],
        ))
        .id();

    commands.insert_resource(PlayerEntity(Some(e)));
    hp_changed.write(PlayerHpChanged { current, max });
}

// -----------------------------------------------------------------------------
// Input
// -----------------------------------------------------------------------------

/// Keyboard is optional so headless apps run without an input plugin.
fn gather_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<PlayerInput>) {
    let Some(keys) = keys else {
        return;
    };

    let mut axis = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
    input.drill = keys.pressed(KeyCode::Space);
}

/// Facing follows movement only while the drill is off; starting a drill resets its cooldown.
pub(crate) fn apply_input(
    input: Res<PlayerInput>,
    mut q: Query<(&mut PlayerDrill, &PlayerHealth), With<Player>>,
) {
    let Ok((mut drill, health)) = q.single_mut() else {
        return;
    };

    if health.is_dead() {
        drill.active = false;
        return;
    }

    if !input.drill && input.move_axis.length_squared() > 0.01 {
        drill.facing = cardinal(input.move_axis);
    }
    if input.drill && !drill.active {
        drill.cooldown = 0.0;
    }
    drill.active = input.drill;
}

pub(crate) fn apply_movement(
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q: Query<(&mut LinearVelocity, &PlayerDrill, &PlayerHealth), With<Player>>,
) {
    let Ok((mut vel, drill, health)) = q.single_mut() else {
        return;
    };

    vel.0 = if health.is_dead() {
        Vec2::ZERO
    } else if drill.active {
        drill.facing * tunables.drill_speed
    } else {
        input.move_axis * tunables.player_speed
    };
}

// -----------------------------------------------------------------------------
// Drill
// -----------------------------------------------------------------------------

/// Where the drill bites for a player at `pos` facing `facing`.
pub fn drill_point(pos: Vec2, facing: Vec2, tunables: &Tunables) -> Vec2 {
    pos + facing * tunables.tiles(0.6)
}

/// Positions of things the drill may still bite. Broken walls and dead bodies can stay in
/// the physics broad phase until the next step, so they are filtered here too.
pub(crate) type DrillCandidates<'w, 's> =
    Query<'w, 's, &'static GlobalTransform, (Without<PendingDespawn>, Without<Lingering>)>;

/// Closest drillable overlap to the player, by body position.
fn drill_target(
    overlaps: &impl OverlapQuery,
    player_pos: Vec2,
    point: Vec2,
    tunables: &Tunables,
    positions: &DrillCandidates,
) -> Option<Entity> {
    let hits = overlaps.overlap_circle(point, tunables.drill_radius, Layer::DRILLABLE.into());
    closest_to(
        player_pos,
        hits.into_iter()
            .filter_map(|e| positions.get(e).ok().map(|tf| (e, tf.translation().truncate()))),
    )
}

pub(crate) fn drill_strike(
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut q: Query<(&Transform, &mut PlayerDrill), With<Player>>,
    positions: DrillCandidates,
    spatial: SpatialQuery,
    mut commands: Commands,
) {
    let Ok((tf, mut drill)) = q.single_mut() else {
        return;
    };

    drill.cooldown = (drill.cooldown - time.delta_secs()).max(0.0);
    if !drill.active || drill.cooldown > 0.0 {
        return;
    }

    let pos = tf.translation.truncate();
    let point = drill_point(pos, drill.facing, &tunables);
    let Some(target) = drill_target(&spatial, pos, point, &tunables, &positions) else {
        return;
    };

    trace!("drill bites {target:?}");
    commands.trigger(TakeDamage {
        entity: target,
        amount: tunables.drill_damage,
        point,
    });
    drill.cooldown = tunables.drill_interval.get();
}

// -----------------------------------------------------------------------------
// Health
// -----------------------------------------------------------------------------

pub(crate) fn on_player_damaged(
    ev: On<TakeDamage>,
    mut q: Query<&mut PlayerHealth>,
    mut hp_changed: MessageWriter<PlayerHpChanged>,
    mut died: MessageWriter<PlayerDied>,
    mut fx: DamageFeedback,
) {
    let hit = *ev.event();
    let Ok(mut health) = q.get_mut(hit.entity) else {
        return;
    };

    match health.take_hit(hit.amount) {
        DamageOutcome::Ignored => {
            trace!("player: hit ignored (invulnerable or dead)");
        }
        DamageOutcome::Rejected => {
            warn!("player: rejected negative damage {}", hit.amount);
        }
        DamageOutcome::Wounded => {
            hp_changed.write(PlayerHpChanged {
                current: health.hp(),
                max: health.pool().max(),
            });
            fx.flash_tree(hit.entity);
        }
        DamageOutcome::Killed => {
            hp_changed.write(PlayerHpChanged {
                current: health.hp(),
                max: health.pool().max(),
            });
            info!("player died");
            died.write(PlayerDied);
        }
    }
}

fn tick_invulnerability(time: Res<Time<Fixed>>, mut q: Query<&mut PlayerHealth>) {
    let dt = time.delta_secs();
    for mut health in &mut q {
        health.tick(dt);
    }
}

/// Jitter the body sprite while the drill runs.
fn shake_drilling_body(
    tunables: Res<Tunables>,
    mut rng: ResMut<CombatRng>,
    q: Query<(&PlayerDrill, &Children), With<Player>>,
    mut q_body: Query<&mut Transform, With<PlayerBody>>,
) {
    let amount = tunables.tiles(0.05);
    for (drill, children) in &q {
        for child in children.iter() {
            let Ok(mut tf) = q_body.get_mut(child) else {
                continue;
            };
            let offset = if drill.active {
                Vec2::new(rng.0.gen_range(-1.0..=1.0), rng.0.gen_range(-1.0..=1.0)) * amount
            } else {
                Vec2::ZERO
            };
            tf.translation.x = offset.x;
            tf.translation.y = offset.y;
        }
    }
}
