//! Fire-and-forget visual effects.
//!
//! Producers (health observers) only write [`SpawnEffect`] intent. `spawn_effects` is the
//! single consumer that turns intent into short-lived sprites, and `expire_effects` removes
//! them. A dropped request is not an error: feedback is never load-bearing.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Hit,
    EnemyDeath,
    ArmorBreak,
    CoreExplosion,
    GimmickBreak,
    WallBreak,
}

impl EffectKind {
    /// (colour, size in pixels, lifetime in seconds)
    fn style(self) -> (Color, f32, f32) {
        match self {
            Self::Hit => (Color::srgb(1.0, 0.95, 0.6), 10.0, 0.12),
            Self::EnemyDeath => (Color::srgb(0.9, 0.3, 0.3), 36.0, 0.35),
            Self::ArmorBreak => (Color::srgb(0.45, 0.75, 1.0), 20.0, 0.3),
            Self::CoreExplosion => (Color::srgb(1.0, 0.55, 0.1), 64.0, 0.5),
            Self::GimmickBreak => (Color::srgb(0.7, 0.5, 0.95), 48.0, 0.4),
            Self::WallBreak => (Color::srgb(0.55, 0.5, 0.45), 32.0, 0.4),
        }
    }
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct SpawnEffect {
    pub kind: EffectKind,
    pub pos: Vec2,
    /// Entity whose damage or death produced the effect.
    pub source: Entity,
}

#[derive(Component, Debug)]
pub struct EffectLifetime(pub Timer);

pub fn spawn_effects(mut reader: MessageReader<SpawnEffect>, mut commands: Commands) {
    for req in reader.read() {
        let (color, size, lifetime) = req.kind.style();
        commands.spawn((
            Name::new(format!("Effect({:?})", req.kind)),
            EffectLifetime(Timer::from_seconds(lifetime, TimerMode::Once)),
            Sprite {
                color,
                custom_size: Some(Vec2::splat(size)),
                ..default()
            },
            Transform::from_translation(req.pos.extend(5.0)),
            DespawnOnExit(GameState::InGame),
        ));
    }
}

/// Fade effects out and remove them when their lifetime ends.
pub fn expire_effects(
    time: Res<Time<Fixed>>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut EffectLifetime, &mut Sprite)>,
) {
    for (e, mut life, mut sprite) in &mut q {
        life.0.tick(time.delta());

        let dur = life.0.duration().as_secs_f32().max(0.0001);
        let t = (life.0.elapsed_secs() / dur).clamp(0.0, 1.0);
        let mut c = sprite.color.to_srgba();
        c.alpha = 1.0 - t;
        sprite.color = c.into();

        if life.0.is_finished() {
            commands.entity(e).despawn();
        }
    }
}
