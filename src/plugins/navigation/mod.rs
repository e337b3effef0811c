//! Navigation plugin: the movement service enemy brains steer through.
//!
//! Brains only talk to the [`Navigation`] trait. The shipped backend, [`NavAgent`], walks
//! in a straight line toward its destination by writing `LinearVelocity`; walls stop it
//! through the physics solver, not through path planning.
//!
//! ```text
//! FixedUpdate: Act (brain picks destination / stops) -> steer_nav_agents
//! ```

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::state::{CombatSystems, GameState};

/// Movement service consumed by the combat state machine.
pub trait Navigation {
    fn set_destination(&mut self, point: Vec2);
    fn is_path_pending(&self) -> bool;
    fn remaining_distance(&self) -> f32;
    fn stopping_distance(&self) -> f32;
    fn set_stopped(&mut self, stopped: bool);

    /// Not computing a path and already inside the stopping distance.
    fn has_arrived(&self) -> bool {
        !self.is_path_pending() && self.remaining_distance() <= self.stopping_distance()
    }
}

/// Straight-line navigation agent.
#[derive(Component, Debug, Clone)]
pub struct NavAgent {
    pub speed: f32,
    stopping_distance: f32,
    destination: Option<Vec2>,
    /// Unknown until the first sync; the agent reports a pending path until then.
    position: Option<Vec2>,
    stopped: bool,
}

impl NavAgent {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            speed,
            stopping_distance,
            destination: None,
            position: None,
            stopped: false,
        }
    }

    #[inline]
    pub fn sync_position(&mut self, pos: Vec2) {
        self.position = Some(pos);
    }

    /// Velocity this agent wants this step.
    pub fn desired_velocity(&self) -> Vec2 {
        if self.stopped {
            return Vec2::ZERO;
        }
        let (Some(pos), Some(dest)) = (self.position, self.destination) else {
            return Vec2::ZERO;
        };
        let to = dest - pos;
        if to.length() <= self.stopping_distance {
            return Vec2::ZERO;
        }
        to.normalize_or_zero() * self.speed
    }
}

impl Navigation for NavAgent {
    fn set_destination(&mut self, point: Vec2) {
        self.destination = Some(point);
    }

    fn is_path_pending(&self) -> bool {
        self.position.is_none() || self.destination.is_none()
    }

    fn remaining_distance(&self) -> f32 {
        match (self.position, self.destination) {
            (Some(p), Some(d)) => p.distance(d),
            _ => f32::INFINITY,
        }
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }
}

/// Null backend for brains with no `NavAgent`: always pending, never arrives.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl Navigation for Detached {
    fn set_destination(&mut self, _point: Vec2) {}

    fn is_path_pending(&self) -> bool {
        true
    }

    fn remaining_distance(&self) -> f32 {
        f32::INFINITY
    }

    fn stopping_distance(&self) -> f32 {
        0.0
    }

    fn set_stopped(&mut self, _stopped: bool) {}
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        steer_nav_agents
            .after(CombatSystems::Act)
            .run_if(in_state(GameState::InGame)),
    );
}

pub(crate) fn steer_nav_agents(mut q: Query<(&mut NavAgent, &Transform, &mut LinearVelocity)>) {
    for (mut agent, tf, mut vel) in &mut q {
        agent.sync_position(tf.translation.truncate());
        vel.0 = agent.desired_velocity();
    }
}
