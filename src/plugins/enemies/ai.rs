//! Enemy behavior state machine.
//!
//! The machine is plain data driven by `tick`. It never touches the ECS: the caller
//! passes in perception (player position), the navigation backend and a random source,
//! and gets back a [`TickReport`] saying whether to run the strike hit-test this step.
//!
//! ```text
//!            detect                 arrived            prepare
//!   Idle ------------> Chasing ---------------> Preparing --------> Attacking
//!    ^   <------------   ^  ^                                          |
//!    |       lost        |  |            recover (random)              | attack
//!    |                   |  +------------------------ Recovering <-----+
//!    |    far at expiry  |  near at expiry
//!    +----------------- Stunned <------ notify_damaged (any state, if stunnable)
//! ```
//!
//! Perception and movement only run in `Idle` and `Chasing`. The timed states carry their
//! own elapsed counter, so at most one action is ever running.

use bevy::prelude::*;
use rand::Rng;
use thiserror::Error;

use crate::plugins::navigation::Navigation;

// -----------------------------------------------------------------------------
// Profile
// -----------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    #[error("lost range {lost} must be greater than detection range {detection}")]
    NoHysteresis { detection: f32, lost: f32 },
    #[error("recover time range is inverted ({min} > {max})")]
    InvertedRecover { min: f32, max: f32 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
}

/// Tuning for one enemy archetype.
///
/// Distances are authored in tiles; [`AiProfile::scaled`] converts them to world units.
#[derive(Debug, Clone, PartialEq)]
pub struct AiProfile {
    pub detection_range: f32,
    pub lost_range: f32,
    pub icon_duration: f32,
    pub stunnable: bool,
    pub stun_duration: f32,
    pub shake_amount: f32,
    pub move_speed: f32,
    pub stopping_distance: f32,
    pub prepare_duration: f32,
    pub attack_duration: f32,
    pub min_recover_time: f32,
    pub max_recover_time: f32,
    pub attack_radius: f32,
    /// Distance from the body to the strike circle along the facing. Zero strikes around the body.
    pub strike_offset: f32,
    pub attack_damage: i32,
}

impl Default for AiProfile {
    fn default() -> Self {
        Self {
            detection_range: 5.0,
            lost_range: 8.0,
            icon_duration: 1.0,
            stunnable: true,
            stun_duration: 0.4,
            shake_amount: 0.08,
            move_speed: 3.0,
            stopping_distance: 0.8,
            prepare_duration: 0.5,
            attack_duration: 0.5,
            min_recover_time: 0.7,
            max_recover_time: 1.2,
            attack_radius: 1.0,
            strike_offset: 0.0,
            attack_damage: 1,
        }
    }
}

impl AiProfile {
    /// Scale every distance (and speed) by `unit` world units per tile.
    pub fn scaled(mut self, unit: f32) -> Self {
        self.detection_range *= unit;
        self.lost_range *= unit;
        self.shake_amount *= unit;
        self.move_speed *= unit;
        self.stopping_distance *= unit;
        self.attack_radius *= unit;
        self.strike_offset *= unit;
        self
    }

    pub fn validate(self) -> Result<Self, ProfileError> {
        let non_negative = [
            ("detection_range", self.detection_range),
            ("icon_duration", self.icon_duration),
            ("stun_duration", self.stun_duration),
            ("shake_amount", self.shake_amount),
            ("move_speed", self.move_speed),
            ("stopping_distance", self.stopping_distance),
            ("prepare_duration", self.prepare_duration),
            ("attack_duration", self.attack_duration),
            ("min_recover_time", self.min_recover_time),
            ("attack_radius", self.attack_radius),
            ("strike_offset", self.strike_offset),
        ];
        if let Some((field, value)) = non_negative.into_iter().find(|(_, v)| *v < 0.0) {
            return Err(ProfileError::Negative { field, value });
        }
        if self.lost_range <= self.detection_range {
            return Err(ProfileError::NoHysteresis {
                detection: self.detection_range,
                lost: self.lost_range,
            });
        }
        if self.min_recover_time > self.max_recover_time {
            return Err(ProfileError::InvertedRecover {
                min: self.min_recover_time,
                max: self.max_recover_time,
            });
        }
        Ok(self)
    }
}

// -----------------------------------------------------------------------------
// State
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BehaviorState {
    Idle,
    Chasing,
    Preparing { elapsed: f32 },
    Attacking { elapsed: f32 },
    Recovering { elapsed: f32, duration: f32 },
    Stunned { elapsed: f32 },
}

/// `BehaviorState` without its timer payload, for reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Idle,
    Chasing,
    Preparing,
    Attacking,
    Recovering,
    Stunned,
}

impl BehaviorState {
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Idle => StateKind::Idle,
            Self::Chasing => StateKind::Chasing,
            Self::Preparing { .. } => StateKind::Preparing,
            Self::Attacking { .. } => StateKind::Attacking,
            Self::Recovering { .. } => StateKind::Recovering,
            Self::Stunned { .. } => StateKind::Stunned,
        }
    }
}

/// Icon shown above the enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Discovered,
    Lost,
}

/// Single-slot icon timer. Showing a new cue replaces the old one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CueTimer {
    shown: Option<(Cue, f32)>,
}

impl CueTimer {
    fn show(&mut self, cue: Cue, duration: f32) {
        self.shown = Some((cue, duration));
    }

    fn tick(&mut self, dt: f32) {
        if let Some((cue, left)) = self.shown {
            let left = left - dt;
            self.shown = (left > 0.0).then_some((cue, left));
        }
    }

    pub fn current(&self) -> Option<Cue> {
        self.shown.map(|(cue, _)| cue)
    }
}

/// Body sprite pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    Normal,
    Prepare,
    Attack,
    Damaged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Run the strike hit-test this step.
    pub strike: bool,
    pub transition: Option<(StateKind, StateKind)>,
}

// -----------------------------------------------------------------------------
// Machine
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone)]
pub struct CombatStateMachine {
    profile: AiProfile,
    state: BehaviorState,
    facing: Vec2,
    cue: CueTimer,
    body_offset: Vec2,
}

impl CombatStateMachine {
    pub fn new(profile: AiProfile) -> Self {
        Self {
            profile,
            state: BehaviorState::Idle,
            facing: Vec2::NEG_Y,
            cue: CueTimer::default(),
            body_offset: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn state(&self) -> BehaviorState {
        self.state
    }

    #[inline]
    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    #[inline]
    pub fn profile(&self) -> &AiProfile {
        &self.profile
    }

    #[inline]
    pub fn facing(&self) -> Vec2 {
        self.facing
    }

    #[inline]
    pub fn cue(&self) -> Option<Cue> {
        self.cue.current()
    }

    /// Stun shake applied to the body sprite. Zero outside `Stunned`.
    #[inline]
    pub fn body_offset(&self) -> Vec2 {
        self.body_offset
    }

    pub fn pose(&self) -> Pose {
        match self.state {
            BehaviorState::Preparing { .. } => Pose::Prepare,
            BehaviorState::Attacking { .. } => Pose::Attack,
            BehaviorState::Stunned { .. } => Pose::Damaged,
            _ => Pose::Normal,
        }
    }

    /// Centre of the strike circle for an agent standing at `agent_pos`.
    pub fn strike_center(&self, agent_pos: Vec2) -> Vec2 {
        agent_pos + self.facing * self.profile.strike_offset
    }

    /// Advance one simulation step.
    ///
    /// With no player in the world nothing happens, timers included.
    pub fn tick<N, R>(
        &mut self,
        dt: f32,
        player: Option<Vec2>,
        agent_pos: Vec2,
        nav: &mut N,
        rng: &mut R,
    ) -> TickReport
    where
        N: Navigation + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(player) = player else {
            return TickReport::default();
        };

        self.cue.tick(dt);

        let before = self.state.kind();
        let distance = agent_pos.distance(player);
        let mut strike = false;

        match self.state {
            BehaviorState::Idle => {
                nav.set_stopped(true);
                if distance <= self.profile.detection_range {
                    self.state = BehaviorState::Chasing;
                    self.cue.show(Cue::Discovered, self.profile.icon_duration);
                }
            }
            BehaviorState::Chasing => {
                nav.set_stopped(false);
                nav.set_destination(player);
                if let Some(dir) = (player - agent_pos).try_normalize() {
                    self.facing = dir;
                }

                if distance > self.profile.lost_range {
                    self.state = BehaviorState::Idle;
                    self.cue.show(Cue::Lost, self.profile.icon_duration);
                } else if nav.has_arrived() {
                    nav.set_stopped(true);
                    self.state = BehaviorState::Preparing { elapsed: 0.0 };
                }
            }
            BehaviorState::Preparing { elapsed } => {
                let elapsed = elapsed + dt;
                self.state = if elapsed >= self.profile.prepare_duration {
                    BehaviorState::Attacking { elapsed: 0.0 }
                } else {
                    BehaviorState::Preparing { elapsed }
                };
            }
            BehaviorState::Attacking { elapsed } => {
                strike = true;
                let elapsed = elapsed + dt;
                self.state = if elapsed >= self.profile.attack_duration {
                    let duration = self.recover_time(rng);
                    BehaviorState::Recovering { elapsed: 0.0, duration }
                } else {
                    BehaviorState::Attacking { elapsed }
                };
            }
            BehaviorState::Recovering { elapsed, duration } => {
                let elapsed = elapsed + dt;
                if elapsed >= duration {
                    nav.set_stopped(false);
                    self.state = BehaviorState::Chasing;
                } else {
                    self.state = BehaviorState::Recovering { elapsed, duration };
                }
            }
            BehaviorState::Stunned { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.profile.stun_duration {
                    self.body_offset = Vec2::ZERO;
                    if distance <= self.profile.lost_range {
                        nav.set_stopped(false);
                        self.state = BehaviorState::Chasing;
                    } else {
                        nav.set_stopped(true);
                        self.state = BehaviorState::Idle;
                    }
                } else {
                    let amp = self.profile.shake_amount;
                    self.body_offset =
                        Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)) * amp;
                    self.state = BehaviorState::Stunned { elapsed };
                }
            }
        }

        let after = self.state.kind();
        TickReport {
            strike,
            transition: (before != after).then_some((before, after)),
        }
    }

    /// The owning entity was hit.
    ///
    /// Stunnable agents drop whatever they were doing and start (or restart) a stun.
    /// Returns whether a stun started.
    pub fn notify_damaged<N: Navigation + ?Sized>(&mut self, nav: &mut N) -> bool {
        if !self.profile.stunnable {
            return false;
        }
        self.body_offset = Vec2::ZERO;
        self.state = BehaviorState::Stunned { elapsed: 0.0 };
        nav.set_stopped(true);
        true
    }

    fn recover_time<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let (lo, hi) = (self.profile.min_recover_time, self.profile.max_recover_time);
        if hi > lo { rng.gen_range(lo..=hi) } else { lo }
    }
}
