//! Damage flash: a restartable, single-slot colour pulse.
//!
//! `DamageFlash` is presentation-only state. Health observers call [`DamageFlash::trigger`];
//! `update_damage_flashes` advances the timer and is the only writer of the sprite colour
//! while a pulse is running or reverting.

use bevy::prelude::*;

use crate::common::tunables::{Seconds, VisualSettings};

/// Result of advancing a flash by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashTick {
    /// Nothing running, sprite untouched.
    Idle,
    /// Pulse running, sprite should show the flash colour.
    Active,
    /// Pulse just ended (or was cancelled), sprite should go back to the baseline.
    Reverted,
}

#[derive(Component, Debug, Clone)]
pub struct DamageFlash {
    /// Captured once at construction, never re-read from the sprite.
    baseline: Color,
    flash_color: Color,
    duration: Seconds,
    remaining: Option<f32>,
    enabled: bool,
    revert_pending: bool,
}

impl DamageFlash {
    pub fn new(baseline: Color, settings: &VisualSettings) -> Self {
        Self {
            baseline,
            flash_color: settings.flash_color,
            duration: settings.flash_duration,
            remaining: None,
            enabled: true,
            revert_pending: false,
        }
    }

    pub fn with_flash(mut self, color: Color, duration: Seconds) -> Self {
        self.flash_color = color;
        self.duration = duration;
        self
    }

    /// Start the pulse, or restart it from the full duration if it is already running.
    ///
    /// Returns `false` when the flash is disabled.
    pub fn trigger(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.remaining = Some(self.duration.get());
        self.revert_pending = false;
        true
    }

    /// Disabling cancels a running pulse; the next tick reverts the sprite.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled && self.remaining.take().is_some() {
            self.revert_pending = true;
        }
    }

    pub fn tick(&mut self, dt: f32) -> FlashTick {
        if self.revert_pending {
            self.revert_pending = false;
            return FlashTick::Reverted;
        }

        let Some(remaining) = self.remaining else {
            return FlashTick::Idle;
        };

        let left = remaining - dt;
        if left <= 0.0 {
            self.remaining = None;
            FlashTick::Reverted
        } else {
            self.remaining = Some(left);
            FlashTick::Active
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining.is_some()
    }

    /// Colour the sprite should currently show.
    #[inline]
    pub fn color(&self) -> Color {
        if self.is_active() { self.flash_color } else { self.baseline }
    }
}

/// Advance every flash and push its colour to the sprite it decorates.
///
/// Flashes without a sprite still tick, so their timers stay honest.
pub fn update_damage_flashes(
    time: Res<Time<Fixed>>,
    mut q: Query<(&mut DamageFlash, Option<&mut Sprite>)>,
) {
    let dt = time.delta_secs();

    for (mut flash, sprite) in &mut q {
        let tick = flash.tick(dt);
        if tick == FlashTick::Idle {
            continue;
        }
        if let Some(mut sprite) = sprite {
            sprite.color = flash.color();
        }
    }
}
