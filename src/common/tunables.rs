//! Tunable gameplay constants.
//!
//! Gameplay distances are authored in tiles and converted to world pixels with
//! `Tunables::tile_size`. Nothing here is parsed from disk.

use bevy::prelude::*;

/// Newtype for durations in seconds.
///
/// Clamped to be non-negative on construction so timers never run backwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Seconds(f32);

impl Seconds {
    #[inline]
    pub fn new(v: f32) -> Self {
        Self(v.max(0.0))
    }
    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }
}

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    /// World pixels per grid cell. Also the unit AI profiles are authored in.
    pub tile_size: f32,
    pub player_speed: f32,
    pub drill_speed: f32,
    pub drill_radius: f32,
    pub drill_damage: i32,
    pub drill_interval: Seconds,
    pub player_max_hp: i32,
    pub player_iframes: Seconds,
}

impl Tunables {
    /// Convert a distance authored in tiles to world pixels.
    #[inline]
    pub fn tiles(&self, v: f32) -> f32 {
        v * self.tile_size
    }
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            tile_size: 32.0,
            player_speed: 160.0,
            drill_speed: 256.0,
            drill_radius: 12.8,
            drill_damage: 1,
            drill_interval: Seconds::new(0.2),
            player_max_hp: 3,
            player_iframes: Seconds::new(0.15),
        }
    }
}

/// Shared look of damage feedback.
#[derive(Resource, Debug, Clone)]
pub struct VisualSettings {
    pub flash_color: Color,
    pub flash_duration: Seconds,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            flash_color: Color::srgb(1.0, 0.0, 0.0),
            flash_duration: Seconds::new(0.1),
        }
    }
}
