//! Configuration for character movement.
//!
//! [`CharacterConfig`] holds the knobs that shape `move_and_slide`: the skin
//! margin, what counts as "up", how steep a floor may be, and how many slide
//! iterations a single call may take.

use nalgebra::Vector3;

use crate::Result;
use crate::error::BodyError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Move-and-slide tuning for a character body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CharacterConfig {
    /// Skin distance kept between the character and other shapes.
    pub margin: f64,
    /// Direction considered "up". Zero turns every contact into a wall.
    pub up_direction: Vector3<f64>,
    /// Steepest slope (radians) still classified as floor.
    pub floor_max_angle: f64,
    /// Do not slide down slopes when standing still.
    pub floor_stop_on_slope: bool,
    /// Maximum sweep iterations per call.
    pub max_slides: usize,
    /// Vector along which the character is pulled back onto the floor.
    pub snap: Vector3<f64>,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            margin: 0.001,
            up_direction: Vector3::y(),
            floor_max_angle: std::f64::consts::FRAC_PI_4, // 45 degrees
            floor_stop_on_slope: false,
            max_slides: 4,
            snap: Vector3::zeros(),
        }
    }
}

impl CharacterConfig {
    /// Configuration for a character without a floor: everything is a wall.
    #[must_use]
    pub fn top_down() -> Self {
        Self {
            up_direction: Vector3::zeros(),
            ..Default::default()
        }
    }

    /// Set the up direction (normalized, zero stays zero).
    #[must_use]
    pub fn up_direction(mut self, up: Vector3<f64>) -> Self {
        self.up_direction = up.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        self
    }

    /// Set the floor angle limit in radians.
    #[must_use]
    pub fn floor_max_angle(mut self, radians: f64) -> Self {
        self.floor_max_angle = radians;
        self
    }

    /// Enable stop-on-slope.
    #[must_use]
    pub fn stop_on_slope(mut self) -> Self {
        self.floor_stop_on_slope = true;
        self
    }

    /// Set the slide iteration limit.
    #[must_use]
    pub fn max_slides(mut self, max_slides: usize) -> Self {
        self.max_slides = max_slides;
        self
    }

    /// Set the snap vector.
    #[must_use]
    pub fn snap(mut self, snap: Vector3<f64>) -> Self {
        self.snap = snap;
        self
    }

    /// Set the safe margin.
    #[must_use]
    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_slides == 0 {
            return Err(BodyError::InvalidMaxSlides(self.max_slides));
        }
        Self::check_margin(self.margin)?;
        Self::check_floor_max_angle(self.floor_max_angle)?;
        Self::check_finite("up_direction", &self.up_direction)?;
        Self::check_finite("snap", &self.snap)
    }

    /// Check a skin margin: finite and non-negative.
    pub fn check_margin(margin: f64) -> Result<()> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(BodyError::invalid_config(format!(
                "margin must be non-negative and finite, got {margin}"
            )));
        }
        Ok(())
    }

    /// Check a floor angle: within `[0, pi]` radians.
    pub fn check_floor_max_angle(radians: f64) -> Result<()> {
        if !(0.0..=std::f64::consts::PI).contains(&radians) {
            return Err(BodyError::invalid_config(format!(
                "floor_max_angle must be in [0, pi], got {radians}"
            )));
        }
        Ok(())
    }

    /// Check that every component of `v` is finite.
    pub fn check_finite(what: &'static str, v: &Vector3<f64>) -> Result<()> {
        if !v.iter().all(|c| c.is_finite()) {
            return Err(BodyError::invalid_config(format!("{what} must be finite, got {v:?}")));
        }
        Ok(())
    }
}
