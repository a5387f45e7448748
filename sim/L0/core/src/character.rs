//! Character bodies: kinematic move-and-slide with floor detection.
//!
//! [`CharacterBody::move_and_slide`] runs once per tick:
//!
//! ```text
//!   platform pre-pass ──► slide loop (≤ max_slides) ──► floor snap ──► hand-off
//!   (ride the floor        (sweep, classify, slide       (test-only      (keep platform
//!    body's velocity)       remainder & velocity)          sweep down)     momentum)
//! ```
//!
//! Every contact is classified against the up direction as floor, wall or
//! ceiling; floors and walls remember the body they belong to so moving
//! platforms can carry the character.

use body_server::PhysicsServer;
use body_types::{
    BodyError, BodyHandle, BodyMode, CharacterConfig, FLOOR_ANGLE_THRESHOLD, InstanceId,
    Isometry3, MotionResult, Result, Vector3, project, slide,
};
use hashbrown::HashSet;
use tracing::{debug, trace};

use crate::body::PhysicsBody;
use crate::collision::KinematicCollision;
use crate::notification::Notification;

/// Velocity direction this close to `-up` counts as standing still on a slope.
const STOP_ON_SLOPE_TOLERANCE: f64 = 0.01;

/// A kinematic body moved by [`CharacterBody::move_and_slide`].
///
/// The floor/wall/ceiling flags, the floor normal and the platform body
/// survive between calls; the collision list is rebuilt by every call.
#[derive(Debug)]
pub struct CharacterBody {
    body: PhysicsBody,
    config: CharacterConfig,
    linear_velocity: Vector3<f64>,
    on_floor: bool,
    on_wall: bool,
    on_ceiling: bool,
    floor_normal: Vector3<f64>,
    floor_velocity: Vector3<f64>,
    on_floor_body: Option<BodyHandle>,
    motion_results: Vec<MotionResult>,
}

impl CharacterBody {
    /// Create a kinematic character with the default configuration.
    pub fn new(server: &mut dyn PhysicsServer, instance: InstanceId) -> Self {
        Self {
            body: PhysicsBody::new(server, instance, BodyMode::Kinematic),
            config: CharacterConfig::default(),
            linear_velocity: Vector3::zeros(),
            on_floor: false,
            on_wall: false,
            on_ceiling: false,
            floor_normal: Vector3::zeros(),
            floor_velocity: Vector3::zeros(),
            on_floor_body: None,
            motion_results: Vec::new(),
        }
    }

    /// Create a character with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`CharacterConfig::validate`] failure; no server
    /// body is created in that case.
    pub fn with_config(
        server: &mut dyn PhysicsServer,
        instance: InstanceId,
        config: CharacterConfig,
    ) -> Result<Self> {
        config.validate()?;
        let mut character = Self::new(server, instance);
        character.config = config;
        Ok(character)
    }

    /// Release the server body.
    pub fn free(self, server: &mut dyn PhysicsServer) {
        self.body.free(server);
    }

    /// Shared body state.
    #[must_use]
    pub fn body(&self) -> &PhysicsBody {
        &self.body
    }

    /// Mutable shared body state.
    pub fn body_mut(&mut self) -> &mut PhysicsBody {
        &mut self.body
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    /// Global transform.
    #[must_use]
    pub fn global_transform(&self) -> Isometry3<f64> {
        self.body.global_transform()
    }

    /// Move the character.
    pub fn set_global_transform(&mut self, server: &mut dyn PhysicsServer, transform: Isometry3<f64>) {
        self.body.set_global_transform(server, transform);
    }

    /// Handle a lifecycle notification. Entering the tree forgets every
    /// contact from a previous life.
    pub fn notification(&mut self, what: Notification) {
        match what {
            Notification::EnterTree => {
                self.body.set_inside_tree(true);
                self.on_floor = false;
                self.on_floor_body = None;
                self.on_ceiling = false;
                self.on_wall = false;
                self.motion_results.clear();
                self.floor_velocity = Vector3::zeros();
            }
            Notification::ExitTree => self.body.set_inside_tree(false),
            Notification::LocalTransformChanged | Notification::InternalPhysicsProcess { .. } => {}
        }
    }

    // ========================================================================
    // Move and slide
    // ========================================================================

    /// Move by `linear_velocity * delta`, sliding along whatever is hit.
    ///
    /// Updates the floor/wall/ceiling state and the slide collision list, and
    /// rewrites the velocity to what survived the slides. Returns whether any
    /// collision was recorded.
    pub fn move_and_slide(&mut self, server: &mut dyn PhysicsServer, delta: f64) -> bool {
        let body_velocity_normal = self
            .linear_velocity
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros);
        let was_on_floor = self.on_floor;
        let previous_floor_body = self.on_floor_body;
        let margin = self.config.margin;
        let up = self.config.up_direction;

        self.linear_velocity = self.body.locked_axes().zero_locked_linear(self.linear_velocity);

        let mut current_floor_velocity = self.floor_velocity;
        if self.on_floor || self.on_wall {
            if let Some(state) = previous_floor_body.and_then(|p| server.body_get_direct_state(p)) {
                let local = self.body.global_transform().translation.vector
                    - state.transform.translation.vector;
                current_floor_velocity = state.velocity_at_local_position(&local);
            }
        }

        self.motion_results.clear();
        self.on_floor = false;
        self.on_ceiling = false;
        self.on_wall = false;
        self.floor_normal = Vector3::zeros();
        self.floor_velocity = Vector3::zeros();

        let mut platform_exclude = HashSet::new();
        if let Some(platform) = previous_floor_body {
            platform_exclude.insert(platform);
            if current_floor_velocity != Vector3::zeros() {
                if let Some(result) = self.body.move_and_collide(
                    server,
                    current_floor_velocity * delta,
                    margin,
                    false,
                    false,
                    &platform_exclude,
                ) {
                    self.set_collision_direction(&result);
                    self.motion_results.push(result);
                }
            }
        }

        self.on_floor_body = None;
        let mut motion = self.linear_velocity * delta;

        // The first sweep keeps its direction when stopping on slopes so a
        // standing character is not carried down the incline.
        let mut sliding_enabled = !self.config.floor_stop_on_slope;
        let no_exclude = HashSet::new();

        for iteration in 0..self.config.max_slides {
            let Some(result) =
                self.body
                    .move_and_collide(server, motion, margin, false, !sliding_enabled, &no_exclude)
            else {
                break;
            };

            self.set_collision_direction(&result);
            trace!(
                rid = %self.body.rid(),
                iteration,
                normal = ?result.collision_normal,
                on_floor = self.on_floor,
                on_wall = self.on_wall,
                on_ceiling = self.on_ceiling,
                "slide collision"
            );

            if self.on_floor
                && self.config.floor_stop_on_slope
                && (body_velocity_normal + up).norm() < STOP_ON_SLOPE_TOLERANCE
            {
                let mut gt = self.body.global_transform();
                if result.travel.norm() > margin {
                    gt.translation.vector -= slide(&result.travel, &up);
                } else {
                    gt.translation.vector -= result.travel;
                }
                self.motion_results.push(result);
                self.body.set_global_transform(server, gt);
                self.linear_velocity = Vector3::zeros();
                return true;
            }

            if sliding_enabled || !self.on_floor {
                let normal = result.collision_normal;
                motion = slide(&result.remainder, &normal);
                self.linear_velocity = self
                    .body
                    .locked_axes()
                    .zero_locked_linear(slide(&self.linear_velocity, &normal));
            } else {
                motion = result.remainder;
            }
            self.motion_results.push(result);

            sliding_enabled = true;
            if motion == Vector3::zeros() {
                break;
            }
        }

        if was_on_floor && previous_floor_body.is_some() && self.config.snap != Vector3::zeros() {
            self.apply_snap(server, &platform_exclude);
        }

        if !self.on_floor && !self.on_wall {
            // Just left a moving platform: keep its momentum.
            self.linear_velocity += current_floor_velocity;
        }

        !self.motion_results.is_empty()
    }

    /// Pull the character back onto a floor along the snap vector.
    fn apply_snap(&mut self, server: &mut dyn PhysicsServer, exclude: &HashSet<BodyHandle>) {
        let margin = self.config.margin;
        let up = self.config.up_direction;
        let Some(mut result) =
            self.body
                .move_and_collide(server, self.config.snap, margin, true, false, exclude)
        else {
            return;
        };

        if up != Vector3::zeros() {
            if result.angle(&up) > self.config.floor_max_angle + FLOOR_ANGLE_THRESHOLD {
                trace!(rid = %self.body.rid(), "snap hit a non-floor surface; discarded");
                return;
            }
            self.on_floor = true;
            self.floor_normal = result.collision_normal;
            self.on_floor_body = result.collider;
            self.floor_velocity = result.collider_velocity;
            if self.config.floor_stop_on_slope {
                // Penetration recovery may push sideways; keep only the part
                // along up.
                result.travel = if result.travel.norm() > margin {
                    project(&result.travel, &up)
                } else {
                    Vector3::zeros()
                };
            }
        }

        let mut gt = self.body.global_transform();
        gt.translation.vector += result.travel;
        self.body.set_global_transform(server, gt);
        trace!(rid = %self.body.rid(), travel = ?result.travel, "snapped to floor");
    }

    /// Classify one contact as floor, wall or ceiling.
    fn set_collision_direction(&mut self, result: &MotionResult) {
        let up = self.config.up_direction;
        if up == Vector3::zeros() {
            self.on_wall = true;
            return;
        }
        let limit = self.config.floor_max_angle + FLOOR_ANGLE_THRESHOLD;
        if result.angle(&up) <= limit {
            self.on_floor = true;
            self.floor_normal = result.collision_normal;
            self.on_floor_body = result.collider;
            self.floor_velocity = result.collider_velocity;
        } else if result.angle(&-up) <= limit {
            self.on_ceiling = true;
        } else {
            self.on_wall = true;
            self.on_floor_body = result.collider;
            self.floor_velocity = result.collider_velocity;
        }
    }

    // ========================================================================
    // Contact state
    // ========================================================================

    /// Velocity used by the next [`move_and_slide`](Self::move_and_slide).
    #[must_use]
    pub fn linear_velocity(&self) -> Vector3<f64> {
        self.linear_velocity
    }

    /// Set the velocity.
    pub fn set_linear_velocity(&mut self, velocity: Vector3<f64>) {
        self.linear_velocity = velocity;
    }

    /// Touching a floor after the last call.
    #[must_use]
    pub fn is_on_floor(&self) -> bool {
        self.on_floor
    }

    /// Touching only a floor.
    #[must_use]
    pub fn is_on_floor_only(&self) -> bool {
        self.on_floor && !self.on_wall && !self.on_ceiling
    }

    /// Touching a wall after the last call.
    #[must_use]
    pub fn is_on_wall(&self) -> bool {
        self.on_wall
    }

    /// Touching only a wall.
    #[must_use]
    pub fn is_on_wall_only(&self) -> bool {
        self.on_wall && !self.on_floor && !self.on_ceiling
    }

    /// Touching a ceiling after the last call.
    #[must_use]
    pub fn is_on_ceiling(&self) -> bool {
        self.on_ceiling
    }

    /// Touching only a ceiling.
    #[must_use]
    pub fn is_on_ceiling_only(&self) -> bool {
        self.on_ceiling && !self.on_floor && !self.on_wall
    }

    /// Normal of the last floor contact, zero when not on a floor.
    #[must_use]
    pub fn floor_normal(&self) -> Vector3<f64> {
        self.floor_normal
    }

    /// Angle in radians between the floor normal and `up`.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::ZeroUpDirection`] if `up` is zero.
    pub fn floor_angle(&self, up: &Vector3<f64>) -> Result<f64> {
        if *up == Vector3::zeros() {
            return Err(BodyError::ZeroUpDirection);
        }
        Ok(self.floor_normal.dot(up).clamp(-1.0, 1.0).acos())
    }

    /// Velocity of the floor or wall body the character rests against.
    #[must_use]
    pub fn platform_velocity(&self) -> Vector3<f64> {
        self.floor_velocity
    }

    /// Body the character rests on or against, if any.
    #[must_use]
    pub fn platform_body(&self) -> Option<BodyHandle> {
        self.on_floor_body
    }

    /// Number of collisions recorded by the last call.
    #[must_use]
    pub fn slide_collision_count(&self) -> usize {
        self.motion_results.len()
    }

    /// Raw collision `index` of the last call.
    #[must_use]
    pub fn slide_collision(&self, index: usize) -> Option<&MotionResult> {
        self.motion_results.get(index)
    }

    /// Collision `index` of the last call as a [`KinematicCollision`].
    #[must_use]
    pub fn slide_kinematic_collision(&self, index: usize) -> Option<KinematicCollision> {
        self.motion_results
            .get(index)
            .map(|result| self.body.collision_report(result.clone()))
    }

    /// Last collision of the last call.
    #[must_use]
    pub fn last_slide_collision(&self) -> Option<KinematicCollision> {
        self.slide_kinematic_collision(self.motion_results.len().checked_sub(1)?)
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Set the skin margin.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::InvalidConfig`] for a negative or non-finite
    /// margin; the configuration is left unchanged.
    pub fn set_safe_margin(&mut self, margin: f64) -> Result<()> {
        CharacterConfig::check_margin(margin)?;
        self.config.margin = margin;
        Ok(())
    }

    /// Set the up direction; it is normalized, zero stays zero.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::InvalidConfig`] if a component is not finite.
    pub fn set_up_direction(&mut self, up: Vector3<f64>) -> Result<()> {
        CharacterConfig::check_finite("up_direction", &up)?;
        self.config.up_direction = up.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        Ok(())
    }

    /// Set the steepest floor angle in radians.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::InvalidConfig`] outside `[0, pi]`, NaN included.
    pub fn set_floor_max_angle(&mut self, radians: f64) -> Result<()> {
        CharacterConfig::check_floor_max_angle(radians)?;
        self.config.floor_max_angle = radians;
        Ok(())
    }

    /// Enable or disable stop-on-slope.
    pub fn set_floor_stop_on_slope(&mut self, enabled: bool) {
        self.config.floor_stop_on_slope = enabled;
    }

    /// Set the snap vector; zero disables snapping.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::InvalidConfig`] if a component is not finite.
    pub fn set_snap(&mut self, snap: Vector3<f64>) -> Result<()> {
        CharacterConfig::check_finite("snap", &snap)?;
        self.config.snap = snap;
        Ok(())
    }

    /// Set the slide iteration limit.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::InvalidMaxSlides`] for zero.
    pub fn set_max_slides(&mut self, max_slides: usize) -> Result<()> {
        if max_slides == 0 {
            return Err(BodyError::InvalidMaxSlides(max_slides));
        }
        debug!(rid = %self.body.rid(), max_slides, "max slides changed");
        self.config.max_slides = max_slides;
        Ok(())
    }
}
