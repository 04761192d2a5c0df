use glam::DVec2;
use tracing::warn;

use tarmac_core::entity_location::CarPose;
use tarmac_core::player::choices::CarSpec;
use tarmac_core::player::control_intent::ControlIntent;
use tarmac_core::{SimError, SimSettings};

use crate::physics::car::Car;
use crate::physics::constants::{DECAY_REFERENCE_RATE, MAX_STEP_SECONDS, REST_SPEED};

pub mod bounding_box;
pub mod car;
pub mod collisions;
pub mod constants;
pub mod spatial_grid;

#[cfg(test)]
mod tests;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Committed,
    // the step produced a non-finite value and the car went back to its last
    // valid pose with speed and turn rate zeroed
    RolledBack,
}

// The handling a car actually gets this step. Off-track penalties are applied
// here fresh every step and never written back into the car's own spec.
pub fn effective_spec(spec: &CarSpec, off_track: bool, settings: &SimSettings) -> CarSpec {
    if !off_track {
        return *spec;
    }

    CarSpec {
        max_speed: spec.max_speed * settings.off_track_speed_factor,
        acceleration: spec.acceleration * settings.off_track_accel_factor,
        turn_speed: spec.turn_speed * settings.off_track_turn_factor,
        ..*spec
    }
}

// clamp whatever the host hands us into something we can integrate with
fn sanitize_time_step(time_step: f64) -> f64 {
    if time_step.is_finite() {
        time_step.clamp(0.0, MAX_STEP_SECONDS)
    } else {
        0.0
    }
}

impl Car {
    /* Advance this car by one step given its control intent. Never fails: a
     * step that produces a non-finite value is rolled back instead */
    pub fn do_physics_step(
        &mut self,
        intent: &ControlIntent,
        time_step: f64,
        settings: &SimSettings,
    ) -> StepOutcome {
        let dt = sanitize_time_step(time_step);

        // somebody outside the step already broke this car
        if !self.is_finite() {
            self.recover();
            return StepOutcome::RolledBack;
        }
        self.tick_start_position = self.pose.position;

        let effective = effective_spec(&self.spec, self.off_track, settings);
        let raw_speed = self.next_speed(intent, dt, &effective, settings);
        if !raw_speed.is_finite() {
            self.recover();
            return StepOutcome::RolledBack;
        }
        let speed = raw_speed.clamp(0.0, self.spec.max_speed);

        // turn rate eases toward what the wheel asks for rather than snapping
        let target_turn_rate = intent.steer_axis() * effective.turn_speed;
        let blend = (settings.turn_approach_rate * dt).min(1.0);
        let turn_rate = self.turn_rate + (target_turn_rate - self.turn_rate) * blend;

        // a stationary car doesn't rotate in place
        let grip = (speed / self.spec.max_speed).clamp(0.0, 1.0);
        let heading = self.pose.heading + turn_rate * grip * dt;
        let position = self.pose.position + DVec2::new(heading.cos(), heading.sin()) * speed * dt;

        if !(turn_rate.is_finite() && heading.is_finite() && position.is_finite()) {
            self.recover();
            return StepOutcome::RolledBack;
        }

        self.speed = speed;
        self.turn_rate = turn_rate;
        self.target_turn_rate = target_turn_rate;
        self.pose = CarPose::new(position, heading);
        self.last_valid_pose = self.pose;

        StepOutcome::Committed
    }

    fn next_speed(
        &self,
        intent: &ControlIntent,
        dt: f64,
        effective: &CarSpec,
        settings: &SimSettings,
    ) -> f64 {
        if intent.is_throttling() {
            // soft ceiling: pickup fades out as speed approaches the top end
            // (and turns into a drag once a penalty drops the top end below us)
            let ratio = self.speed / effective.max_speed;
            return self.speed + effective.acceleration * (1.0 - ratio * ratio) * dt;
        }

        // coasting keeps some momentum, braking bites harder; whichever of the
        // two losses is bigger wins
        let decay_loss =
            self.speed * (1.0 - settings.coast_decay_factor.powf(dt * DECAY_REFERENCE_RATE));
        let braking = if intent.brake {
            settings.brake_strength
        } else {
            1.0
        };
        let linear_loss = effective.deceleration * braking * dt;

        let next = self.speed - decay_loss.max(linear_loss);
        if next < REST_SPEED {
            0.0
        } else {
            next
        }
    }

    fn recover(&mut self) {
        let error = SimError::CorruptedCarState { car: self.id };
        warn!("{}; restoring last valid pose", error);
        self.roll_back();
        self.tick_start_position = self.pose.position;
    }
}
