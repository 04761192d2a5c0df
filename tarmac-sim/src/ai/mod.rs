use std::f64::consts::PI;

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use tarmac_core::entity_location::{bearing, wrap_signed_angle};
use tarmac_core::player::choices::Difficulty;
use tarmac_core::player::control_intent::ControlIntent;
use tarmac_core::{CarID, SimError, SimSettings};

use crate::physics::car::Car;
use crate::track::Track;

use self::difficulty::DifficultyProfile;
use self::mistakes::{roll_for_mistake, ActiveMistake};

pub mod difficulty;
pub mod mistakes;
pub mod rubber_band;

// heading error (rad) we're happy to drive straight through
const STEERING_DEADZONE: f64 = 0.05;
// only stand on the brakes once we're this far over the target speed
const BRAKE_MARGIN: f64 = 1.15;

// One driver for one car. Holds the car's id rather than the car itself; the
// simulation owns every car and hands the whole field in on each update.
pub struct AiController {
    car: CarID,
    profile: DifficultyProfile,
    rng: StdRng,

    // time since the last real decision
    since_decision: f64,
    decided_once: bool,
    last_decision: ControlIntent,
    mistake: Option<ActiveMistake>,

    // set by the simulation each tick, in [-rubber_band_max, rubber_band_max]
    rubber_band: f64,
}

impl AiController {
    pub fn new(car: CarID, difficulty: Difficulty, seed: u64) -> AiController {
        AiController {
            car,
            profile: DifficultyProfile::for_difficulty(difficulty),
            // every driver gets its own stream so they don't make the same
            // mistakes at the same time
            rng: StdRng::seed_from_u64(seed.wrapping_add(car as u64)),
            since_decision: 0.0,
            decided_once: false,
            last_decision: ControlIntent::NEUTRAL,
            mistake: None,
            rubber_band: 0.0,
        }
    }

    pub fn car(&self) -> CarID {
        self.car
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn mistake(&self) -> Option<&ActiveMistake> {
        self.mistake.as_ref()
    }

    pub fn set_rubber_band(&mut self, factor: f64) {
        self.rubber_band = if factor.is_finite() { factor } else { 0.0 };
    }

    /* Called once per tick, before physics. Only makes a fresh decision once
     * the reaction delay has passed; in between it keeps feeding the last one,
     * bent by whatever mistake is in progress */
    pub fn update(
        &mut self,
        cars: &[Car],
        track: &Track,
        settings: &SimSettings,
        dt: f64,
    ) -> ControlIntent {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.since_decision += dt;

        if let Some(mistake) = self.mistake.as_mut() {
            if !mistake.tick(dt) {
                debug!("ai car {} recovered from {:?}", self.car, mistake.kind);
                self.mistake = None;
            }
        }

        if !self.decided_once || self.since_decision >= self.profile.reaction_delay {
            if self.mistake.is_none() {
                self.mistake = roll_for_mistake(
                    &mut self.rng,
                    self.profile.mistake_rate,
                    self.since_decision,
                    self.last_decision.steer_axis(),
                );
                if let Some(mistake) = &self.mistake {
                    debug!("ai car {} made a mistake: {:?}", self.car, mistake.kind);
                }
            }

            self.last_decision = match self.decide(cars, track, settings) {
                Ok(intent) => intent,
                Err(e) => {
                    warn!("ai car {} could not decide ({}); flooring it", self.car, e);
                    ControlIntent::FULL_THROTTLE
                }
            };
            self.since_decision = 0.0;
            self.decided_once = true;
        }

        match &self.mistake {
            Some(mistake) => mistake.distort(self.last_decision),
            None => self.last_decision,
        }
    }

    fn decide(
        &mut self,
        cars: &[Car],
        track: &Track,
        settings: &SimSettings,
    ) -> Result<ControlIntent, SimError> {
        let me = cars
            .get(self.car)
            .filter(|car| car.is_finite())
            .ok_or(SimError::CorruptedCarState { car: self.car })?;
        let position = me.position();

        // where the racing line wants us, and where it goes after that. Once
        // we're on the grass, sloppiness goes out the window and we head
        // straight back for the line
        let target_index = track.nearest_waypoint_index(position) + self.profile.look_ahead;
        let line_target = if me.off_track {
            track.waypoint(target_index)
        } else {
            self.jittered(track.waypoint(target_index))
        };
        let line_after = track.waypoint(track.waypoint_after(target_index));

        let target = self
            .avoidance_target(me, cars, track, settings)
            .unwrap_or(line_target);
        if !target.is_finite() {
            return Err(SimError::CorruptedCarState { car: self.car });
        }

        let heading_error = wrap_signed_angle(bearing(position, target) - me.pose.heading);
        let steer_left = heading_error < -STEERING_DEADZONE;
        let steer_right = heading_error > STEERING_DEADZONE;

        // ease off in proportion to how hard the line bends at the target
        let corner =
            wrap_signed_angle(bearing(line_target, line_after) - bearing(position, line_target))
                .abs();
        let sharpness = (corner / PI).clamp(0.0, 1.0);
        let target_speed = me.spec.max_speed
            * self.profile.speed_modifier
            * (1.0 + self.rubber_band)
            * (1.0 - sharpness * settings.ai_corner_slowdown);

        Ok(ControlIntent {
            accelerate: me.speed < target_speed,
            brake: me.speed > target_speed * BRAKE_MARGIN,
            steer_left,
            steer_right,
        })
    }

    fn jittered(&mut self, point: DVec2) -> DVec2 {
        let radius = self.profile.waypoint_jitter;
        if radius <= 0.0 {
            return point;
        }
        let angle = self.rng.gen_range(0.0..std::f64::consts::TAU);
        let distance = self.rng.gen_range(0.0..=radius);
        point + DVec2::new(angle.cos(), angle.sin()) * distance
    }

    // steer around the closest car that's near and roughly in front of us,
    // passing on whichever side of it is still road
    fn avoidance_target(
        &self,
        me: &Car,
        cars: &[Car],
        track: &Track,
        settings: &SimSettings,
    ) -> Option<DVec2> {
        let position = me.position();
        let (other, offset) = cars
            .iter()
            .filter(|other| other.id != me.id && other.is_finite())
            .filter_map(|other| {
                let distance = position.distance(other.position());
                if distance <= 0.0 || distance > settings.ai_avoidance_radius {
                    return None;
                }
                let offset =
                    wrap_signed_angle(bearing(position, other.position()) - me.pose.heading);
                if offset.abs() > settings.ai_avoidance_cone {
                    return None;
                }
                Some((other, offset, distance))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(other, offset, _)| (other, offset))?;

        // it's off to our right, so go past on its left, and vice versa
        let side = if offset >= 0.0 { -1.0 } else { 1.0 };
        let swerve = me.pose.right() * side * settings.ai_avoidance_offset;
        [other.position() + swerve, other.position() - swerve]
            .into_iter()
            .find(|point| track.is_point_drivable(point.x, point.y))
    }
}
