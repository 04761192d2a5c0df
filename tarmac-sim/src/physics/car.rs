use glam::DVec2;

use tarmac_core::entity_location::CarPose;
use tarmac_core::player::choices::CarSpec;
use tarmac_core::player::lap_info::LapInformation;
use tarmac_core::CarID;

use crate::physics::bounding_box::BoundingBox;

pub struct Car {
    pub id: CarID,
    pub spec: CarSpec,

    pub pose: CarPose,
    pub speed: f64,
    pub turn_rate: f64, // rad/s, eases toward target_turn_rate
    pub target_turn_rate: f64,

    // pose at the start of the current tick; the race director uses the
    // segment from here to `pose` to detect checkpoint crossings
    pub tick_start_position: DVec2,
    // last pose that passed validation, restored on corruption
    pub last_valid_pose: CarPose,

    // refreshed by the collision engine at the end of every tick
    pub off_track: bool,

    pub lap_info: LapInformation,
}

impl Car {
    pub fn new(id: CarID, spec: CarSpec, pose: CarPose) -> Car {
        Car {
            id,
            spec,
            pose,
            speed: 0.0,
            turn_rate: 0.0,
            target_turn_rate: 0.0,
            tick_start_position: pose.position,
            last_valid_pose: pose,
            off_track: false,
            lap_info: LapInformation::new(),
        }
    }

    pub fn position(&self) -> DVec2 {
        self.pose.position
    }

    // rotation is deliberately ignored for car-vs-car checks
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::around(
            self.pose.position,
            DVec2::new(self.spec.half_width(), self.spec.half_height()),
        )
    }

    // center-to-center distance at which two cars stop overlapping
    pub fn min_separation(&self, other: &Car) -> f64 {
        f64::max(
            self.spec.half_width() + other.spec.half_width(),
            self.spec.half_height() + other.spec.half_height(),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.pose.is_finite()
            && self.speed.is_finite()
            && self.turn_rate.is_finite()
            && self.target_turn_rate.is_finite()
    }

    // put the car back where it last made sense and stop it dead
    pub(crate) fn roll_back(&mut self) {
        self.pose = self.last_valid_pose;
        self.speed = 0.0;
        self.turn_rate = 0.0;
        self.target_turn_rate = 0.0;
    }
}
