use std::f64::consts::{PI, TAU};

use glam::DVec2;
use serde::{Deserialize, Serialize};

// CarPose gets handed to the renderer every frame and is also what we roll
// back to when a physics step produces garbage
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarPose {
    pub position: DVec2,
    pub heading: f64, // radians, kept in [0, 2pi)
}

impl CarPose {
    pub fn new(position: DVec2, heading: f64) -> Self {
        CarPose {
            position,
            heading: normalize_heading(heading),
        }
    }

    pub fn forward(&self) -> DVec2 {
        DVec2::new(self.heading.cos(), self.heading.sin())
    }

    // points to the car's right-hand side in screen space (y down)
    pub fn right(&self) -> DVec2 {
        DVec2::new(-self.heading.sin(), self.heading.cos())
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.heading.is_finite()
    }
}

/// Wraps any finite angle into [0, 2pi).
pub fn normalize_heading(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wraps an angle difference into [-pi, pi].
pub fn wrap_signed_angle(angle: f64) -> f64 {
    let wrapped = normalize_heading(angle + PI) - PI;
    if wrapped < -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

pub fn bearing(from: DVec2, to: DVec2) -> f64 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}
