use serde::{Deserialize, Serialize};

use crate::error::SimError;

// ControlIntent is what a human input adapter or an AI controller hands the
// simulation for one car, once per tick. Missing fields deserialize as false.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlIntent {
    pub accelerate: bool,
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
}

const ACCELERATE_BIT: u8 = 0b0001;
const BRAKE_BIT: u8 = 0b0010;
const STEER_LEFT_BIT: u8 = 0b0100;
const STEER_RIGHT_BIT: u8 = 0b1000;

impl ControlIntent {
    pub const NEUTRAL: ControlIntent = ControlIntent {
        accelerate: false,
        brake: false,
        steer_left: false,
        steer_right: false,
    };

    // what an AI falls back to when it can't make up its mind
    pub const FULL_THROTTLE: ControlIntent = ControlIntent {
        accelerate: true,
        brake: false,
        steer_left: false,
        steer_right: false,
    };

    /// Decodes the 4-bit mask input adapters send over the wire.
    pub fn from_bits(bits: u8) -> Result<ControlIntent, SimError> {
        if bits & !0b1111 != 0 {
            return Err(SimError::InvalidControlIntent(bits));
        }

        Ok(ControlIntent {
            accelerate: bits & ACCELERATE_BIT != 0,
            brake: bits & BRAKE_BIT != 0,
            steer_left: bits & STEER_LEFT_BIT != 0,
            steer_right: bits & STEER_RIGHT_BIT != 0,
        })
    }

    pub fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.accelerate {
            bits |= ACCELERATE_BIT;
        }
        if self.brake {
            bits |= BRAKE_BIT;
        }
        if self.steer_left {
            bits |= STEER_LEFT_BIT;
        }
        if self.steer_right {
            bits |= STEER_RIGHT_BIT;
        }
        bits
    }

    // -1 for left, 1 for right; holding both cancels out
    pub fn steer_axis(&self) -> f64 {
        match (self.steer_left, self.steer_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn is_throttling(&self) -> bool {
        self.accelerate && !self.brake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_each_bit() {
        let intent = ControlIntent::from_bits(0b1001).unwrap();
        assert!(intent.accelerate);
        assert!(!intent.brake);
        assert!(!intent.steer_left);
        assert!(intent.steer_right);
        assert_eq!(intent.to_bits(), 0b1001);
    }

    #[test]
    fn unknown_bits_are_rejected() {
        assert!(matches!(
            ControlIntent::from_bits(0b1_0001),
            Err(SimError::InvalidControlIntent(0b1_0001))
        ));
        assert!(matches!(
            ControlIntent::from_bits(0xff),
            Err(SimError::InvalidControlIntent(0xff))
        ));
    }

    #[test]
    fn opposite_steering_cancels() {
        let intent = ControlIntent {
            steer_left: true,
            steer_right: true,
            ..ControlIntent::NEUTRAL
        };
        assert_eq!(intent.steer_axis(), 0.0);
    }

    #[test]
    fn missing_json_fields_default_to_false() {
        let intent: ControlIntent = serde_json::from_str(r#"{"accelerate": true}"#).unwrap();
        assert_eq!(intent, ControlIntent::FULL_THROTTLE);
    }
}
