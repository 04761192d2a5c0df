use rand::Rng;

use tarmac_core::player::control_intent::ControlIntent;

// how long a mistake keeps distorting the driver's inputs, in seconds
pub const MISTAKE_DURATION: f64 = 0.6;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MistakeKind {
    // misses the braking point and carries too much speed into the corner
    LateBraking,
    // stops turning in and runs wide
    WideTurn,
    // keeps the wheel turned after the car is already pointing the right way
    Overcorrection,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ActiveMistake {
    pub kind: MistakeKind,
    pub remaining: f64,
    // steer axis the driver was holding when it slipped up, -1 left to 1 right
    pub held_steer: f64,
}

impl ActiveMistake {
    pub fn new(kind: MistakeKind, held_steer: f64) -> ActiveMistake {
        ActiveMistake {
            kind,
            remaining: MISTAKE_DURATION,
            held_steer,
        }
    }

    // counts the mistake down; false once it has run its course
    pub fn tick(&mut self, dt: f64) -> bool {
        self.remaining -= dt;
        self.remaining > 0.0
    }

    pub fn distort(&self, intent: ControlIntent) -> ControlIntent {
        match self.kind {
            MistakeKind::LateBraking => ControlIntent {
                brake: false,
                ..intent
            },
            MistakeKind::WideTurn => ControlIntent {
                steer_left: false,
                steer_right: false,
                ..intent
            },
            // a fresh turn-in still goes through, it's only the straightening
            // up that gets missed
            MistakeKind::Overcorrection if intent.steer_axis() == 0.0 => ControlIntent {
                steer_left: self.held_steer < 0.0,
                steer_right: self.held_steer > 0.0,
                ..intent
            },
            MistakeKind::Overcorrection => intent,
        }
    }
}

/* The longer a driver goes between decisions the more chances it had to mess
 * up, so the odds scale with the time since the last roll */
pub fn roll_for_mistake<R: Rng>(
    rng: &mut R,
    rate: f64,
    elapsed: f64,
    held_steer: f64,
) -> Option<ActiveMistake> {
    let probability = (rate * elapsed).clamp(0.0, 1.0);
    if !probability.is_finite() || !rng.gen_bool(probability) {
        return None;
    }

    let kind = match rng.gen_range(0..3) {
        0 => MistakeKind::LateBraking,
        1 => MistakeKind::WideTurn,
        _ => MistakeKind::Overcorrection,
    };
    Some(ActiveMistake::new(kind, held_steer))
}
