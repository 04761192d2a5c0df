use serde::{Deserialize, Serialize};

// Static handling numbers for a car. Speeds are in px/s, turn speed in rad/s,
// footprint in px.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarSpec {
    pub max_speed: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    pub turn_speed: f64,
    pub width: f64,
    pub height: f64,
}

impl CarSpec {
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarKind {
    Balanced,
    Speed,
    Handling,
}

impl CarKind {
    pub const ALL: [CarKind; 3] = [CarKind::Balanced, CarKind::Speed, CarKind::Handling];

    // cars are kept nearly square, the collision pass ignores rotation
    pub fn spec(self) -> CarSpec {
        match self {
            CarKind::Balanced => CarSpec {
                max_speed: 220.0,
                acceleration: 260.0,
                deceleration: 120.0,
                turn_speed: 3.0,
                width: 26.0,
                height: 28.0,
            },
            CarKind::Speed => CarSpec {
                max_speed: 260.0,
                acceleration: 220.0,
                deceleration: 100.0,
                turn_speed: 2.6,
                width: 24.0,
                height: 30.0,
            },
            CarKind::Handling => CarSpec {
                max_speed: 200.0,
                acceleration: 300.0,
                deceleration: 140.0,
                turn_speed: 3.6,
                width: 26.0,
                height: 26.0,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CarKind::Balanced => "Balanced",
            CarKind::Speed => "Speed",
            CarKind::Handling => "Handling",
        }
    }
}

impl Default for CarKind {
    fn default() -> Self {
        CarKind::Balanced
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Driver {
    Human,
    Ai(Difficulty),
}

// one car on the grid, as picked before the race
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    pub kind: CarKind,
    pub driver: Driver,
}

impl Entrant {
    pub fn human(kind: CarKind) -> Self {
        Entrant {
            kind,
            driver: Driver::Human,
        }
    }

    pub fn ai(kind: CarKind, difficulty: Difficulty) -> Self {
        Entrant {
            kind,
            driver: Driver::Ai(difficulty),
        }
    }
}
