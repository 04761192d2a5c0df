use tarmac_core::player::choices::Difficulty;

// Everything that makes one AI driver better than another. Times are in
// simulated seconds, distances in px.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DifficultyProfile {
    // fraction of the car's top speed the driver is willing to use
    pub speed_modifier: f64,
    // how long between fresh decisions; the last intent is held in between
    pub reaction_delay: f64,
    // radius of the random wobble applied to every waypoint target
    pub waypoint_jitter: f64,
    // expected mistakes per second of driving
    pub mistake_rate: f64,
    // how many waypoints past the nearest one to aim for
    pub look_ahead: usize,
}

impl DifficultyProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> DifficultyProfile {
        match difficulty {
            Difficulty::Easy => DifficultyProfile {
                speed_modifier: 0.75,
                reaction_delay: 0.25,
                waypoint_jitter: 30.0,
                mistake_rate: 0.15,
                look_ahead: 1,
            },
            Difficulty::Medium => DifficultyProfile {
                speed_modifier: 0.88,
                reaction_delay: 0.12,
                waypoint_jitter: 15.0,
                mistake_rate: 0.06,
                look_ahead: 1,
            },
            Difficulty::Hard => DifficultyProfile {
                speed_modifier: 1.0,
                reaction_delay: 0.05,
                waypoint_jitter: 5.0,
                mistake_rate: 0.02,
                look_ahead: 2,
            },
        }
    }
}

impl From<Difficulty> for DifficultyProfile {
    fn from(difficulty: Difficulty) -> Self {
        DifficultyProfile::for_difficulty(difficulty)
    }
}
