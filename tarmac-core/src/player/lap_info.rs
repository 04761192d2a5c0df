use serde::{Deserialize, Serialize};

pub type LapNumber = u8;
pub type CheckpointID = usize;
pub type Placement = u8;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LapInformation {
    // laps completed so far
    pub lap: LapNumber,
    pub next_checkpoint: CheckpointID,
    pub lap_times: Vec<f64>,
    // race clock readings, in simulated seconds
    pub lap_started_at: f64,
    pub last_progress_at: f64,
    // set once the car has done every lap; from then on it only drives for show
    pub locked: bool,
}

impl LapInformation {
    pub fn new() -> Self {
        LapInformation {
            lap: 0,
            next_checkpoint: 0,
            lap_times: Vec::new(),
            lap_started_at: 0.0,
            last_progress_at: 0.0,
            locked: false,
        }
    }

    pub fn best_lap(&self) -> Option<f64> {
        self.lap_times.iter().copied().reduce(f64::min)
    }
}

impl Default for LapInformation {
    fn default() -> Self {
        Self::new()
    }
}
