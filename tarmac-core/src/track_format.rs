use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::player::lap_info::CheckpointID;

// Surface codes as authored in track files:
//   0 = grass, 1-6 = road pieces (straights and corners),
//   7 = start/finish, 8 = checkpoint marker
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceType {
    Grass,
    Road(u8),
    StartFinish,
    Checkpoint,
}

impl SurfaceType {
    pub fn from_code(code: u8) -> Option<SurfaceType> {
        match code {
            0 => Some(SurfaceType::Grass),
            1..=6 => Some(SurfaceType::Road(code)),
            7 => Some(SurfaceType::StartFinish),
            8 => Some(SurfaceType::Checkpoint),
            _ => None,
        }
    }

    pub fn is_drivable(&self) -> bool {
        !matches!(self, SurfaceType::Grass)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckpointLine {
    pub index: CheckpointID,
    pub start: DVec2,
    pub end: DVec2,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct StartSlot {
    pub position: DVec2,
    pub heading: f64,
}

// The on-disk shape of a track, authored offline. Nothing here is validated;
// the simulation does that when it builds its runtime track.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackFile {
    pub name: String,
    pub cell_size: f64,
    pub grid: Vec<Vec<u8>>,
    pub checkpoints: Vec<CheckpointLine>,
    pub waypoints: Vec<DVec2>,
    pub start_slots: Vec<StartSlot>,
}

impl TrackFile {
    pub fn from_json(json: &str) -> Result<TrackFile, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read(path: &str) -> Result<TrackFile, SimError> {
        let contents = std::fs::read_to_string(path)?;
        TrackFile::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_codes_cover_the_authoring_range() {
        assert_eq!(SurfaceType::from_code(0), Some(SurfaceType::Grass));
        assert_eq!(SurfaceType::from_code(4), Some(SurfaceType::Road(4)));
        assert_eq!(SurfaceType::from_code(7), Some(SurfaceType::StartFinish));
        assert_eq!(SurfaceType::from_code(8), Some(SurfaceType::Checkpoint));
        assert_eq!(SurfaceType::from_code(9), None);
        assert!(!SurfaceType::Grass.is_drivable());
        assert!(SurfaceType::Checkpoint.is_drivable());
    }

    #[test]
    fn parses_points_as_pairs() {
        let json = r#"{
            "name": "tiny",
            "cell_size": 10.0,
            "grid": [[7, 1], [1, 1]],
            "checkpoints": [{"index": 0, "start": [0.0, 0.0], "end": [0.0, 10.0]}],
            "waypoints": [[1.0, 1.0], [15.0, 1.0], [15.0, 15.0]],
            "start_slots": [{"position": [5.0, 5.0], "heading": 0.0}]
        }"#;
        let file = TrackFile::from_json(json).unwrap();
        assert_eq!(file.grid.len(), 2);
        assert_eq!(file.waypoints[1], DVec2::new(15.0, 1.0));
        assert_eq!(file.checkpoints[0].end, DVec2::new(0.0, 10.0));
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(
            TrackFile::from_json("{ not json"),
            Err(SimError::Json(_))
        ));
    }
}
