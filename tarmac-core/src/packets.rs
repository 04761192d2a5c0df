use std::io::{Read, Write};

use bincode::{DefaultOptions, Options, Result};
use glam::DVec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::player::lap_info::{CheckpointID, LapNumber, Placement};
use crate::CarID;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseTag {
    Loading,
    Countdown,
    Racing,
    Finished,
}

// everything the renderer/HUD needs to draw one car
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarSnapshot {
    pub id: CarID,
    pub position: DVec2,
    pub heading: f64,
    pub speed: f64,
    pub lap: LapNumber,
    pub next_checkpoint: CheckpointID,
    pub placement: Placement,
    pub off_track: bool,
    pub finished: bool,
    pub dnf: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub phase: PhaseTag,
    pub countdown_remaining: f64,
    pub elapsed: f64,
    // fraction of a fixed step left over after the last tick, for smoothing
    pub interpolation: f64,
    pub cars: Vec<CarSnapshot>,
    pub standings: Vec<CarID>,
}

// The core only reports candidates; comparing against stored records is up
// to whoever persists them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordCandidates {
    pub best_lap: Option<(CarID, f64)>,
    pub best_race_time: Option<(CarID, f64)>,
}

pub trait Packet: Serialize + DeserializeOwned {
    fn parse_packet<R: Read>(reader: R) -> Result<Self> {
        let mut reader = reader;
        let mut size = [0u8; 4];
        reader.read_exact(&mut size)?;
        let size = u32::from_be_bytes(size) as u64;

        DefaultOptions::new()
            .with_limit(size)
            .deserialize_from(reader.take(size))
    }

    fn write_packet<W: Write>(&self, mut write: W) -> Result<()> {
        let options = DefaultOptions::new();
        let size = options.serialized_size(self)?;

        // snapshots of a full grid easily blow past a two byte length
        write.write_all(&(size as u32).to_be_bytes())?;
        options.serialize_into(&mut write, self)
    }
}

impl Packet for RaceSnapshot {}
impl Packet for RecordCandidates {}
