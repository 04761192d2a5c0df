use std::collections::HashSet;

use glam::DVec2;
use tracing::info;

use tarmac_core::entity_location::CarPose;
use tarmac_core::player::lap_info::CheckpointID;
use tarmac_core::track_format::{CheckpointLine, StartSlot, SurfaceType, TrackFile};
use tarmac_core::SimError;

use crate::physics::car::Car;

pub const MAX_START_SLOTS: usize = 4;

#[derive(Clone, Debug)]
pub struct Checkpoint {
    pub index: CheckpointID,
    pub start: DVec2,
    pub end: DVec2,
}

impl Checkpoint {
    pub fn midpoint(&self) -> DVec2 {
        (self.start + self.end) / 2.0
    }
}

// Immutable once built; every car, the collision engine, the AI and the race
// director read from the same instance.
#[derive(Debug)]
pub struct Track {
    pub name: String,
    pub cell_size: f64,
    rows: usize,
    cols: usize,
    surface: Vec<SurfaceType>, // row-major, rows * cols
    checkpoints: Vec<Checkpoint>, // sorted by index
    waypoints: Vec<DVec2>,
    start_slots: Vec<CarPose>,
    lap_length: f64,
}

fn invalid(reason: impl Into<String>) -> SimError {
    SimError::InvalidTrackData(reason.into())
}

impl Track {
    pub fn load(path: &str) -> Result<Track, SimError> {
        Track::from_file(TrackFile::read(path)?)
    }

    pub fn from_json(json: &str) -> Result<Track, SimError> {
        Track::from_file(TrackFile::from_json(json)?)
    }

    pub fn from_file(file: TrackFile) -> Result<Track, SimError> {
        if !(file.cell_size.is_finite() && file.cell_size > 0.0) {
            return Err(invalid(format!("cell size {} is not positive", file.cell_size)));
        }

        let rows = file.grid.len();
        let cols = file.grid.first().map(|row| row.len()).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(invalid("surface grid is empty"));
        }

        let mut surface = Vec::with_capacity(rows * cols);
        for (y, row) in file.grid.iter().enumerate() {
            if row.len() != cols {
                return Err(invalid(format!(
                    "grid row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    cols
                )));
            }
            for (x, code) in row.iter().enumerate() {
                let tile = SurfaceType::from_code(*code).ok_or_else(|| {
                    invalid(format!("unknown surface code {} at ({}, {})", code, x, y))
                })?;
                surface.push(tile);
            }
        }

        if !surface.contains(&SurfaceType::StartFinish) {
            return Err(invalid("grid has no start/finish cell"));
        }

        let checkpoints = validate_checkpoints(file.checkpoints)?;

        if file.waypoints.len() < 3 {
            return Err(invalid(format!(
                "waypoint loop needs at least 3 points, got {}",
                file.waypoints.len()
            )));
        }
        if file.waypoints.iter().any(|p| !p.is_finite()) {
            return Err(invalid("waypoint with a non-finite coordinate"));
        }

        let start_slots = validate_start_slots(&file.start_slots)?;

        // closed loop, so include the edge from the last point back to the first
        let lap_length = file
            .waypoints
            .iter()
            .zip(file.waypoints.iter().cycle().skip(1))
            .map(|(a, b)| a.distance(*b))
            .sum();

        info!(
            "loaded track '{}' ({}x{} cells, {} checkpoints, {} waypoints)",
            file.name,
            rows,
            cols,
            checkpoints.len(),
            file.waypoints.len()
        );

        Ok(Track {
            name: file.name,
            cell_size: file.cell_size,
            rows,
            cols,
            surface,
            checkpoints,
            waypoints: file.waypoints,
            start_slots,
            lap_length,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    // the cell containing a world position; None if it's off the map
    pub fn surface_at(&self, x: f64, y: f64) -> Option<SurfaceType> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }

        let col = (x / self.cell_size).floor() as usize;
        let row = (y / self.cell_size).floor() as usize;
        if col >= self.cols || row >= self.rows {
            return None;
        }

        Some(self.surface[row * self.cols + col])
    }

    pub fn is_point_drivable(&self, x: f64, y: f64) -> bool {
        self.surface_at(x, y)
            .map(|tile| tile.is_drivable())
            .unwrap_or(false)
    }

    // all four footprint corners have to be on road; straddling the verge
    // already counts as off track
    pub fn is_car_on_track(&self, car: &Car) -> bool {
        footprint_corners(&car.pose, car.spec.half_width(), car.spec.half_height())
            .iter()
            .all(|corner| self.is_point_drivable(corner.x, corner.y))
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn checkpoint(&self, index: CheckpointID) -> &Checkpoint {
        &self.checkpoints[index % self.checkpoints.len()]
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn waypoints(&self) -> &[DVec2] {
        &self.waypoints
    }

    pub fn waypoint(&self, index: usize) -> DVec2 {
        self.waypoints[index % self.waypoints.len()]
    }

    pub fn waypoint_after(&self, index: usize) -> usize {
        (index + 1) % self.waypoints.len()
    }

    pub fn nearest_waypoint_index(&self, position: DVec2) -> usize {
        let mut nearest = 0;
        let mut nearest_distance = f64::INFINITY;
        for (index, waypoint) in self.waypoints.iter().enumerate() {
            let distance = waypoint.distance_squared(position);
            if distance < nearest_distance {
                nearest = index;
                nearest_distance = distance;
            }
        }
        nearest
    }

    pub fn start_slots(&self) -> &[CarPose] {
        &self.start_slots
    }

    // length of the waypoint loop, used as a stand-in for the racing line
    pub fn lap_length(&self) -> f64 {
        self.lap_length
    }
}

// corners of a car rotated by its heading; height runs along the heading
pub fn footprint_corners(pose: &CarPose, half_width: f64, half_height: f64) -> [DVec2; 4] {
    let forward = pose.forward() * half_height;
    let right = pose.right() * half_width;
    let center = pose.position;
    [
        center + forward + right,
        center + forward - right,
        center - forward + right,
        center - forward - right,
    ]
}

fn validate_checkpoints(lines: Vec<CheckpointLine>) -> Result<Vec<Checkpoint>, SimError> {
    if lines.is_empty() {
        return Err(invalid("track has no checkpoints"));
    }

    let mut seen = HashSet::new();
    for line in &lines {
        if line.index >= lines.len() || !seen.insert(line.index) {
            return Err(invalid(format!(
                "checkpoint indices must be 0..{} with no repeats, found {}",
                lines.len(),
                line.index
            )));
        }
        if !(line.start.is_finite() && line.end.is_finite()) {
            return Err(invalid(format!(
                "checkpoint {} has a non-finite endpoint",
                line.index
            )));
        }
        if line.start.distance_squared(line.end) == 0.0 {
            return Err(invalid(format!("checkpoint {} has zero length", line.index)));
        }
    }

    let mut checkpoints: Vec<Checkpoint> = lines
        .into_iter()
        .map(|line| Checkpoint {
            index: line.index,
            start: line.start,
            end: line.end,
        })
        .collect();
    checkpoints.sort_by_key(|checkpoint| checkpoint.index);
    Ok(checkpoints)
}

fn validate_start_slots(slots: &[StartSlot]) -> Result<Vec<CarPose>, SimError> {
    if slots.is_empty() || slots.len() > MAX_START_SLOTS {
        return Err(invalid(format!(
            "track needs 1 to {} start slots, got {}",
            MAX_START_SLOTS,
            slots.len()
        )));
    }

    slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            if slot.position.is_finite() && slot.heading.is_finite() {
                Ok(CarPose::new(slot.position, slot.heading))
            } else {
                Err(invalid(format!("start slot {} is not finite", i)))
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tarmac_core::player::choices::CarKind;

    // 4x4 all-road block with a start cell, cells of 50px
    pub(crate) fn open_lot() -> TrackFile {
        TrackFile {
            name: "open lot".to_string(),
            cell_size: 50.0,
            grid: vec![
                vec![7, 1, 1, 1],
                vec![1, 1, 1, 1],
                vec![1, 1, 1, 1],
                vec![1, 1, 1, 1],
            ],
            checkpoints: vec![
                CheckpointLine {
                    index: 0,
                    start: DVec2::new(100.0, 0.0),
                    end: DVec2::new(100.0, 200.0),
                },
                CheckpointLine {
                    index: 1,
                    start: DVec2::new(150.0, 0.0),
                    end: DVec2::new(150.0, 200.0),
                },
            ],
            waypoints: vec![
                DVec2::new(25.0, 25.0),
                DVec2::new(175.0, 25.0),
                DVec2::new(175.0, 175.0),
                DVec2::new(25.0, 175.0),
            ],
            start_slots: vec![StartSlot {
                position: DVec2::new(60.0, 100.0),
                heading: 0.0,
            }],
        }
    }

    fn expect_invalid(file: TrackFile) {
        assert!(matches!(
            Track::from_file(file),
            Err(SimError::InvalidTrackData(_))
        ));
    }

    #[test]
    fn builds_a_valid_track() {
        let track = Track::from_file(open_lot()).unwrap();
        assert_eq!((track.rows(), track.cols()), (4, 4));
        assert_eq!(track.checkpoint_count(), 2);
        assert!((track.lap_length() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_empty_and_ragged_grids() {
        let mut file = open_lot();
        file.grid = vec![];
        expect_invalid(file);

        let mut file = open_lot();
        file.grid[2].pop();
        expect_invalid(file);
    }

    #[test]
    fn rejects_missing_markers() {
        let mut file = open_lot();
        file.grid[0][0] = 1;
        expect_invalid(file);

        let mut file = open_lot();
        file.grid[1][1] = 42;
        expect_invalid(file);
    }

    #[test]
    fn rejects_bad_checkpoint_numbering() {
        let mut file = open_lot();
        file.checkpoints[1].index = 0;
        expect_invalid(file);

        let mut file = open_lot();
        file.checkpoints[1].index = 5;
        expect_invalid(file);

        let mut file = open_lot();
        file.checkpoints.clear();
        expect_invalid(file);
    }

    #[test]
    fn rejects_short_waypoint_loops_and_slot_counts() {
        let mut file = open_lot();
        file.waypoints.truncate(2);
        expect_invalid(file);

        let mut file = open_lot();
        file.start_slots.clear();
        expect_invalid(file);

        let mut file = open_lot();
        let slot = file.start_slots[0];
        file.start_slots = vec![slot; 5];
        expect_invalid(file);
    }

    #[test]
    fn out_of_bounds_is_never_drivable() {
        let track = Track::from_file(open_lot()).unwrap();
        assert!(track.is_point_drivable(10.0, 10.0));
        assert!(track.is_point_drivable(199.9, 199.9));
        assert!(!track.is_point_drivable(200.0, 10.0));
        assert!(!track.is_point_drivable(-0.1, 10.0));
        assert!(!track.is_point_drivable(f64::NAN, 10.0));
    }

    #[test]
    fn straddling_the_edge_counts_as_off_track() {
        let track = Track::from_file(open_lot()).unwrap();
        let spec = CarKind::Balanced.spec();

        let inside = Car::new(0, spec, CarPose::new(DVec2::new(100.0, 100.0), 0.3));
        assert!(track.is_car_on_track(&inside));

        // center still on the map, nose hanging over the edge
        let straddling = Car::new(1, spec, CarPose::new(DVec2::new(195.0, 100.0), 0.0));
        assert!(track.is_point_drivable(195.0, 100.0));
        assert!(!track.is_car_on_track(&straddling));
    }

    #[test]
    fn waypoint_indices_wrap() {
        let track = Track::from_file(open_lot()).unwrap();
        assert_eq!(track.waypoint_after(3), 0);
        assert_eq!(track.waypoint(5), track.waypoints()[1]);
        assert_eq!(track.nearest_waypoint_index(DVec2::new(170.0, 160.0)), 2);
    }
}
