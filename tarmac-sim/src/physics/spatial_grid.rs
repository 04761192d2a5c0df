use std::collections::HashMap;

use glam::DVec2;

use tarmac_core::CarID;

type CellKey = (i64, i64);

// Uniform bucket grid for the broad phase. Independent of the track's surface
// grid and usually coarser; rebuilt from scratch every tick since the whole
// field moves every tick anyway.
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<CellKey, Vec<CarID>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> SpatialGrid {
        SpatialGrid {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub fn cell_of(&self, position: DVec2) -> CellKey {
        (
            (position.x / self.cell_size).floor() as i64,
            (position.y / self.cell_size).floor() as i64,
        )
    }

    // drops the keys too, so a car wandering off the map doesn't leave a
    // trail of empty buckets behind it for the rest of the race
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn insert(&mut self, id: CarID, position: DVec2) {
        if !position.is_finite() {
            return;
        }
        let key = self.cell_of(position);
        self.cells.entry(key).or_insert_with(Vec::new).push(id);
    }

    // everything in the same cell or one of the eight around it
    pub fn neighbors(&self, position: DVec2) -> impl Iterator<Item = CarID> + '_ {
        let (cx, cy) = self.cell_of(position);
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (cx + dx, cy + dy)))
            .filter_map(move |key| self.cells.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_cars_in_adjacent_cells_only() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert(0, DVec2::new(50.0, 50.0));
        grid.insert(1, DVec2::new(150.0, 150.0)); // diagonal neighbor
        grid.insert(2, DVec2::new(350.0, 50.0)); // two cells over

        let mut found: Vec<CarID> = grid.neighbors(DVec2::new(60.0, 60.0)).collect();
        found.sort();
        assert_eq!(found, vec![0, 1]);
    }

    #[test]
    fn negative_coordinates_floor_correctly() {
        let grid = SpatialGrid::new(100.0);
        assert_eq!(grid.cell_of(DVec2::new(-0.5, 10.0)), (-1, 0));
    }

    #[test]
    fn clear_empties_every_bucket() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(3, DVec2::new(1.0, 1.0));
        grid.clear();
        assert_eq!(grid.neighbors(DVec2::new(1.0, 1.0)).count(), 0);
    }

    #[test]
    fn roaming_cars_dont_grow_the_grid() {
        let mut grid = SpatialGrid::new(10.0);
        for step in 0..100 {
            grid.clear();
            grid.insert(0, DVec2::new(step as f64 * 25.0, -72.0));
        }
        assert_eq!(grid.cells.len(), 1);

        grid.clear();
        assert!(grid.cells.is_empty());
    }
}
