use std::collections::HashSet;

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use tarmac_core::entity_location::CarPose;
use tarmac_core::{CarID, SimSettings};

use crate::physics::car::Car;
use crate::physics::spatial_grid::SpatialGrid;
use crate::track::Track;

// centers closer than this are treated as sitting exactly on top of each other
const COINCIDENT_DISTANCE: f64 = 1e-9;

// keeps the collision rng stream apart from the AI's
const COLLISION_SEED_SALT: u64 = 0xc011_1510;

// Diagnostics only; nothing in gameplay reads these.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CollisionStats {
    pub checks_this_tick: u64,
    pub collisions_this_tick: u64,
    pub total_collisions: u64,
}

pub struct CollisionEngine {
    grid: SpatialGrid,
    // pairs already looked at this tick, as (lower id, higher id)
    active_pairs: HashSet<(CarID, CarID)>,
    // pairs pushed apart this tick, and the ones from last tick. A pair in
    // both is grinding, not a fresh hit
    contacts: HashSet<(CarID, CarID)>,
    touching: HashSet<(CarID, CarID)>,
    stats: CollisionStats,
    rng: StdRng,

    speed_loss: f64,
    heading_jitter: f64,
    separation_epsilon: f64,
}

// two distinct cars out of the same slice
fn pair_mut(cars: &mut [Car], a: usize, b: usize) -> (&mut Car, &mut Car) {
    debug_assert!(a < b);
    let (head, tail) = cars.split_at_mut(b);
    (&mut head[a], &mut tail[0])
}

impl CollisionEngine {
    pub fn new(settings: &SimSettings) -> CollisionEngine {
        CollisionEngine {
            grid: SpatialGrid::new(settings.collision_cell_size),
            active_pairs: HashSet::new(),
            contacts: HashSet::new(),
            touching: HashSet::new(),
            stats: CollisionStats::default(),
            rng: StdRng::seed_from_u64(settings.seed ^ COLLISION_SEED_SALT),
            speed_loss: settings.collision_speed_loss,
            heading_jitter: settings.collision_heading_jitter.abs(),
            separation_epsilon: settings.collision_separation_epsilon,
        }
    }

    pub fn stats(&self) -> CollisionStats {
        self.stats
    }

    /* One pass per tick, after the physics step: push overlapping cars apart,
     * then work out which cars are off the road for next tick's penalty */
    pub fn resolve(&mut self, cars: &mut [Car], track: &Track) -> CollisionStats {
        self.stats.checks_this_tick = 0;
        self.stats.collisions_this_tick = 0;
        self.active_pairs.clear();
        std::mem::swap(&mut self.touching, &mut self.contacts);
        self.contacts.clear();

        self.grid.clear();
        for (index, car) in cars.iter().enumerate() {
            self.grid.insert(index, car.position());
        }

        for a in 0..cars.len() {
            let candidates: Vec<usize> = self
                .grid
                .neighbors(cars[a].position())
                .filter(|&b| b != a)
                .collect();

            // every pair turns up once from each side
            for b in candidates {
                let pair = (a.min(b), a.max(b));
                if !self.active_pairs.insert(pair) {
                    continue;
                }
                self.stats.checks_this_tick += 1;
                if !cars[pair.0].bounding_box().is_colliding(&cars[pair.1].bounding_box()) {
                    continue;
                }

                let fresh = !self.touching.contains(&pair);
                let (first, second) = pair_mut(cars, pair.0, pair.1);
                if self.separate(first, second, fresh) {
                    self.contacts.insert(pair);
                    self.stats.collisions_this_tick += 1;
                    self.stats.total_collisions += 1;
                }
            }
        }

        Self::refresh_surfaces(cars, track);

        trace!(
            "collision pass: {} checks, {} resolved, {} lifetime",
            self.stats.checks_this_tick,
            self.stats.collisions_this_tick,
            self.stats.total_collisions
        );

        self.stats
    }

    pub fn refresh_surfaces(cars: &mut [Car], track: &Track) {
        for car in cars.iter_mut() {
            car.off_track = !track.is_car_on_track(car);
        }
    }

    // returns false if the boxes only touch at the corners and the centers are
    // already far enough apart. Only a fresh hit costs speed; cars that were
    // already touching last tick just get pushed apart again
    fn separate(&mut self, first: &mut Car, second: &mut Car, fresh: bool) -> bool {
        let min_distance = first.min_separation(second);
        let between = second.position() - first.position();
        let distance = between.length();

        let (normal, overlap) = if distance < COINCIDENT_DISTANCE {
            // no direction to push along, so just nudge them apart
            (DVec2::X, self.separation_epsilon)
        } else {
            (between / distance, min_distance - distance)
        };
        if overlap <= 0.0 {
            return false;
        }

        let push = normal * (overlap / 2.0);
        first.pose.position -= push;
        second.pose.position += push;

        for car in [first, second] {
            if fresh {
                car.speed *= self.speed_loss;
                // a little wobble so two cars can't lock into the same overlap
                let jitter = self.rng.gen_range(-self.heading_jitter..=self.heading_jitter);
                car.pose = CarPose::new(car.pose.position, car.pose.heading + jitter);
            }
            car.last_valid_pose = car.pose;
        }

        true
    }
}
