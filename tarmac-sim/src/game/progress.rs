use std::cmp::Ordering;

use tarmac_core::player::lap_info::{CheckpointID, LapNumber};
use tarmac_core::CarID;

use crate::game::phase::RaceState;
use crate::physics::car::Car;
use crate::track::Track;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CarProgress {
    // placement is already locked in; lower finish rank is better
    Finished { rank: usize },
    Racing {
        lap: LapNumber,
        next_checkpoint: CheckpointID,
        // straight-line distance to the next checkpoint's midpoint
        distance: f64,
    },
    // out of the race; still ordered by how far it got
    Retired {
        lap: LapNumber,
        next_checkpoint: CheckpointID,
        distance: f64,
    },
}

impl CarProgress {
    pub fn of(car: &Car, track: &Track, state: &RaceState) -> CarProgress {
        if let Some(rank) = state.finish_order.iter().position(|&id| id == car.id) {
            return CarProgress::Finished { rank };
        }

        let lap = car.lap_info.lap;
        let next_checkpoint = car.lap_info.next_checkpoint;
        let distance = car
            .position()
            .distance(track.checkpoint(next_checkpoint).midpoint());
        // a car with a garbage position sorts last within its group
        let distance = if distance.is_finite() {
            distance
        } else {
            f64::INFINITY
        };

        if state.is_dnf(car.id) {
            CarProgress::Retired {
                lap,
                next_checkpoint,
                distance,
            }
        } else {
            CarProgress::Racing {
                lap,
                next_checkpoint,
                distance,
            }
        }
    }

    // Less means further ahead in the race
    pub fn cmp(&self, other: &Self) -> Ordering {
        fn by_distance_covered(
            (lap, next, distance): (LapNumber, CheckpointID, f64),
            (other_lap, other_next, other_distance): (LapNumber, CheckpointID, f64),
        ) -> Ordering {
            other_lap
                .cmp(&lap)
                .then(other_next.cmp(&next))
                .then(distance.total_cmp(&other_distance))
        }

        match (self, other) {
            (CarProgress::Finished { rank }, CarProgress::Finished { rank: other_rank }) => {
                rank.cmp(other_rank)
            }
            (CarProgress::Finished { .. }, _) => Ordering::Less,
            (_, CarProgress::Finished { .. }) => Ordering::Greater,

            (
                CarProgress::Racing {
                    lap,
                    next_checkpoint,
                    distance,
                },
                CarProgress::Racing {
                    lap: other_lap,
                    next_checkpoint: other_next,
                    distance: other_distance,
                },
            )
            | (
                CarProgress::Retired {
                    lap,
                    next_checkpoint,
                    distance,
                },
                CarProgress::Retired {
                    lap: other_lap,
                    next_checkpoint: other_next,
                    distance: other_distance,
                },
            ) => by_distance_covered(
                (*lap, *next_checkpoint, *distance),
                (*other_lap, *other_next, *other_distance),
            ),

            (CarProgress::Racing { .. }, CarProgress::Retired { .. }) => Ordering::Less,
            (CarProgress::Retired { .. }, CarProgress::Racing { .. }) => Ordering::Greater,
        }
    }
}

// car ids from first to last place; ties keep grid order
pub fn rank_cars(cars: &[Car], track: &Track, state: &RaceState) -> Vec<CarID> {
    let mut ranked: Vec<(CarID, CarProgress)> = cars
        .iter()
        .map(|car| (car.id, CarProgress::of(car, track, state)))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| a.cmp(b));
    ranked.into_iter().map(|(id, _)| id).collect()
}
