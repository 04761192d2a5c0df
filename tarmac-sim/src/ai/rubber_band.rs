use tarmac_core::SimSettings;

use crate::physics::car::Car;
use crate::track::Track;

// Rough distance covered in the race so far, in px. Each checkpoint passed is
// worth an equal share of the lap, minus however far the car still is from
// the next one.
pub fn progress_score(car: &Car, track: &Track) -> f64 {
    let checkpoints = track.checkpoint_count();
    let per_checkpoint = track.lap_length() / checkpoints as f64;
    let passed = car.lap_info.lap as usize * checkpoints + car.lap_info.next_checkpoint;
    let remaining = car
        .position()
        .distance(track.checkpoint(car.lap_info.next_checkpoint).midpoint());

    passed as f64 * per_checkpoint - remaining
}

/* Speed multipliers (as +/- fractions) for every car, indexed like `cars`.
 * Trailing cars get a boost proportional to their gap to the leader, the
 * leader gets held back by its lead over second place. All zero when there is
 * nobody to race against or once the leader is on the final lap */
pub fn rubber_band_factors(cars: &[Car], track: &Track, settings: &SimSettings) -> Vec<f64> {
    let mut factors = vec![0.0; cars.len()];
    if cars.len() < 2 {
        return factors;
    }

    let scores: Vec<f64> = cars.iter().map(|car| progress_score(car, track)).collect();
    let mut order: Vec<usize> = (0..cars.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    let leader = order[0];
    let second = order[1];

    if cars[leader].lap_info.lap.saturating_add(1) >= settings.lap_count {
        return factors;
    }

    let max = settings.rubber_band_max.abs();
    for (index, factor) in factors.iter_mut().enumerate() {
        let adjustment = if index == leader {
            -(scores[leader] - scores[second]) * settings.rubber_band_gain
        } else {
            (scores[leader] - scores[index]) * settings.rubber_band_gain
        };
        *factor = if adjustment.is_finite() {
            adjustment.clamp(-max, max)
        } else {
            0.0
        };
    }

    factors
}
