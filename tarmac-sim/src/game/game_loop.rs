use tracing::{debug, trace};

use tarmac_core::packets::RaceSnapshot;
use tarmac_core::SimSettings;

use crate::game::director::RaceEvent;
use crate::game::{IntentBatch, Simulation};

// What one `advance` call did, for the host's frame callback
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub steps: u32,
    // leftover fraction of a step in [0, 1), for the renderer to smooth with
    pub interpolation: f64,
    pub events: Vec<RaceEvent>,
}

/* Decouples the simulation from the frame rate: wall time goes into an
 * accumulator and comes out as whole fixed steps. The host calls `advance`
 * once per rendered frame */
pub struct GameLoop {
    simulation: Simulation,

    fixed_step: f64,
    max_catchup_steps: u32,
    max_wall_delta: f64,

    accumulator: f64,
    paused: bool,
    // the first delta after a resume spans the pause, so it gets thrown away
    resync: bool,
}

impl GameLoop {
    pub fn new(simulation: Simulation, settings: &SimSettings) -> GameLoop {
        GameLoop {
            simulation,
            fixed_step: settings.step_seconds(),
            max_catchup_steps: settings.max_catchup_steps.max(1),
            max_wall_delta: settings.max_wall_delta.max(0.0),
            accumulator: 0.0,
            paused: false,
            resync: false,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn interpolation(&self) -> f64 {
        (self.accumulator / self.fixed_step).clamp(0.0, 1.0 - f64::EPSILON)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // pausing twice is the same as pausing once. The leftover fraction of a
    // step stays in the accumulator until we resume
    pub fn pause(&mut self) {
        if !self.paused {
            debug!("game loop paused");
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            debug!("game loop resumed");
            self.paused = false;
            self.resync = true;
        }
    }

    pub fn advance(&mut self, wall_delta: f64, intents: &IntentBatch) -> FrameReport {
        let mut report = FrameReport {
            interpolation: self.interpolation(),
            ..FrameReport::default()
        };

        if self.paused {
            return report;
        }
        if self.resync {
            self.resync = false;
            return report;
        }

        // a backgrounded tab can hand us whole seconds at once
        let delta = if wall_delta.is_finite() {
            wall_delta.clamp(0.0, self.max_wall_delta)
        } else {
            0.0
        };
        self.accumulator += delta;

        while self.accumulator >= self.fixed_step && report.steps < self.max_catchup_steps {
            report.events.extend(self.simulation.tick(intents));
            self.accumulator -= self.fixed_step;
            report.steps += 1;
        }

        // whatever is still owed past the cap is dropped, not deferred
        if self.accumulator >= self.fixed_step {
            trace!(
                "dropping {:.4}s of simulation time past the catch-up cap",
                self.accumulator - self.accumulator % self.fixed_step
            );
            self.accumulator %= self.fixed_step;
        }

        report.interpolation = self.interpolation();
        report
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        self.simulation.snapshot(self.interpolation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::tests::open_lot;
    use crate::track::Track;
    use std::sync::Arc;
    use tarmac_core::player::choices::{CarKind, Entrant};

    const STEP: f64 = 1.0 / 60.0;

    fn new_loop(settings: &SimSettings) -> GameLoop {
        let track = Arc::new(Track::from_file(open_lot()).unwrap());
        let simulation =
            Simulation::new(track, &[Entrant::human(CarKind::Balanced)], settings).unwrap();
        GameLoop::new(simulation, settings)
    }

    #[test]
    fn one_frame_one_step() {
        let mut game = new_loop(&SimSettings::default());
        // a hair over one step so float error can't cost us the tick
        let report = game.advance(STEP * 1.001, &IntentBatch::new());
        assert_eq!(report.steps, 1);
        assert!(report.interpolation >= 0.0 && report.interpolation < 1.0);
        assert_eq!(game.simulation().ticks(), 1);
    }

    #[test]
    fn short_frames_accumulate() {
        let mut game = new_loop(&SimSettings::default());
        let mut steps = 0;
        for _ in 0..10 {
            steps += game.advance(STEP / 4.0, &IntentBatch::new()).steps;
        }
        assert!((2..=3).contains(&steps));
        let report = game.advance(0.0, &IntentBatch::new());
        assert_eq!(report.steps, 0);
        assert!(report.interpolation > 0.0);
    }

    #[test]
    fn catch_up_is_capped_and_the_rest_dropped() {
        let mut settings = SimSettings::default();
        settings.max_wall_delta = 1.0;
        let mut game = new_loop(&settings);

        let report = game.advance(1.0, &IntentBatch::new());
        assert_eq!(report.steps, settings.max_catchup_steps);
        assert!(report.interpolation < 1.0);

        // the dropped time never comes back
        let report = game.advance(0.0, &IntentBatch::new());
        assert_eq!(report.steps, 0);
    }

    #[test]
    fn wall_delta_is_clamped() {
        let mut game = new_loop(&SimSettings::default());
        // 0.1s is six steps at most, and the cap of five wins
        assert_eq!(game.advance(30.0, &IntentBatch::new()).steps, 5);
        assert_eq!(game.advance(f64::NAN, &IntentBatch::new()).steps, 0);
        assert_eq!(game.advance(-1.0, &IntentBatch::new()).steps, 0);
    }

    #[test]
    fn paused_loop_does_nothing_and_resumes_cleanly() {
        let mut game = new_loop(&SimSettings::default());
        game.advance(STEP * 1.5, &IntentBatch::new());
        let before = game.interpolation();
        assert!((before - 0.5).abs() < 1e-6);

        game.pause();
        game.pause();
        assert!(game.is_paused());
        let report = game.advance(0.05, &IntentBatch::new());
        assert_eq!(report.steps, 0);
        // frozen, not thrown away
        assert_eq!(report.interpolation, before);
        assert_eq!(game.interpolation(), before);

        game.resume();
        // this delta covers the whole pause and is ignored
        assert_eq!(game.advance(0.1, &IntentBatch::new()).steps, 0);
        assert_eq!(game.interpolation(), before);
        // the half step from before the pause still counts
        assert_eq!(game.advance(STEP * 0.6, &IntentBatch::new()).steps, 1);
        assert_eq!(game.simulation().ticks(), 2);
    }

    #[test]
    fn bad_step_setting_still_ticks_at_sixty_hertz() {
        let mut settings = SimSettings::default();
        settings.fixed_step = 0.0;
        let mut game = new_loop(&settings);
        assert_eq!(game.advance(STEP * 1.001, &IntentBatch::new()).steps, 1);
    }
}
