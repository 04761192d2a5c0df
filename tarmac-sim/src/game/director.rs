use tracing::{debug, info, warn};

use tarmac_core::packets::{PhaseTag, RecordCandidates};
use tarmac_core::player::lap_info::{CheckpointID, LapNumber, Placement};
use tarmac_core::{CarID, SimError, SimSettings};

use crate::game::phase::{RacePhase, RaceState};
use crate::game::progress::rank_cars;
use crate::physics::car::Car;
use crate::track::Track;

// countdowns are summed from fixed steps, so allow a little float slop
const COUNTDOWN_EPSILON: f64 = 1e-9;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RetireReason {
    // no checkpoint for longer than the stale timeout
    StaleProgress,
    // still out on track when the race clock ran out
    RaceTimeout,
}

// Things that happened this tick, for whoever drives the HUD and sounds
#[derive(Clone, Debug, PartialEq)]
pub enum RaceEvent {
    PhaseChanged(PhaseTag),
    CheckpointPassed {
        car: CarID,
        checkpoint: CheckpointID,
    },
    LapCompleted {
        car: CarID,
        lap: LapNumber,
        lap_time: f64,
    },
    Finished {
        car: CarID,
        placement: Placement,
        race_time: f64,
    },
    Retired {
        car: CarID,
        reason: RetireReason,
    },
}

pub struct RaceDirector {
    state: RaceState,
    lap_count: LapNumber,
    countdown_seconds: f64,
    stale_timeout: f64,
    max_race_seconds: f64,
}

impl RaceDirector {
    pub fn new(car_count: usize, settings: &SimSettings) -> RaceDirector {
        RaceDirector {
            state: RaceState::new(car_count),
            lap_count: settings.lap_count.max(1),
            countdown_seconds: settings.countdown_seconds.max(0.0),
            stale_timeout: settings.stale_timeout_seconds,
            max_race_seconds: settings.max_race_seconds,
        }
    }

    pub fn state(&self) -> &RaceState {
        &self.state
    }

    pub fn phase(&self) -> &RacePhase {
        &self.state.phase
    }

    pub fn controls_enabled(&self) -> bool {
        self.state.phase.controls_enabled()
    }

    pub fn lap_count(&self) -> LapNumber {
        self.lap_count
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == RacePhase::Finished
    }

    fn set_phase(&mut self, phase: RacePhase, events: &mut Vec<RaceEvent>) {
        info!("race phase: {:?} -> {:?}", self.state.phase.tag(), phase.tag());
        events.push(RaceEvent::PhaseChanged(phase.tag()));
        self.state.phase = phase;
    }

    /* Runs last in every tick, once positions for the tick are final.
     * Progress is judged on each car's movement from `tick_start_position`
     * to where it ended up after collisions */
    pub fn update(&mut self, cars: &mut [Car], track: &Track, dt: f64) -> Vec<RaceEvent> {
        let mut events = Vec::new();

        match self.state.phase {
            RacePhase::Loading => {
                let remaining = self.countdown_seconds;
                self.set_phase(RacePhase::Countdown { remaining }, &mut events);
            }
            RacePhase::Countdown { remaining } => {
                let remaining = remaining - dt;
                if remaining <= COUNTDOWN_EPSILON {
                    self.start_race(cars);
                    self.set_phase(RacePhase::Racing, &mut events);
                } else {
                    self.state.phase = RacePhase::Countdown { remaining };
                }
            }
            RacePhase::Racing => {
                self.state.elapsed += dt;
                self.judge_progress(cars, track, &mut events);
                self.enforce_race_timeout(cars, &mut events);
            }
            // results are frozen
            RacePhase::Finished => return events,
        }

        self.state.standings = rank_cars(cars, track, &self.state);

        if self.state.phase == RacePhase::Racing
            && cars.iter().all(|car| !self.state.is_running(car.id))
        {
            self.set_phase(RacePhase::Finished, &mut events);
        }

        events
    }

    fn start_race(&mut self, cars: &mut [Car]) {
        self.state.elapsed = 0.0;
        for car in cars.iter_mut() {
            car.lap_info.lap_started_at = 0.0;
            car.lap_info.last_progress_at = 0.0;
        }
    }

    fn judge_progress(&mut self, cars: &mut [Car], track: &Track, events: &mut Vec<RaceEvent>) {
        let now = self.state.elapsed;

        for car in cars.iter_mut() {
            // locked cars only drive for show, retired ones not at all
            if car.lap_info.locked || !self.state.is_running(car.id) {
                continue;
            }

            let checkpoint = track.checkpoint(car.lap_info.next_checkpoint);
            if !checkpoint.crossed_by(car.tick_start_position, car.position()) {
                if now - car.lap_info.last_progress_at > self.stale_timeout {
                    self.retire(car.id, RetireReason::StaleProgress, events);
                }
                continue;
            }

            let passed = checkpoint.index;
            car.lap_info.last_progress_at = now;
            car.lap_info.next_checkpoint = passed + 1;
            debug!("car {} passed checkpoint {}", car.id, passed);
            events.push(RaceEvent::CheckpointPassed {
                car: car.id,
                checkpoint: passed,
            });

            if car.lap_info.next_checkpoint < track.checkpoint_count() {
                continue;
            }

            // the last checkpoint closes the lap
            let lap_time = now - car.lap_info.lap_started_at;
            car.lap_info.next_checkpoint = 0;
            car.lap_info.lap = car.lap_info.lap.saturating_add(1);
            car.lap_info.lap_times.push(lap_time);
            car.lap_info.lap_started_at = now;
            info!("car {} finished lap {} in {:.3}s", car.id, car.lap_info.lap, lap_time);
            events.push(RaceEvent::LapCompleted {
                car: car.id,
                lap: car.lap_info.lap,
                lap_time,
            });

            if car.lap_info.lap >= self.lap_count {
                car.lap_info.locked = true;
                self.state.finish_order.push(car.id);
                if let Some(time) = self.state.finish_times.get_mut(car.id) {
                    *time = Some(now);
                }
                let placement = self.state.finish_order.len() as Placement;
                info!("car {} took the flag in position {} ({:.3}s)", car.id, placement, now);
                events.push(RaceEvent::Finished {
                    car: car.id,
                    placement,
                    race_time: now,
                });
            }
        }
    }

    fn enforce_race_timeout(&mut self, cars: &[Car], events: &mut Vec<RaceEvent>) {
        if self.state.elapsed < self.max_race_seconds {
            return;
        }
        for car in cars {
            if self.state.is_running(car.id) {
                self.retire(car.id, RetireReason::RaceTimeout, events);
            }
        }
    }

    fn retire(&mut self, car: CarID, reason: RetireReason, events: &mut Vec<RaceEvent>) {
        if let Some(dnf) = self.state.dnf.get_mut(car) {
            *dnf = true;
        }
        match reason {
            RetireReason::StaleProgress => warn!("{}; marking DNF", SimError::StaleProgress { car }),
            RetireReason::RaceTimeout => info!("car {} still running at the time limit; DNF", car),
        }
        events.push(RaceEvent::Retired { car, reason });
    }

    // Best lap by anyone, and the quickest finish. Comparing these against
    // stored records is the caller's business.
    pub fn record_candidates(&self, cars: &[Car]) -> RecordCandidates {
        let best_lap = cars
            .iter()
            .filter_map(|car| car.lap_info.best_lap().map(|time| (car.id, time)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let best_race_time = self
            .state
            .finish_order
            .iter()
            .filter_map(|&id| {
                let time = self.state.finish_times.get(id).copied().flatten()?;
                Some((id, time))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        RecordCandidates {
            best_lap,
            best_race_time,
        }
    }
}
