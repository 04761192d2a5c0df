use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use tarmac_core::packets::{CarSnapshot, RaceSnapshot, RecordCandidates};
use tarmac_core::player::choices::{Driver, Entrant};
use tarmac_core::player::control_intent::ControlIntent;
use tarmac_core::{CarID, SimError, SimSettings};

use crate::ai::rubber_band::rubber_band_factors;
use crate::ai::AiController;
use crate::game::director::{RaceDirector, RaceEvent};
use crate::game::phase::{RacePhase, RaceState};
use crate::physics::car::Car;
use crate::physics::collisions::{CollisionEngine, CollisionStats};
use crate::physics::StepOutcome;
use crate::track::Track;

pub mod checkpoints;
pub mod director;
pub mod game_loop;
pub mod phase;
pub mod progress;

// intents from the human input adapter for this tick; a missing entry means
// hands off the controls
pub type IntentBatch = HashMap<CarID, ControlIntent>;

/* Turns the raw 4-bit masks an adapter sends into intents. Anything malformed
 * is logged and driven as neutral */
pub fn decode_intents(raw: &HashMap<CarID, u8>) -> IntentBatch {
    raw.iter()
        .map(|(&car, &bits)| {
            let intent = ControlIntent::from_bits(bits).unwrap_or_else(|e| {
                warn!("car {}: {}; using neutral", car, e);
                ControlIntent::NEUTRAL
            });
            (car, intent)
        })
        .collect()
}

// Everything that changes during a race. One `tick` is one fixed step.
pub struct Simulation {
    track: Arc<Track>,
    settings: SimSettings,

    // a car's id is its index in here
    cars: Vec<Car>,
    drivers: Vec<Driver>,
    controllers: Vec<AiController>,

    collisions: CollisionEngine,
    director: RaceDirector,
    ticks: u64,
}

impl Simulation {
    pub fn new(
        track: Arc<Track>,
        entrants: &[Entrant],
        settings: &SimSettings,
    ) -> Result<Simulation, SimError> {
        if entrants.is_empty() {
            return Err(SimError::InvalidTrackData(
                "a race needs at least one car".to_string(),
            ));
        }
        if entrants.len() > track.start_slots().len() {
            return Err(SimError::InvalidTrackData(format!(
                "{} cars entered but track '{}' only has {} start slots",
                entrants.len(),
                track.name,
                track.start_slots().len()
            )));
        }

        let mut cars: Vec<Car> = entrants
            .iter()
            .zip(track.start_slots())
            .enumerate()
            .map(|(id, (entrant, slot))| Car::new(id, entrant.kind.spec(), *slot))
            .collect();

        let controllers = entrants
            .iter()
            .enumerate()
            .filter_map(|(id, entrant)| match entrant.driver {
                Driver::Ai(difficulty) => Some(AiController::new(id, difficulty, settings.seed)),
                Driver::Human => None,
            })
            .collect();

        // a car can start with a wheel on the grass
        CollisionEngine::refresh_surfaces(&mut cars, &track);

        info!(
            "race set up on '{}': {} cars, {} laps",
            track.name,
            cars.len(),
            settings.lap_count
        );

        Ok(Simulation {
            director: RaceDirector::new(cars.len(), settings),
            collisions: CollisionEngine::new(settings),
            drivers: entrants.iter().map(|entrant| entrant.driver).collect(),
            controllers,
            cars,
            track,
            settings: settings.clone(),
            ticks: 0,
        })
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car(&self, id: CarID) -> Option<&Car> {
        self.cars.get(id)
    }

    pub fn driver(&self, id: CarID) -> Option<Driver> {
        self.drivers.get(id).copied()
    }

    pub fn phase(&self) -> &RacePhase {
        self.director.phase()
    }

    pub fn race_state(&self) -> &RaceState {
        self.director.state()
    }

    pub fn is_finished(&self) -> bool {
        self.director.is_over()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn collision_stats(&self) -> CollisionStats {
        self.collisions.stats()
    }

    pub fn record_candidates(&self) -> RecordCandidates {
        self.director.record_candidates(&self.cars)
    }

    /* One fixed step: AI decides, physics integrates, collisions resolve
     * against the new positions, then the race director judges progress */
    pub fn tick(&mut self, intents: &IntentBatch) -> Vec<RaceEvent> {
        let dt = self.settings.step_seconds();
        self.ticks += 1;

        let intents = self.gather_intents(intents, dt);

        let mut rollbacks = 0;
        for (car, intent) in self.cars.iter_mut().zip(&intents) {
            if car.do_physics_step(intent, dt, &self.settings) == StepOutcome::RolledBack {
                rollbacks += 1;
            }
        }
        if rollbacks > 0 {
            debug!("tick {}: {} car(s) rolled back", self.ticks, rollbacks);
        }

        self.collisions.resolve(&mut self.cars, &self.track);

        self.director.update(&mut self.cars, &self.track, dt)
    }

    fn gather_intents(&mut self, human: &IntentBatch, dt: f64) -> Vec<ControlIntent> {
        let mut intents = vec![ControlIntent::NEUTRAL; self.cars.len()];
        // countdown and results screens: everyone sits still
        if !self.director.controls_enabled() {
            return intents;
        }

        for (id, intent) in intents.iter_mut().enumerate() {
            if self.drivers[id] == Driver::Human {
                *intent = human.get(&id).copied().unwrap_or(ControlIntent::NEUTRAL);
            }
        }

        let factors = rubber_band_factors(&self.cars, &self.track, &self.settings);
        for controller in self.controllers.iter_mut() {
            let id = controller.car();
            controller.set_rubber_band(factors.get(id).copied().unwrap_or(0.0));
            if let Some(intent) = intents.get_mut(id) {
                *intent = controller.update(&self.cars, &self.track, &self.settings, dt);
            }
        }

        // retired cars roll to a stop
        let state = self.director.state();
        for (id, intent) in intents.iter_mut().enumerate() {
            if state.is_dnf(id) {
                *intent = ControlIntent::NEUTRAL;
            }
        }

        intents
    }

    pub fn snapshot(&self, interpolation: f64) -> RaceSnapshot {
        let state = self.director.state();
        let countdown_remaining = match state.phase {
            RacePhase::Countdown { remaining } => remaining.max(0.0),
            _ => 0.0,
        };

        let cars = self
            .cars
            .iter()
            .map(|car| CarSnapshot {
                id: car.id,
                position: car.pose.position,
                heading: car.pose.heading,
                speed: car.speed,
                lap: car.lap_info.lap,
                next_checkpoint: car.lap_info.next_checkpoint,
                placement: state.placement_of(car.id),
                off_track: car.off_track,
                finished: state.is_finished(car.id),
                dnf: state.is_dnf(car.id),
            })
            .collect();

        RaceSnapshot {
            phase: state.phase.tag(),
            countdown_remaining,
            elapsed: state.elapsed,
            interpolation,
            cars,
            standings: state.standings.clone(),
        }
    }
}
