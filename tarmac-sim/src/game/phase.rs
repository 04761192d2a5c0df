use tarmac_core::packets::PhaseTag;
use tarmac_core::CarID;

#[derive(Clone, Debug, PartialEq)]
pub enum RacePhase {
    // cars are on the grid, nothing has ticked yet
    Loading,
    // everyone can see the track but the controls are dead until this runs out
    Countdown { remaining: f64 },
    // the only phase where intents reach the cars
    Racing,
    // every car is locked or out; nothing changes from here on
    Finished,
}

impl RacePhase {
    pub fn tag(&self) -> PhaseTag {
        match self {
            RacePhase::Loading => PhaseTag::Loading,
            RacePhase::Countdown { .. } => PhaseTag::Countdown,
            RacePhase::Racing => PhaseTag::Racing,
            RacePhase::Finished => PhaseTag::Finished,
        }
    }

    pub fn controls_enabled(&self) -> bool {
        matches!(self, RacePhase::Racing)
    }
}

// One per race, owned by the race director
#[derive(Clone, Debug)]
pub struct RaceState {
    pub phase: RacePhase,
    // simulated seconds since the green light
    pub elapsed: f64,
    // best placed first
    pub standings: Vec<CarID>,
    pub finish_order: Vec<CarID>,
    // indexed by car id
    pub finish_times: Vec<Option<f64>>,
    pub dnf: Vec<bool>,
}

impl RaceState {
    pub fn new(car_count: usize) -> RaceState {
        RaceState {
            phase: RacePhase::Loading,
            elapsed: 0.0,
            standings: (0..car_count).collect(),
            finish_order: Vec::new(),
            finish_times: vec![None; car_count],
            dnf: vec![false; car_count],
        }
    }

    pub fn is_finished(&self, car: CarID) -> bool {
        self.finish_times.get(car).map_or(false, Option::is_some)
    }

    pub fn is_dnf(&self, car: CarID) -> bool {
        self.dnf.get(car).copied().unwrap_or(false)
    }

    // still out there racing for a position
    pub fn is_running(&self, car: CarID) -> bool {
        !self.is_finished(car) && !self.is_dnf(car)
    }

    // 1-based; 0 for a car the race doesn't know about
    pub fn placement_of(&self, car: CarID) -> u8 {
        self.standings
            .iter()
            .position(|&id| id == car)
            .map_or(0, |index| (index + 1) as u8)
    }
}
