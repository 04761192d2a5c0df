pub mod ai;
pub mod game;
pub mod physics;
pub mod track;

pub use game::director::{RaceDirector, RaceEvent};
pub use game::game_loop::{FrameReport, GameLoop};
pub use game::{IntentBatch, Simulation};
pub use track::Track;
