pub mod choices;
pub mod control_intent;
pub mod lap_info;

pub type CarID = usize;
