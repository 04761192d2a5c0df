pub mod entity_location;
pub mod error;
pub mod packets;
pub mod player;
mod settings;
pub mod track_format;

pub use error::SimError;
pub use player::CarID;
pub use settings::SimSettings;
