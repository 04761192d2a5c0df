use std::fmt;

use config::ConfigError;

use crate::CarID;

#[derive(Debug)]
pub enum SimError {
    // malformed grid, markers or geometry; the race can't start
    InvalidTrackData(String),
    // non-finite pose or speed, recovered in place by rolling the car back
    CorruptedCarState { car: CarID },
    // an input mask with bits we don't understand; callers treat it as neutral
    InvalidControlIntent(u8),
    // car made no progress for too long; becomes a DNF
    StaleProgress { car: CarID },
    Config(ConfigError),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidTrackData(reason) => write!(f, "invalid track data: {}", reason),
            SimError::CorruptedCarState { car } => {
                write!(f, "car {} ended up with a non-finite state", car)
            }
            SimError::InvalidControlIntent(bits) => {
                write!(f, "invalid control intent mask {:#010b}", bits)
            }
            SimError::StaleProgress { car } => {
                write!(f, "car {} stopped making race progress", car)
            }
            SimError::Config(e) => write!(f, "could not load settings: {}", e),
            SimError::Io(e) => write!(f, "io error: {}", e),
            SimError::Json(e) => write!(f, "could not parse json: {}", e),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Config(e) => Some(e),
            SimError::Io(e) => Some(e),
            SimError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        SimError::Config(e)
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Json(e)
    }
}
