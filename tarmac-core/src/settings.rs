use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

// Every tunable the simulation reads. Missing keys fall back to the values in
// `Default`, so a config file only has to mention what it changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    // game loop
    pub fixed_step: f64,
    pub max_catchup_steps: u32,
    pub max_wall_delta: f64,

    // race rules
    pub lap_count: u8,
    pub countdown_seconds: f64,
    pub stale_timeout_seconds: f64,
    pub max_race_seconds: f64,

    // car physics
    pub coast_decay_factor: f64,
    pub brake_strength: f64,
    pub turn_approach_rate: f64,
    pub off_track_speed_factor: f64,
    pub off_track_accel_factor: f64,
    pub off_track_turn_factor: f64,

    // collisions
    pub collision_cell_size: f64,
    pub collision_speed_loss: f64,
    pub collision_heading_jitter: f64,
    pub collision_separation_epsilon: f64,

    // ai
    pub ai_avoidance_radius: f64,
    pub ai_avoidance_cone: f64,
    pub ai_avoidance_offset: f64,
    pub ai_corner_slowdown: f64,
    pub rubber_band_max: f64,
    pub rubber_band_gain: f64,

    pub seed: u64,
}

impl Default for SimSettings {
    fn default() -> Self {
        SimSettings {
            fixed_step: 1.0 / 60.0,
            max_catchup_steps: 5,
            max_wall_delta: 0.1,

            lap_count: 3,
            countdown_seconds: 3.0,
            stale_timeout_seconds: 30.0,
            max_race_seconds: 600.0,

            coast_decay_factor: 0.985,
            brake_strength: 2.5,
            turn_approach_rate: 8.0,
            off_track_speed_factor: 0.6,
            off_track_accel_factor: 0.4,
            off_track_turn_factor: 0.8,

            collision_cell_size: 128.0,
            collision_speed_loss: 0.5,
            collision_heading_jitter: 0.08,
            collision_separation_epsilon: 0.5,

            ai_avoidance_radius: 70.0,
            ai_avoidance_cone: 0.6,
            ai_avoidance_offset: 40.0,
            ai_corner_slowdown: 0.5,
            rubber_band_max: 0.1,
            rubber_band_gain: 0.0005,

            seed: 0x5eed,
        }
    }
}

impl SimSettings {
    /// Layers an optional YAML file and `TARMAC_*` environment variables over
    /// the defaults.
    pub fn load(path: Option<&str>) -> Result<SimSettings, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        let config = builder
            .add_source(Environment::with_prefix("TARMAC"))
            .build()?;

        config.try_deserialize()
    }

    /// The step everything integrates with. A zero, negative or NaN
    /// `fixed_step` from a config file falls back to the default 60 Hz.
    pub fn step_seconds(&self) -> f64 {
        if self.fixed_step.is_finite() && self.fixed_step > 0.0 {
            self.fixed_step
        } else {
            SimSettings::default().fixed_step
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
