// Steps longer than this get clamped; anything bigger is a hitch, not physics
pub const MAX_STEP_SECONDS: f64 = 0.1;

// The coast decay factor is authored per 1/60 s frame, so it gets raised to
// dt * DECAY_REFERENCE_RATE to stay frame-rate independent
pub const DECAY_REFERENCE_RATE: f64 = 60.0;

// Speeds below this snap to a standstill
pub const REST_SPEED: f64 = 1e-3;
