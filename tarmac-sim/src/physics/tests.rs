use std::f64::consts::TAU;

use glam::DVec2;

use tarmac_core::entity_location::CarPose;
use tarmac_core::player::choices::CarKind;
use tarmac_core::player::control_intent::ControlIntent;
use tarmac_core::SimSettings;

use crate::physics::car::Car;
use crate::physics::{effective_spec, StepOutcome};

const STEP: f64 = 1.0 / 60.0;

fn get_starting_car() -> Car {
    Car::new(
        0,
        CarKind::Balanced.spec(),
        CarPose::new(DVec2::new(100.0, 100.0), 0.0),
    )
}

fn all_intents() -> Vec<ControlIntent> {
    (0..16).map(|bits| ControlIntent::from_bits(bits).unwrap()).collect()
}

#[test]
fn test_speed_stays_in_bounds_for_any_intent() {
    let settings = SimSettings::default();
    for intent in all_intents() {
        for dt in [0.0, 1e-6, STEP, 0.05, 0.1, 2.0, 1e9, -1.0, f64::NAN, f64::INFINITY] {
            let mut car = get_starting_car();
            car.speed = 150.0;
            for _ in 0..30 {
                car.do_physics_step(&intent, dt, &settings);
                assert!(car.speed >= 0.0 && car.speed <= car.spec.max_speed);
                assert!(car.pose.is_finite());
                assert!(car.pose.heading >= 0.0 && car.pose.heading < TAU);
            }
        }
    }
}

#[test]
fn test_accelerating_converges_without_overshoot() {
    let settings = SimSettings::default();
    let mut car = get_starting_car();
    let mut last_speed = car.speed;

    // 20 simulated seconds
    for _ in 0..1200 {
        car.do_physics_step(&ControlIntent::FULL_THROTTLE, STEP, &settings);
        assert!(car.speed >= last_speed);
        assert!(car.speed <= car.spec.max_speed);
        last_speed = car.speed;
    }

    assert!(car.speed > car.spec.max_speed * 0.95);
}

#[test]
fn test_pickup_is_fastest_from_rest() {
    let settings = SimSettings::default();
    let mut car = get_starting_car();
    car.do_physics_step(&ControlIntent::FULL_THROTTLE, STEP, &settings);
    let first_gain = car.speed;

    car.speed = car.spec.max_speed * 0.9;
    car.do_physics_step(&ControlIntent::FULL_THROTTLE, STEP, &settings);
    let late_gain = car.speed - car.spec.max_speed * 0.9;

    assert!((first_gain - car.spec.acceleration * STEP).abs() < 1e-9);
    assert!(late_gain < first_gain * 0.25);
}

#[test]
fn test_coasting_strictly_decreases_to_rest() {
    let settings = SimSettings::default();
    let mut car = get_starting_car();
    car.speed = 180.0;

    let mut last_speed = car.speed;
    let mut steps = 0;
    while car.speed > 0.0 {
        car.do_physics_step(&ControlIntent::NEUTRAL, STEP, &settings);
        assert!(car.speed < last_speed);
        last_speed = car.speed;
        steps += 1;
        assert!(steps < 10_000, "car never came to rest");
    }
    assert_eq!(car.speed, 0.0);
}

#[test]
fn test_braking_beats_coasting() {
    let settings = SimSettings::default();
    let mut coasting = get_starting_car();
    let mut braking = get_starting_car();
    coasting.speed = 120.0;
    braking.speed = 120.0;

    let brake = ControlIntent {
        brake: true,
        ..ControlIntent::NEUTRAL
    };
    coasting.do_physics_step(&ControlIntent::NEUTRAL, STEP, &settings);
    braking.do_physics_step(&brake, STEP, &settings);

    assert!(braking.speed < coasting.speed);
}

#[test]
fn test_brake_overrides_throttle() {
    let settings = SimSettings::default();
    let mut car = get_starting_car();
    car.speed = 100.0;
    let both = ControlIntent {
        accelerate: true,
        brake: true,
        ..ControlIntent::NEUTRAL
    };
    car.do_physics_step(&both, STEP, &settings);
    assert!(car.speed < 100.0);
}

#[test]
fn test_off_track_penalty_is_per_step() {
    let settings = SimSettings::default();
    let mut on_road = get_starting_car();
    let mut on_grass = get_starting_car();
    on_grass.off_track = true;

    for _ in 0..600 {
        on_road.do_physics_step(&ControlIntent::FULL_THROTTLE, STEP, &settings);
        on_grass.do_physics_step(&ControlIntent::FULL_THROTTLE, STEP, &settings);
        assert!(on_grass.speed <= on_road.speed);
    }

    let penalized = effective_spec(&on_grass.spec, true, &settings);
    assert!(on_grass.speed <= penalized.max_speed + 1e-9);
    assert!(on_road.speed > penalized.max_speed);
    // the base spec is never touched
    assert_eq!(on_grass.spec, CarKind::Balanced.spec());
}

#[test]
fn test_stationary_car_does_not_rotate() {
    let settings = SimSettings::default();
    let mut car = get_starting_car();
    let right = ControlIntent {
        steer_right: true,
        ..ControlIntent::NEUTRAL
    };
    for _ in 0..60 {
        car.do_physics_step(&right, STEP, &settings);
    }
    assert_eq!(car.pose.heading, 0.0);
    assert_eq!(car.pose.position, DVec2::new(100.0, 100.0));
    // but the wheel has been turned the whole time
    assert!(car.turn_rate > 0.0);
}

#[test]
fn test_turn_rate_eases_toward_target() {
    let settings = SimSettings::default();
    let mut car = get_starting_car();
    car.speed = car.spec.max_speed;
    let left = ControlIntent {
        accelerate: true,
        steer_left: true,
        ..ControlIntent::NEUTRAL
    };

    car.do_physics_step(&left, STEP, &settings);
    let target = -car.spec.turn_speed;
    assert!(car.turn_rate < 0.0 && car.turn_rate > target);
    assert_eq!(car.target_turn_rate, target);
    // steering left from heading 0 wraps into the top of the range
    assert!(car.pose.heading > std::f64::consts::PI);

    for _ in 0..120 {
        car.do_physics_step(&left, STEP, &settings);
    }
    assert!((car.turn_rate - target).abs() < 1e-3);
}

#[test]
fn test_integrates_along_heading() {
    let settings = SimSettings::default();
    let mut car = get_starting_car();
    car.pose = CarPose::new(DVec2::new(100.0, 100.0), std::f64::consts::FRAC_PI_2);
    car.speed = 60.0;
    car.do_physics_step(&ControlIntent::FULL_THROTTLE, 0.1, &settings);

    assert!((car.pose.position.x - 100.0).abs() < 1e-9);
    assert!(car.pose.position.y > 106.0);
    assert_eq!(car.tick_start_position, DVec2::new(100.0, 100.0));
}

#[test]
fn test_corrupted_state_rolls_back() {
    let settings = SimSettings::default();
    let mut car = get_starting_car();
    car.speed = 50.0;
    assert_eq!(
        car.do_physics_step(&ControlIntent::FULL_THROTTLE, STEP, &settings),
        StepOutcome::Committed
    );
    let good_pose = car.pose;

    car.pose.heading = f64::NAN;
    assert_eq!(
        car.do_physics_step(&ControlIntent::FULL_THROTTLE, STEP, &settings),
        StepOutcome::RolledBack
    );
    assert_eq!(car.pose, good_pose);
    assert_eq!(car.speed, 0.0);
    assert_eq!(car.turn_rate, 0.0);
}

#[test]
fn test_blown_up_integration_rolls_back() {
    let settings = SimSettings::default();
    let mut car = get_starting_car();
    let start = car.pose;

    // finite going in, but the acceleration curve overflows
    car.speed = f64::MAX;
    assert_eq!(
        car.do_physics_step(&ControlIntent::FULL_THROTTLE, STEP, &settings),
        StepOutcome::RolledBack
    );
    assert_eq!(car.pose, start);
    assert_eq!(car.speed, 0.0);
}
