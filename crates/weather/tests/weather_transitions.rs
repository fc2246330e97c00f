//! Weather state machine scenarios.
//!
//! Validates timed transitions, mid-transition re-targeting, idempotent
//! requests and the lightning lifecycle tied to the Storm condition.

use std::cell::RefCell;
use std::rc::Rc;
use stormrunner_core::TICK_SECONDS;
use stormrunner_weather::{
    EffectParameterTable, LightningState, WeatherChanged, WeatherCondition, WeatherConfig,
    WeatherParameters, WeatherStateMachine,
};

fn machine(seed: u64) -> WeatherStateMachine {
    WeatherStateMachine::seeded(&WeatherConfig::default(), seed).expect("default config is valid")
}

fn run_ticks(machine: &mut WeatherStateMachine, ticks: usize) {
    for _ in 0..ticks {
        machine.advance(TICK_SECONDS);
    }
}

#[test]
fn clear_to_storm_lands_exactly_on_table_values() {
    let table = EffectParameterTable::STANDARD;
    let mut m = machine(1);
    assert!(m.request_change(WeatherCondition::Storm).unwrap());

    // 99 ticks = 4.95s: still interpolating, lightning not yet running.
    run_ticks(&mut m, 99);
    assert_eq!(m.current_condition(), WeatherCondition::Clear);
    assert_eq!(m.lightning().state(), LightningState::Idle);

    // t = 5.0
    m.advance(TICK_SECONDS);
    assert_eq!(m.current_condition(), WeatherCondition::Storm);
    assert_eq!(m.current_parameters(), table.get(WeatherCondition::Storm));
    assert_eq!(m.lightning().state(), LightningState::Active);
    assert!(!m.is_transitioning());
}

#[test]
fn retarget_mid_transition_starts_from_interpolated_value() {
    let table = EffectParameterTable::STANDARD;
    let mut m = machine(2);
    m.request_change(WeatherCondition::Storm).unwrap();
    run_ticks(&mut m, 40); // t = 2.0

    let at_two_seconds = m.current_parameters();
    assert!(at_two_seconds.rain_intensity > 0.0);
    assert!(at_two_seconds.rain_intensity < 1.0);

    m.request_change(WeatherCondition::Clear).unwrap();
    let transition = *m.transition().expect("new transition is active");
    assert_eq!(transition.from, WeatherCondition::Clear);
    assert_eq!(transition.to, WeatherCondition::Clear);
    assert_eq!(transition.start, at_two_seconds);
    assert_ne!(transition.start, table.get(WeatherCondition::Storm));
    assert_eq!(transition.elapsed, 0.0);

    // Smoothstep starts flat: the first tick barely moves.
    m.advance(TICK_SECONDS);
    let first = m.current_parameters();
    assert!(first.rain_intensity <= at_two_seconds.rain_intensity);
    assert!(at_two_seconds.rain_intensity - first.rain_intensity < 0.01);

    run_ticks(&mut m, 99);
    assert_eq!(m.current_parameters(), WeatherParameters::CALM);
    assert_eq!(m.lightning().state(), LightningState::Idle);
}

#[test]
fn request_at_rest_is_a_no_op() {
    let notifications = Rc::new(RefCell::new(Vec::new()));
    let mut m = machine(3);
    let sink = notifications.clone();
    m.subscribe(move |event: &WeatherChanged| sink.borrow_mut().push(*event));

    assert_eq!(m.request_change(WeatherCondition::Clear), Ok(false));
    assert!(!m.is_transitioning());
    run_ticks(&mut m, 200);
    assert!(notifications.borrow().is_empty());
    assert_eq!(m.current_parameters(), WeatherParameters::CALM);
}

#[test]
fn subscribers_hear_each_completed_change_once() {
    let notifications = Rc::new(RefCell::new(Vec::new()));
    let mut m = machine(4);
    let sink = notifications.clone();
    m.subscribe(move |event: &WeatherChanged| sink.borrow_mut().push(*event));

    m.request_change(WeatherCondition::LightRain).unwrap();
    run_ticks(&mut m, 100);
    m.request_change(WeatherCondition::HeavyRain).unwrap();
    run_ticks(&mut m, 100);

    assert_eq!(
        *notifications.borrow(),
        vec![
            WeatherChanged::new(WeatherCondition::Clear, WeatherCondition::LightRain),
            WeatherChanged::new(WeatherCondition::LightRain, WeatherCondition::HeavyRain),
        ]
    );
}

#[test]
fn storm_produces_strikes_until_it_ends() {
    let strikes = Rc::new(RefCell::new(0u32));
    let mut m = machine(5);
    let counter = strikes.clone();
    m.subscribe_lightning(move |_| *counter.borrow_mut() += 1);

    m.request_change(WeatherCondition::Storm).unwrap();
    run_ticks(&mut m, 100);
    // 60 seconds of storm: at least 7 strikes with waits of at most 8s.
    run_ticks(&mut m, 1200);
    let during_storm = *strikes.borrow();
    assert!(during_storm >= 7, "only {during_storm} strikes in a minute of storm");

    m.request_change(WeatherCondition::Clear).unwrap();
    run_ticks(&mut m, 100);
    let at_clear = *strikes.borrow();
    run_ticks(&mut m, 1200);
    assert_eq!(*strikes.borrow(), at_clear, "lightning fired after the storm ended");
}

#[test]
fn seeded_machines_replay_identically() {
    let mut a = machine(77);
    let mut b = machine(77);
    a.request_change(WeatherCondition::Storm).unwrap();
    b.request_change(WeatherCondition::Storm).unwrap();
    for _ in 0..2000 {
        let step_a = a.advance(TICK_SECONDS);
        let step_b = b.advance(TICK_SECONDS);
        assert_eq!(step_a, step_b);
        assert_eq!(a.current_parameters(), b.current_parameters());
    }
}
