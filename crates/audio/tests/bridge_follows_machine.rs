//! Ambience bridge wired to the weather state machine.

use std::cell::RefCell;
use std::rc::Rc;
use stormrunner_audio::{AmbienceMap, AudioManager, AudioReactionBridge, MixerGroup};
use stormrunner_core::{ClipId, TICK_SECONDS};
use stormrunner_weather::{WeatherCondition, WeatherConfig, WeatherStateMachine};

fn step(machine: &mut WeatherStateMachine, bridge: &Rc<RefCell<AudioReactionBridge>>, ticks: usize) {
    for _ in 0..ticks {
        machine.advance(TICK_SECONDS);
        bridge.borrow_mut().advance(TICK_SECONDS);
    }
}

#[test]
fn ambience_crossfades_after_transition_completes() {
    let mut machine = WeatherStateMachine::seeded(&WeatherConfig::default(), 12).unwrap();
    let bridge = Rc::new(RefCell::new(
        AudioReactionBridge::new(AmbienceMap::default(), 2.0).unwrap(),
    ));
    AudioReactionBridge::subscribe_to(&bridge, &mut machine);

    machine.request_change(WeatherCondition::HeavyRain).unwrap();
    step(&mut machine, &bridge, 99);
    assert!(bridge.borrow().voices().is_empty(), "audio must wait for the condition change");

    step(&mut machine, &bridge, 1);
    assert_eq!(bridge.borrow().current_clip(), Some(&ClipId::new("rain_heavy")));

    // 2 second crossfade at 20 TPS.
    step(&mut machine, &bridge, 40);
    assert_eq!(bridge.borrow().gain(&ClipId::new("rain_heavy")), 0.8);
    assert!(!bridge.borrow().is_fading());

    machine.request_change(WeatherCondition::Clear).unwrap();
    step(&mut machine, &bridge, 100 + 40);
    assert!(bridge.borrow().voices().is_empty());
    assert_eq!(bridge.borrow().current_clip(), None);
}

#[test]
fn manager_mirrors_bridge_voices() {
    let mut bridge = AudioReactionBridge::new(AmbienceMap::default(), 2.0).unwrap();
    let mut audio = AudioManager::stub();
    bridge
        .on_condition_changed(&stormrunner_weather::WeatherChanged::new(
            WeatherCondition::Clear,
            WeatherCondition::Storm,
        ))
        .unwrap();
    bridge.advance(2.0);
    audio.sync_loops(MixerGroup::Weather, &bridge.voices());

    // voice 0.8 * weather group 0.8
    let volume = audio.loop_volume(MixerGroup::Weather, &ClipId::new("storm"));
    assert!((volume - 0.64).abs() < 1e-6);
}
