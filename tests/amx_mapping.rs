use amx_mapper::{
    midi::{CONTROL_CHANGE, ENCODER_LEFT, ENCODER_RIGHT, NOTE_OFF, NOTE_ON, VALUE_OFF, VALUE_ON},
    surface::{LayerMode, ShiftMode},
    AmxMapping, Channel, ControlRegistry, ControlSurface, Host, MemoryHost, MidiMessage,
};

const SHIFT: u8 = 0x00;
const SEARCH_LEFT: u8 = 0x02;
const SEARCH_RIGHT: u8 = 0x03;
const LOAD_LEFT: u8 = 0x04;
const CUE_LEFT: u8 = 0x08;
const PLAY_LEFT: u8 = 0x0A;
const PFL_RIGHT: u8 = 0x0D;
const GAIN_LEFT: u8 = 0x3C;
const GAIN_RIGHT: u8 = 0x3D;
const BROWSE_TURN: u8 = 0x3B;

fn started() -> (ControlSurface<MemoryHost>, AmxMapping) {
    let registry = ControlRegistry::amx().unwrap();
    let mut surface = ControlSurface::new(MemoryHost::new());
    let mapping = AmxMapping::build(&mut surface, &registry, Channel::new(0));
    assert_eq!(mapping.init(&mut surface), 0);
    surface.take_output();
    (surface, mapping)
}

fn value(surface: &ControlSurface<MemoryHost>, group: &str, key: &str) -> f64 {
    surface.host().get_parameter(group, key)
}

#[test]
fn play_toggles_and_led_follows_indicator() {
    let (mut surface, _) = started();

    assert!(surface.handle_message(&[NOTE_ON, PLAY_LEFT, VALUE_ON]));
    assert_eq!(value(&surface, "[Channel1]", "play"), 1.0);
    assert_eq!(
        surface.take_output(),
        vec![MidiMessage::new(NOTE_ON, PLAY_LEFT, VALUE_OFF)]
    );

    surface.host_mut().preset("[Channel1]", "play_indicator", 1.0);
    assert!(surface.handle_message(&[NOTE_ON, PLAY_LEFT, VALUE_ON]));
    assert_eq!(value(&surface, "[Channel1]", "play"), 0.0);
    assert_eq!(value(&surface, "[Channel2]", "play"), 0.0);
    assert_eq!(
        surface.take_output(),
        vec![MidiMessage::new(NOTE_ON, PLAY_LEFT, VALUE_ON)]
    );
}

#[test]
fn transport_leds_read_indicators() {
    let (mut surface, _) = started();
    surface.host_mut().preset("[Channel1]", "play_indicator", 1.0);
    surface.host_mut().preset("[Channel1]", "cue_indicator", 1.0);

    surface.refresh_outputs();
    let leds = surface.take_output();
    assert!(leds.contains(&MidiMessage::new(NOTE_ON, PLAY_LEFT, VALUE_ON)));
    assert!(leds.contains(&MidiMessage::new(NOTE_ON, CUE_LEFT, VALUE_ON)));
    assert_eq!(value(&surface, "[Channel1]", "play"), 0.0);
}

#[test]
fn refresh_reflects_host_changes() {
    let (mut surface, _) = started();
    surface.host_mut().preset("[Channel2]", "sync_enabled", 1.0);

    surface.refresh_outputs();
    let leds = surface.take_output();
    assert!(leds.contains(&MidiMessage::new(NOTE_ON, 0x07, VALUE_ON)));
    assert!(leds.contains(&MidiMessage::new(NOTE_ON, PLAY_LEFT, VALUE_OFF)));
}

#[test]
fn pfl_follows_note_on_and_off() {
    let (mut surface, _) = started();

    surface.handle_message(&[NOTE_ON, PFL_RIGHT, VALUE_ON]);
    assert_eq!(value(&surface, "[Channel2]", "pfl"), 1.0);
    surface.handle_message(&[NOTE_OFF, PFL_RIGHT, VALUE_OFF]);
    assert_eq!(value(&surface, "[Channel2]", "pfl"), 0.0);
}

#[test]
fn shift_turns_gain_into_pitch() {
    let (mut surface, mapping) = started();
    surface.host_mut().preset("[Channel1]", "pregain", 0.5);

    surface.handle_message(&[NOTE_ON, SHIFT, VALUE_ON]);
    assert_eq!(surface.shift_mode(mapping.shift), Some(ShiftMode::Shifted));
    surface.handle_message(&[CONTROL_CHANGE, GAIN_LEFT, ENCODER_RIGHT]);
    let write = surface.host().last_write().unwrap().clone();
    assert_eq!(write.key, "rate");
    assert!((write.value + 0.005).abs() < 1e-9);

    surface.handle_message(&[NOTE_OFF, SHIFT, VALUE_OFF]);
    surface.handle_message(&[CONTROL_CHANGE, GAIN_LEFT, ENCODER_RIGHT]);
    assert!((value(&surface, "[Channel1]", "pregain") - 0.525).abs() < 1e-9);
}

#[test]
fn shifted_load_moves_library_focus() {
    let (mut surface, _) = started();

    surface.handle_message(&[NOTE_ON, LOAD_LEFT, VALUE_ON]);
    assert_eq!(value(&surface, "[Channel1]", "LoadSelectedTrack"), 1.0);

    surface.handle_message(&[NOTE_ON, SHIFT, VALUE_ON]);
    surface.handle_message(&[NOTE_ON, LOAD_LEFT, VALUE_ON]);
    let write = surface.host().last_write().unwrap();
    assert_eq!(write.group, "[Library]");
    assert_eq!(write.key, "MoveFocusBackward");
}

#[test]
fn search_holds_deck_extras() {
    let (mut surface, mapping) = started();
    let left = mapping.deck_containers[0];
    surface.host_mut().preset("[Channel1]", "beatjump_size", 4.0);
    surface.host_mut().preset("[Channel1]", "playposition", 0.5);

    surface.handle_message(&[NOTE_ON, SEARCH_LEFT, VALUE_ON]);
    assert_eq!(
        surface.layer_mode(mapping.layers[0]),
        Some(LayerMode::AlternateActive)
    );
    assert!(surface.is_disconnected(mapping.deck_basics));
    assert!(surface.is_disconnected(mapping.library));
    assert!(surface.is_connected(left.extras));
    assert!(surface.is_disconnected(mapping.deck_containers[1].extras));
    assert!(surface.is_connected(mapping.mixer_lines));

    surface.handle_message(&[CONTROL_CHANGE, GAIN_RIGHT, ENCODER_RIGHT]);
    assert_eq!(value(&surface, "[Channel1]", "beatjump_size"), 8.0);

    surface.handle_message(&[CONTROL_CHANGE, BROWSE_TURN, ENCODER_RIGHT]);
    assert!((value(&surface, "[Channel1]", "playposition") - 0.507).abs() < 1e-9);

    surface.handle_message(&[NOTE_OFF, SEARCH_LEFT, VALUE_OFF]);
    assert_eq!(
        surface.layer_mode(mapping.layers[0]),
        Some(LayerMode::DefaultActive)
    );
    assert!(surface.is_connected(mapping.deck_basics));
    assert!(surface.is_disconnected(left.extras));

    surface.handle_message(&[CONTROL_CHANGE, BROWSE_TURN, ENCODER_LEFT]);
    let write = surface.host().last_write().unwrap();
    assert_eq!(write.group, "[Library]");
    assert_eq!(write.key, "MoveVertical");
    assert_eq!(write.value, -1.0);
}

#[test]
fn releasing_one_search_keeps_the_other_held() {
    let (mut surface, mapping) = started();
    let [left, right] = mapping.deck_containers;
    surface.host_mut().preset("[Channel2]", "playposition", 0.5);

    surface.handle_message(&[NOTE_ON, SEARCH_LEFT, VALUE_ON]);
    surface.handle_message(&[NOTE_ON, SEARCH_RIGHT, VALUE_ON]);
    assert!(surface.is_connected(right.extras));
    assert!(surface.is_disconnected(mapping.deck_basics));

    surface.handle_message(&[NOTE_OFF, SEARCH_LEFT, VALUE_OFF]);
    assert_eq!(
        surface.layer_mode(mapping.layers[0]),
        Some(LayerMode::DefaultActive)
    );
    assert_eq!(
        surface.layer_mode(mapping.layers[1]),
        Some(LayerMode::AlternateActive)
    );
    assert!(surface.is_disconnected(mapping.deck_basics));
    assert!(surface.is_disconnected(mapping.library));
    assert!(surface.is_disconnected(left.extras));
    assert!(surface.is_connected(right.extras));

    surface.handle_message(&[CONTROL_CHANGE, BROWSE_TURN, ENCODER_RIGHT]);
    assert!((value(&surface, "[Channel2]", "playposition") - 0.507).abs() < 1e-9);

    surface.handle_message(&[NOTE_OFF, SEARCH_RIGHT, VALUE_OFF]);
    assert!(surface.is_connected(mapping.deck_basics));
    assert!(surface.is_connected(mapping.library));
    assert!(surface.is_disconnected(right.extras));
}

#[test]
fn shifted_extras_use_fine_steps() {
    let (mut surface, _) = started();
    surface.host_mut().preset("[Channel1]", "playposition", 0.5);

    surface.handle_message(&[NOTE_ON, SEARCH_LEFT, VALUE_ON]);
    surface.handle_message(&[NOTE_ON, SHIFT, VALUE_ON]);
    surface.handle_message(&[CONTROL_CHANGE, BROWSE_TURN, ENCODER_LEFT]);
    assert!((value(&surface, "[Channel1]", "playposition") - 0.4998).abs() < 1e-9);

    surface.handle_message(&[NOTE_ON, PLAY_LEFT, VALUE_ON]);
    assert_eq!(value(&surface, "[Channel1]", "rate_temp_down_small"), 1.0);
    surface.handle_message(&[NOTE_OFF, PLAY_LEFT, VALUE_OFF]);
    assert_eq!(value(&surface, "[Channel1]", "rate_temp_down_small"), 0.0);
}

#[test]
fn equalizer_uses_fourteen_bit_pots() {
    let (mut surface, _) = started();

    surface.handle_message(&[CONTROL_CHANGE, 0x0A, 0x7F]);
    surface.handle_message(&[CONTROL_CHANGE, 0x2A, 0x7F]);
    assert_eq!(
        value(&surface, "[EqualizerRack1_[Channel1]_Effect1]", "parameter3"),
        1.0
    );

    let writes = surface.host().writes().len();
    surface.handle_message(&[CONTROL_CHANGE, 0x10, 0x00]);
    assert_eq!(surface.host().writes().len(), writes);
    surface.handle_message(&[CONTROL_CHANGE, 0x30, 0x00]);
    assert_eq!(value(&surface, "[QuickEffectRack1_[Channel2]]", "super1"), 0.0);
    assert_eq!(
        surface.host().last_write().unwrap().group,
        "[QuickEffectRack1_[Channel2]]"
    );
}

#[test]
fn shutdown_releases_everything() {
    let (mut surface, mapping) = started();
    surface.handle_message(&[NOTE_ON, PLAY_LEFT, VALUE_ON]);
    surface.take_output();

    mapping.shutdown(&mut surface);
    let leds = surface.take_output();
    assert!(leds.contains(&MidiMessage::new(NOTE_ON, PLAY_LEFT, VALUE_OFF)));
    assert!(leds.iter().all(|led| led.value == VALUE_OFF));

    assert!(surface.is_disconnected(mapping.master));
    assert!(surface.is_disconnected(mapping.deck_basics));
    assert!(!surface.handle_message(&[NOTE_ON, PLAY_LEFT, VALUE_ON]));
    assert!(!surface.handle_message(&[CONTROL_CHANGE, 0x01, 0x40]));
}

#[test]
fn missing_layout_entries_leave_controls_unbound() {
    let layout = amx_mapper::registry::DEFAULT_LAYOUT
        .lines()
        .filter(|line| !line.starts_with("pfl:"))
        .collect::<Vec<_>>()
        .join("\n");
    let registry = ControlRegistry::from_yaml(&layout).unwrap();
    let mut surface = ControlSurface::new(MemoryHost::new());
    let mapping = AmxMapping::build(&mut surface, &registry, Channel::new(0));

    assert_eq!(mapping.init(&mut surface), 0);
    assert!(!surface.handle_message(&[NOTE_ON, PFL_RIGHT, VALUE_ON]));
    assert!(surface.handle_message(&[NOTE_ON, PLAY_LEFT, VALUE_ON]));
}

#[test]
fn other_channels_are_ignored() {
    let (mut surface, _) = started();
    assert!(!surface.handle_message(&[NOTE_ON | 0x01, PLAY_LEFT, VALUE_ON]));
    assert!(!surface.handle_message(&[NOTE_ON, PLAY_LEFT]));
    assert!(surface.host().writes().is_empty());
}
