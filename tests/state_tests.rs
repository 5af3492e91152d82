use midiwire::builder;
use midiwire::message::Message;
use midiwire::state::{ChannelState, DeviceState, StateHandler, OMNI};
use std::sync::{Arc, Mutex};

fn msg(bytes: Vec<u8>) -> Message {
    Message::new(bytes, 0).unwrap()
}

#[test]
fn test_default_initialization() {
    let channel = ChannelState::new(3);
    assert_eq!(channel.index(), 3);
    assert_eq!(channel.pressure(), 0);
    assert_eq!(channel.pitch_bend(), 0);
    assert_eq!(channel.controller(64), 0);
    assert!(!channel.hold_active());
    assert_eq!(channel.held_count(), 0);
    assert!(!channel.is_note_on(60));
}

#[test]
fn test_note_on_off_tracking() {
    let mut channel = ChannelState::new(0);
    channel.apply(&msg(builder::note_on(0, 60, 100)));
    assert!(channel.is_note_on(60));

    channel.apply(&msg(builder::note_off(0, 60, 0)));
    assert!(!channel.is_note_on(60));
}

#[test]
fn test_retrigger_keeps_one_outstanding_occurrence() {
    let mut channel = ChannelState::new(0);
    channel.apply(&msg(builder::note_on(0, 60, 100)));
    assert_eq!(channel.active_count(60), 1);

    channel.apply(&msg(builder::note_on(0, 60, 90)));
    assert_eq!(channel.active_count(60), 2);

    channel.apply(&msg(builder::note_off(0, 60, 0)));
    assert_eq!(channel.active_count(60), 1);
    assert!(channel.is_note_on(60));
}

#[test]
fn test_sustain_defers_release_until_pedal_up() {
    let mut channel = ChannelState::new(0);
    channel.apply(&msg(builder::note_on(0, 60, 100)));
    channel.apply(&msg(builder::control_change(0, 64, 127)));
    assert!(channel.hold_active());

    // Note-Off lands while hold is active: release is deferred
    let released = channel.apply(&msg(builder::note_off(0, 60, 0)));
    assert!(released.is_empty());
    assert!(channel.is_note_on(60));
    assert_eq!(channel.held_count(), 1);

    // Pedal up: the held queue drains and the release happens now
    let released = channel.apply(&msg(builder::control_change(0, 64, 0)));
    assert_eq!(released, vec![60]);
    assert!(!channel.is_note_on(60));
    assert_eq!(channel.held_count(), 0);
}

#[test]
fn test_stray_note_off_is_not_held_while_pedal_down() {
    let mut channel = ChannelState::new(0);
    channel.apply(&msg(builder::control_change(0, 64, 127)));

    // Note 60 was never on; its Note-Off must not queue a deferred release
    let released = channel.apply(&msg(builder::note_off(0, 60, 0)));
    assert!(released.is_empty());
    assert_eq!(channel.held_count(), 0);

    let released = channel.apply(&msg(builder::control_change(0, 64, 0)));
    assert!(released.is_empty());
}

#[test]
fn test_held_queue_drains_in_fifo_order() {
    let mut channel = ChannelState::new(0);
    for note in [60, 64, 67] {
        channel.apply(&msg(builder::note_on(0, note, 100)));
    }
    channel.apply(&msg(builder::control_change(0, 64, 100)));
    channel.apply(&msg(builder::note_off(0, 64, 0)));
    channel.apply(&msg(builder::note_off(0, 60, 0)));
    channel.apply(&msg(builder::note_off(0, 67, 0)));
    assert_eq!(channel.held_count(), 3);

    let released = channel.apply(&msg(builder::control_change(0, 64, 63)));
    assert_eq!(released, vec![64, 60, 67]);
    for note in [60, 64, 67] {
        assert!(!channel.is_note_on(note));
    }
}

#[test]
fn test_controller_pressure_and_bend_storage() {
    let mut channel = ChannelState::new(0);
    channel.apply(&msg(builder::control_change(0, 7, 99)));
    assert_eq!(channel.controller(7), 99);

    channel.apply(&msg(vec![0xD0, 55])); // channel pressure
    assert_eq!(channel.pressure(), 55);

    channel.apply(&msg(vec![0xA0, 60, 77])); // key pressure
    assert_eq!(channel.key_pressure(60), 77);

    channel.apply(&msg(builder::pitch_bend(0, 1234)));
    assert_eq!(channel.pitch_bend(), 1234);
}

#[test]
fn test_reset_is_idempotent() {
    let mut channel = ChannelState::new(7);
    channel.apply(&msg(builder::note_on(0, 60, 100)));
    channel.apply(&msg(builder::control_change(0, 64, 127)));
    channel.apply(&msg(builder::pitch_bend(0, -100)));
    channel.apply(&msg(vec![0xD0, 55]));

    channel.reset();
    let snapshot = channel.clone();

    channel.reset();
    assert_eq!(channel.index(), 7);
    assert_eq!(channel.pressure(), snapshot.pressure());
    assert_eq!(channel.pitch_bend(), snapshot.pitch_bend());
    assert_eq!(channel.controller(64), 0);
    assert!(!channel.is_note_on(60));
    assert_eq!(channel.held_count(), 0);
}

#[test]
fn test_note_queue_depth_stays_bounded_in_normal_traffic() {
    // A device could retrigger indefinitely; sanity-check that matched
    // on/off traffic keeps the queue depth flat
    let mut channel = ChannelState::new(0);
    for _ in 0..1000 {
        channel.apply(&msg(builder::note_on(0, 60, 100)));
        channel.apply(&msg(builder::note_off(0, 60, 0)));
    }
    assert_eq!(channel.active_count(60), 0);

    for _ in 0..16 {
        channel.apply(&msg(builder::note_on(0, 60, 100)));
    }
    assert_eq!(channel.active_count(60), 16);
}

#[test]
fn test_device_routes_to_addressed_channel_and_omni() {
    let mut device = DeviceState::new();
    device.handle(&msg(builder::note_on(4, 60, 100)));

    assert!(device.channel(4).is_note_on(60));
    assert!(!device.channel(5).is_note_on(60));
    assert!(device.omni().is_note_on(60));
}

#[test]
fn test_omni_aggregates_all_channels() {
    let mut device = DeviceState::new();
    device.handle(&msg(builder::note_on(0, 60, 100)));
    device.handle(&msg(builder::note_on(9, 60, 100)));

    assert_eq!(device.omni().active_count(60), 2);

    device.handle(&msg(builder::note_off(0, 60, 0)));
    assert_eq!(device.omni().active_count(60), 1);
    assert!(!device.channel(0).is_note_on(60));
    assert!(device.channel(9).is_note_on(60));
}

#[test]
fn test_system_messages_leave_channel_state_alone() {
    let mut device = DeviceState::new();
    device.handle(&msg(vec![0xF8]));
    device.handle(&msg(vec![0xF0, 0x43, 0x10, 0xF7]));

    for index in 0..16 {
        assert_eq!(device.channel(index).pitch_bend(), 0);
    }
}

#[test]
fn test_device_reset_clears_all_channels() {
    let mut device = DeviceState::new();
    for channel in 0..16 {
        device.handle(&msg(builder::note_on(channel, 40 + channel, 100)));
    }
    device.reset();

    for channel in 0..16 {
        assert!(!device.channel(channel as usize).is_note_on(40 + channel));
        assert_eq!(device.channel(channel as usize).index(), channel as usize);
    }
    assert!(!device.omni().is_note_on(40));
}

#[derive(Default)]
struct RecordingHandler {
    changes: Mutex<Vec<usize>>,
    releases: Mutex<Vec<(usize, u8)>>,
}

impl StateHandler for RecordingHandler {
    fn channel_changed(&self, channel: usize, _msg: &Message) {
        self.changes.lock().unwrap().push(channel);
    }

    fn note_released(&self, channel: usize, note: u8) {
        self.releases.lock().unwrap().push((channel, note));
    }
}

#[test]
fn test_handlers_see_changes_and_synthesized_releases() {
    let handler = Arc::new(RecordingHandler::default());
    let mut device = DeviceState::new();
    device.add_handler(handler.clone());

    device.handle(&msg(builder::note_on(2, 60, 100)));
    device.handle(&msg(builder::control_change(2, 64, 127)));
    device.handle(&msg(builder::note_off(2, 60, 0)));

    // No synthesized release yet: hold is still active
    assert!(handler.releases.lock().unwrap().is_empty());

    device.handle(&msg(builder::control_change(2, 64, 0)));
    assert_eq!(
        handler.releases.lock().unwrap().clone(),
        vec![(2, 60), (OMNI, 60)]
    );

    // Every update notified both the addressed channel and omni
    assert_eq!(
        handler.changes.lock().unwrap().clone(),
        vec![2, OMNI, 2, OMNI, 2, OMNI, 2, OMNI]
    );
}
