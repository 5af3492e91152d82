//! Live per-channel and per-device state tracking
//!
//! Folds a stream of decoded messages into a consistent snapshot: outstanding
//! note activations, controller values, pressure, pitch bend, and sustain-hold
//! semantics. One [`ChannelState`] exists per channel 0-15 plus a synthetic
//! omni aggregate that mirrors every channel's activity.

use crate::message::{status, Category, Message, HOLD_PEDAL};
use log::{debug, trace};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Index of the synthetic omni channel in handler notifications
pub const OMNI: usize = 16;

/// Observer of state-engine activity.
///
/// `channel_changed` fires after every applied update; `note_released` fires
/// only for off-notifications the engine synthesizes while draining the
/// sustain-hold queue (a direct Note-Off is already visible as the message
/// itself).
pub trait StateHandler: Send + Sync {
    fn channel_changed(&self, _channel: usize, _msg: &Message) {}
    fn note_released(&self, _channel: usize, _note: u8) {}
}

/// State of one MIDI channel (or of the omni aggregate)
#[derive(Debug, Clone)]
pub struct ChannelState {
    index: usize,
    pressure: u8,
    pitch_bend: i16,
    // One FIFO per note: the same note can be retriggered before release, so
    // a boolean flag would lose activations. Release pops the oldest.
    notes: HashMap<u8, VecDeque<Message>>,
    controllers: [u8; 128],
    key_pressure: [u8; 128],
    held: VecDeque<u8>,
}

impl ChannelState {
    /// Creates a zeroed channel with the given index (0-15, or [`OMNI`])
    pub fn new(index: usize) -> Self {
        Self {
            index,
            pressure: 0,
            pitch_bend: 0,
            notes: HashMap::new(),
            controllers: [0; 128],
            key_pressure: [0; 128],
            held: VecDeque::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pressure(&self) -> u8 {
        self.pressure
    }

    pub fn pitch_bend(&self) -> i16 {
        self.pitch_bend
    }

    /// Last recorded value of a controller
    pub fn controller(&self, number: u8) -> u8 {
        self.controllers[(number & 0x7F) as usize]
    }

    /// Last recorded key pressure for a note
    pub fn key_pressure(&self, note: u8) -> u8 {
        self.key_pressure[(note & 0x7F) as usize]
    }

    /// Number of outstanding Note-On occurrences for a note
    pub fn active_count(&self, note: u8) -> usize {
        self.notes.get(&note).map_or(0, VecDeque::len)
    }

    pub fn is_note_on(&self, note: u8) -> bool {
        self.active_count(note) > 0
    }

    /// Whether the sustain pedal is currently holding releases back
    pub fn hold_active(&self) -> bool {
        self.controller(HOLD_PEDAL) >= 64
    }

    /// Number of notes whose release is deferred by the sustain pedal
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Applies one decoded message to this channel's state.
    ///
    /// Returns the notes released by a sustain-queue drain so the owner can
    /// forward synthesized off-notifications. Unrecognized statuses are a
    /// no-op; this never fails.
    pub fn apply(&mut self, msg: &Message) -> Vec<u8> {
        let mut released = Vec::new();
        match msg.status() {
            status::NOTE_ON => {
                self.notes
                    .entry(msg.note())
                    .or_default()
                    .push_back(msg.clone());
            }
            status::NOTE_OFF => {
                if self.hold_active() {
                    // Only defer releases for notes that are actually on; a
                    // stray Note-Off must not produce a synthesized release
                    // when the hold drains.
                    if self.is_note_on(msg.note()) {
                        trace!(
                            "ch{}: deferring release of note {} (hold active)",
                            self.index,
                            msg.note()
                        );
                        self.held.push_back(msg.note());
                    }
                } else {
                    self.pop_note(msg.note());
                }
            }
            status::CONTROL_CHANGE => {
                let controller = msg.controller();
                let value = msg.value();
                self.controllers[(controller & 0x7F) as usize] = value;
                if controller == HOLD_PEDAL && value < 64 {
                    // Hold just deactivated: drain deferred releases in FIFO order
                    while let Some(note) = self.held.pop_front() {
                        self.pop_note(note);
                        released.push(note);
                    }
                    if !released.is_empty() {
                        debug!(
                            "ch{}: hold released {} deferred note(s)",
                            self.index,
                            released.len()
                        );
                    }
                }
            }
            status::PITCH_BEND => {
                self.pitch_bend = msg.pitch_bend();
            }
            status::CHANNEL_PRESSURE => {
                self.pressure = msg.pressure();
            }
            status::KEY_PRESSURE => {
                self.key_pressure[(msg.note() & 0x7F) as usize] = msg.pressure();
            }
            _ => {}
        }
        released
    }

    fn pop_note(&mut self, note: u8) {
        if let Some(queue) = self.notes.get_mut(&note) {
            queue.pop_front();
            if queue.is_empty() {
                self.notes.remove(&note);
            }
        }
    }

    /// Restores the channel to its post-construction state, keeping its index.
    /// Idempotent.
    pub fn reset(&mut self) {
        self.pressure = 0;
        self.pitch_bend = 0;
        self.notes.clear();
        self.controllers = [0; 128];
        self.key_pressure = [0; 128];
        self.held.clear();
    }
}

/// Owns the 16 channel states plus the omni aggregate and routes incoming
/// decoded messages to both
pub struct DeviceState {
    channels: Vec<ChannelState>,
    omni: ChannelState,
    handlers: Vec<Arc<dyn StateHandler>>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceState {
    pub fn new() -> Self {
        Self {
            channels: (0..16).map(ChannelState::new).collect(),
            omni: ChannelState::new(OMNI),
            handlers: Vec::new(),
        }
    }

    /// Registers an observer of channel updates and synthesized releases
    pub fn add_handler(&mut self, handler: Arc<dyn StateHandler>) {
        self.handlers.push(handler);
    }

    /// State of one channel, index 0-15
    pub fn channel(&self, index: usize) -> &ChannelState {
        &self.channels[index]
    }

    /// The aggregate view reflecting the union of all channel activity
    pub fn omni(&self) -> &ChannelState {
        &self.omni
    }

    /// Routes a decoded message to the addressed channel and to the omni
    /// aggregate, then publishes change notifications. System messages are a
    /// no-op for channel state.
    pub fn handle(&mut self, msg: &Message) {
        if msg.category() != Category::ChannelVoice {
            trace!("ignoring non-channel message: {}", msg.describe());
            return;
        }
        let index = match msg.channel() {
            Some(index) => index as usize,
            None => return,
        };

        let released = self.channels[index].apply(msg);
        let released_omni = self.omni.apply(msg);

        for handler in &self.handlers {
            handler.channel_changed(index, msg);
            for &note in &released {
                handler.note_released(index, note);
            }
            handler.channel_changed(OMNI, msg);
            for &note in &released_omni {
                handler.note_released(OMNI, note);
            }
        }
    }

    /// Clears all 16 channels and the omni aggregate to their initial values
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        self.omni.reset();
        debug!("device state reset");
    }
}
