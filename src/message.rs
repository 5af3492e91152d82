//! Decoded view over raw MIDI byte frames
//!
//! A [`Message`] wraps one wire frame plus its arrival timestamp and derives
//! every field (category, status, channel, note, controller, pitch bend,
//! sysex ids) positionally from the bytes. Nothing is stored twice: the frame
//! is the single source of truth.

use crate::error::{MidiError, Result};

/// Status byte constants. Channel-voice statuses carry the channel in their
/// low nibble and are masked before comparison; system statuses are verbatim.
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const KEY_PRESSURE: u8 = 0xA0;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_PRESSURE: u8 = 0xD0;
    pub const PITCH_BEND: u8 = 0xE0;

    pub const SYSEX: u8 = 0xF0;
    pub const MTC_QUARTER_FRAME: u8 = 0xF1;
    pub const SONG_POSITION: u8 = 0xF2;
    pub const SONG_SELECT: u8 = 0xF3;
    pub const TUNE_REQUEST: u8 = 0xF6;
    pub const EOX: u8 = 0xF7;
    pub const CLOCK: u8 = 0xF8;
    pub const START: u8 = 0xFA;
    pub const CONTINUE: u8 = 0xFB;
    pub const STOP: u8 = 0xFC;
    pub const ACTIVE_SENSING: u8 = 0xFE;
    pub const SYSTEM_RESET: u8 = 0xFF;
}

/// Controller number for the sustain (hold) pedal
pub const HOLD_PEDAL: u8 = 64;

/// Device id sentinel matching any device in a sysex query
pub const DEVICE_ANY: u8 = 0x7F;

/// Header byte sentinel matching any byte at its position in a sysex query.
/// 0xFF can never occur as a sysex data byte, so it is unambiguous.
pub const BYTE_ANY: u8 = 0xFF;

/// Broad classification of a frame, determined by its first byte alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Per-channel performance message (note, controller, pressure, bend, program)
    ChannelVoice,
    /// System common or realtime message (0xF1..=0xFF)
    SystemCommon,
    /// Vendor-defined variable-length message starting with 0xF0
    SystemExclusive,
}

/// Manufacturer id in its single-byte or 3-byte extended form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManufacturerId {
    Standard(u8),
    Extended([u8; 3]),
}

impl ManufacturerId {
    /// Number of frame bytes the id occupies
    pub fn byte_len(&self) -> usize {
        match self {
            ManufacturerId::Standard(_) => 1,
            ManufacturerId::Extended(_) => 3,
        }
    }

    fn matches(&self, frame: &[u8]) -> bool {
        match self {
            ManufacturerId::Standard(id) => frame.len() >= 2 && frame[1] == *id,
            ManufacturerId::Extended(id) => frame.len() >= 4 && frame[1..4] == id[..],
        }
    }
}

/// Pattern for wildcard matching of system-exclusive frames.
///
/// Layout assumed: `[0xF0, manufacturer id (1 or 3 bytes), device id, header...]`.
/// A `device` of [`DEVICE_ANY`] matches any device byte; a header byte of
/// [`BYTE_ANY`] matches any byte at its position. All comparisons are
/// position-based; a frame shorter than the compared region never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysexQuery {
    pub manufacturer: ManufacturerId,
    pub device: Option<u8>,
    pub header: Option<Vec<u8>>,
}

/// Construction-time codec options.
///
/// The flag travels with each construction call instead of living in
/// process-wide module state.
#[derive(Debug, Clone, Copy)]
pub struct FrameOptions {
    /// Rewrite a 3-byte Note-On with velocity 0 into a Note-Off on the same
    /// channel, once, at construction time.
    pub zero_velocity_note_off: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            zero_velocity_note_off: true,
        }
    }
}

/// An immutable decoded view over one MIDI wire frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    frame: Vec<u8>,
    timestamp: u64,
}

impl Message {
    /// Builds a message with default [`FrameOptions`]. The timestamp is the
    /// arrival time in microseconds, as delivered by the transport.
    pub fn new(frame: Vec<u8>, timestamp: u64) -> Result<Self> {
        Self::with_options(frame, timestamp, &FrameOptions::default())
    }

    /// Builds a message, applying the zero-velocity rewrite if enabled.
    ///
    /// An empty frame is rejected as [`MidiError::MalformedFrame`]; a frame
    /// shorter than a later field read yields 0 for the absent byte.
    pub fn with_options(mut frame: Vec<u8>, timestamp: u64, options: &FrameOptions) -> Result<Self> {
        if frame.is_empty() {
            return Err(MidiError::MalformedFrame);
        }
        if options.zero_velocity_note_off
            && frame.len() >= 3
            && frame[0] & 0xF0 == status::NOTE_ON
            && frame[2] == 0
        {
            frame[0] = status::NOTE_OFF | (frame[0] & 0x0F);
        }
        Ok(Message { frame, timestamp })
    }

    /// Raw frame bytes
    pub fn bytes(&self) -> &[u8] {
        &self.frame
    }

    /// Arrival timestamp in microseconds
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    // Positional read with zero-fill for absent bytes.
    fn data(&self, index: usize) -> u8 {
        self.frame.get(index).copied().unwrap_or(0)
    }

    /// Category derived from the first byte
    pub fn category(&self) -> Category {
        let first = self.frame[0];
        if first == status::SYSEX {
            Category::SystemExclusive
        } else if first & 0xF0 == 0xF0 {
            Category::SystemCommon
        } else {
            Category::ChannelVoice
        }
    }

    /// Status code: masked for channel messages, verbatim for system messages
    pub fn status(&self) -> u8 {
        match self.category() {
            Category::ChannelVoice => self.frame[0] & 0xF0,
            _ => self.frame[0],
        }
    }

    /// Channel number 0-15 for channel-voice messages, `None` otherwise
    pub fn channel(&self) -> Option<u8> {
        match self.category() {
            Category::ChannelVoice => Some(self.frame[0] & 0x0F),
            _ => None,
        }
    }

    pub fn note(&self) -> u8 {
        self.data(1)
    }

    pub fn velocity(&self) -> u8 {
        self.data(2)
    }

    pub fn controller(&self) -> u8 {
        self.data(1)
    }

    pub fn value(&self) -> u8 {
        self.data(2)
    }

    pub fn program(&self) -> u8 {
        self.data(1)
    }

    /// Pressure byte: second byte for channel pressure, third for key pressure
    pub fn pressure(&self) -> u8 {
        if self.status() == status::CHANNEL_PRESSURE {
            self.data(1)
        } else {
            self.data(2)
        }
    }

    /// 14-bit pitch bend, zero-centered: `data2 * 128 + data1 - 8192`.
    /// Data bytes are masked to 7 bits, so hostile frames with the high bit
    /// set still decode into the valid range.
    pub fn pitch_bend(&self) -> i16 {
        (self.data(2) & 0x7F) as i16 * 128 + (self.data(1) & 0x7F) as i16 - 8192
    }

    /// Manufacturer id of a sysex frame, extended when byte 1 is 0x00
    pub fn manufacturer_id(&self) -> Option<ManufacturerId> {
        if self.category() != Category::SystemExclusive {
            return None;
        }
        if self.data(1) == 0x00 {
            Some(ManufacturerId::Extended([
                self.data(1),
                self.data(2),
                self.data(3),
            ]))
        } else {
            Some(ManufacturerId::Standard(self.data(1)))
        }
    }

    /// Device id byte, sitting immediately after the manufacturer id bytes
    pub fn device_id(&self) -> Option<u8> {
        let id = self.manufacturer_id()?;
        Some(self.data(1 + id.byte_len()))
    }

    /// Wildcard match of a sysex frame against a query, per the layout
    /// documented on [`SysexQuery`].
    pub fn matches(&self, query: &SysexQuery) -> bool {
        let frame = &self.frame;
        if frame.first() != Some(&status::SYSEX) {
            return false;
        }
        if !query.manufacturer.matches(frame) {
            return false;
        }
        let device_pos = 1 + query.manufacturer.byte_len();
        if let Some(device) = query.device {
            if device != DEVICE_ANY && frame.get(device_pos) != Some(&device) {
                return false;
            }
        }
        if let Some(header) = &query.header {
            let start = device_pos + 1;
            if frame.len() < start + header.len() {
                return false;
            }
            for (i, want) in header.iter().enumerate() {
                if *want != BYTE_ANY && frame[start + i] != *want {
                    return false;
                }
            }
        }
        true
    }

    /// Human-readable rendering: status name, 1-based channel, named fields.
    /// Derived and non-authoritative, never used for round-tripping.
    pub fn describe(&self) -> String {
        match self.status() {
            status::NOTE_ON => format!(
                "Note On ch={} note={} velocity={}",
                self.channel().unwrap_or(0) + 1,
                self.note(),
                self.velocity()
            ),
            status::NOTE_OFF => format!(
                "Note Off ch={} note={} velocity={}",
                self.channel().unwrap_or(0) + 1,
                self.note(),
                self.velocity()
            ),
            status::KEY_PRESSURE => format!(
                "Key Pressure ch={} note={} pressure={}",
                self.channel().unwrap_or(0) + 1,
                self.note(),
                self.pressure()
            ),
            status::CONTROL_CHANGE => format!(
                "Control Change ch={} controller={} value={}",
                self.channel().unwrap_or(0) + 1,
                self.controller(),
                self.value()
            ),
            status::PROGRAM_CHANGE => format!(
                "Program Change ch={} program={}",
                self.channel().unwrap_or(0) + 1,
                self.program()
            ),
            status::CHANNEL_PRESSURE => format!(
                "Channel Pressure ch={} pressure={}",
                self.channel().unwrap_or(0) + 1,
                self.pressure()
            ),
            status::PITCH_BEND => format!(
                "Pitch Bend ch={} bend={}",
                self.channel().unwrap_or(0) + 1,
                self.pitch_bend()
            ),
            status::SYSEX => format!(
                "SysEx manufacturer={:?} device={:?} len={}",
                self.manufacturer_id(),
                self.device_id(),
                self.frame.len()
            ),
            status::MTC_QUARTER_FRAME => {
                format!("MTC Quarter Frame value=0x{:02X}", self.data(1))
            }
            status::SONG_POSITION => format!(
                "Song Position beats={}",
                self.data(2) as u16 * 128 + self.data(1) as u16
            ),
            status::SONG_SELECT => format!("Song Select song={}", self.data(1)),
            status::CLOCK => "Clock".to_string(),
            status::START => "Start".to_string(),
            status::CONTINUE => "Continue".to_string(),
            status::STOP => "Stop".to_string(),
            status::TUNE_REQUEST => "Tune Request".to_string(),
            status::ACTIVE_SENSING => "Active Sensing".to_string(),
            status::SYSTEM_RESET => "System Reset".to_string(),
            other => format!("System 0x{:02X}", other),
        }
    }
}
