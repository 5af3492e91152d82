//! Transport boundary for the protocol engine
//!
//! The codec, state engine and exchange only need two things from the host:
//! a way to send an ordered byte sequence (optionally at a scheduled time) and
//! a subscription delivering inbound byte sequences with arrival timestamps.
//! Port discovery, opening and reconnection stay on the host's side of this
//! seam.
//!
//! The main components are:
//! - [`FrameSink`] and [`FrameSource`] traits defining the seam
//! - [`MidirOutput`] and [`MidirInput`] for real MIDI device communication
//! - [`MockTransport`] for testing

pub mod midir_transport;
pub mod mock;

pub use midir_transport::{MidirInput, MidirOutput};
pub use mock::MockTransport;

use crate::error::Result;
use crossbeam::channel::Receiver;

/// One inbound byte frame with its arrival timestamp in microseconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub timestamp: u64,
}

/// Outbound half of a transport
pub trait FrameSink: Send {
    /// Sends a frame, optionally at a scheduled time (microseconds). Adapters
    /// that cannot schedule send immediately.
    fn send(&mut self, frame: &[u8], at: Option<u64>) -> Result<()>;
}

/// Inbound half of a transport
pub trait FrameSource: Send {
    /// Takes the single subscription to inbound frames. Fails with
    /// `TransportUnavailable` when no input is bound or the subscription has
    /// already been taken.
    fn subscribe(&mut self) -> Result<Receiver<Frame>>;
}

#[cfg(not(feature = "test-mock"))]
pub fn list_devices() -> Vec<String> {
    let mut devices = Vec::new();

    if let Ok(midi_in) = midir::MidiInput::new("midiwire-list") {
        let ports = midi_in.ports();
        for port in ports {
            if let Ok(name) = midi_in.port_name(&port) {
                devices.push(name);
            }
        }
    }

    devices
}

#[cfg(feature = "test-mock")]
pub fn list_devices() -> Vec<String> {
    // Mock implementation for tests - simple format as expected by tests
    vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
}
