use std::error::Error;
use std::fmt;

/// Custom error type for MIDI wire-protocol operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiError {
    /// Frame too short to carry the fields being constructed from it
    MalformedFrame,
    /// An operation was invoked in a state that forbids it
    ProtocolViolation(String),
    /// No matching response arrived within the configured window
    Timeout {
        /// Index of the exchange event that was waiting when the timer fired
        event: usize,
    },
    /// Send or subscribe attempted with no usable transport bound
    TransportUnavailable(String),
    /// Error when sending bytes to a device
    SendError(String),
    /// Error when connecting to a MIDI device
    ConnectionError(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::MalformedFrame => write!(f, "malformed MIDI frame"),
            MidiError::ProtocolViolation(msg) => write!(f, "protocol violation: {}", msg),
            MidiError::Timeout { event } => {
                write!(f, "exchange timed out waiting on event {}", event)
            }
            MidiError::TransportUnavailable(msg) => write!(f, "transport unavailable: {}", msg),
            MidiError::SendError(msg) => write!(f, "MIDI send error: {}", msg),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
        }
    }
}

impl Error for MidiError {}

impl From<&str> for MidiError {
    fn from(msg: &str) -> Self {
        MidiError::ConnectionError(msg.to_string())
    }
}

impl From<midir::InitError> for MidiError {
    fn from(err: midir::InitError) -> Self {
        MidiError::ConnectionError(err.to_string())
    }
}

impl<T> From<midir::ConnectError<T>> for MidiError {
    fn from(err: midir::ConnectError<T>) -> Self {
        MidiError::ConnectionError(err.to_string())
    }
}

impl From<midir::SendError> for MidiError {
    fn from(err: midir::SendError) -> Self {
        MidiError::SendError(err.to_string())
    }
}

impl From<midir::PortInfoError> for MidiError {
    fn from(err: midir::PortInfoError) -> Self {
        MidiError::ConnectionError(err.to_string())
    }
}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;
