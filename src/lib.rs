//! MIDI wire-protocol engine
//!
//! This crate provides the protocol core for talking raw MIDI:
//! - [`message`] and [`builder`]: a stateless codec between byte frames and
//!   structured message views, plus well-formed outbound frame builders
//! - [`state`]: a per-channel/per-device tracker folding decoded messages
//!   into a live snapshot (notes, controllers, pressure, bend, sustain hold)
//! - [`exchange`]: a timeout-driven request/response machine for multi-step
//!   handshakes such as device-identity queries
//! - [`transport`]: the byte-in/byte-out seam, with a `midir`-backed adapter
//!   and a mock for tests

pub mod builder;
pub mod cli;
pub mod error;
pub mod exchange;
pub mod logging;
pub mod message;
pub mod state;
pub mod transport;

pub use error::{MidiError, Result};
pub use exchange::{DeviceIdentity, Exchange, ExchangeEvent, ExchangeOutcome, ResponseDescriptor};
pub use message::{Category, FrameOptions, ManufacturerId, Message, SysexQuery};
pub use state::{ChannelState, DeviceState, StateHandler};
