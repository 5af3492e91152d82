//! Request/response exchange over a transport pair
//!
//! An [`Exchange`] drives a multi-step handshake: each [`ExchangeEvent`] sends
//! one request frame and waits for its required responses, matched with the
//! codec's wildcard rules, under a single-shot per-event timeout. The machine
//! moves `Idle → Running → Completed | Failed`, runs at most once, and never
//! blocks the caller: `start()` returns a receiver that delivers the terminal
//! outcome.

use crate::error::{MidiError, Result};
use crate::message::{ManufacturerId, Message, SysexQuery};
use crate::transport::{Frame, FrameSink, FrameSource};
use crossbeam::channel::{after, bounded, Receiver};
use crossbeam::select;
use log::{debug, warn};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Per-event timeout applied when none is configured explicitly
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);

/// Identity of the device an exchange talks to. Supplies the defaults for
/// descriptors that omit a manufacturer or device id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub manufacturer: ManufacturerId,
    pub device: u8,
}

/// One required response within an exchange event. Omitted fields fall back
/// to the owning device's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseDescriptor {
    pub manufacturer: Option<ManufacturerId>,
    pub device: Option<u8>,
    pub header: Option<Vec<u8>>,
}

impl ResponseDescriptor {
    fn query(&self, identity: &DeviceIdentity) -> SysexQuery {
        SysexQuery {
            manufacturer: self.manufacturer.unwrap_or(identity.manufacturer),
            device: Some(self.device.unwrap_or(identity.device)),
            header: self.header.clone(),
        }
    }
}

/// One request-and-expected-responses step of a handshake. An empty `expects`
/// list means the next inbound frame of any shape completes the event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeEvent {
    pub request: Vec<u8>,
    pub expects: Vec<ResponseDescriptor>,
}

/// Matching state for the event currently being serviced.
///
/// Descriptors are consumed in caller-supplied order: the first remaining
/// descriptor that matches an inbound frame captures it. Callers with
/// overlapping descriptors must therefore order them by priority.
pub struct EventProgress {
    remaining: Vec<SysexQuery>,
    wants_any: bool,
    captured: Vec<Message>,
}

impl EventProgress {
    pub fn new(event: &ExchangeEvent, identity: &DeviceIdentity) -> Self {
        Self {
            remaining: event.expects.iter().map(|d| d.query(identity)).collect(),
            wants_any: event.expects.is_empty(),
            captured: Vec::new(),
        }
    }

    /// Offers an inbound message; returns true once the event is complete
    pub fn offer(&mut self, msg: Message) -> bool {
        if self.wants_any {
            self.captured.push(msg);
            self.wants_any = false;
            return true;
        }
        if let Some(pos) = self.remaining.iter().position(|q| msg.matches(q)) {
            self.remaining.remove(pos);
            self.captured.push(msg);
        }
        self.remaining.is_empty()
    }

    pub fn captured(&self) -> &[Message] {
        &self.captured
    }

    fn into_captured(self) -> Vec<Message> {
        self.captured
    }
}

/// Lifecycle phase of an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Terminal result delivered to the caller exactly once
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    /// Every event completed; all captured responses in arrival order
    Completed(Vec<Message>),
    /// The exchange failed on `event`. `responses` holds the captures from
    /// strictly prior, completed events; partial captures of the failing
    /// event are discarded.
    Failed {
        event: usize,
        error: MidiError,
        responses: Vec<Message>,
    },
}

/// A single-use request/response exchange bound to one transport pair
pub struct Exchange {
    identity: DeviceIdentity,
    events: Vec<ExchangeEvent>,
    timeout: Duration,
    phase: Arc<Mutex<Phase>>,
    transport: Option<(Box<dyn FrameSink>, Box<dyn FrameSource>)>,
}

impl Exchange {
    pub fn new(
        identity: DeviceIdentity,
        sink: Box<dyn FrameSink>,
        source: Box<dyn FrameSource>,
        events: Vec<ExchangeEvent>,
    ) -> Self {
        Self {
            identity,
            events,
            timeout: DEFAULT_TIMEOUT,
            phase: Arc::new(Mutex::new(Phase::Idle)),
            transport: Some((sink, source)),
        }
    }

    /// Overrides the per-event timeout for this instance
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock().unwrap()
    }

    /// Starts the exchange. Valid only once, from `Idle`, with at least one
    /// queued event; anything else is a `ProtocolViolation`. Returns
    /// immediately with a receiver that delivers the terminal outcome.
    pub fn start(&mut self) -> Result<Receiver<ExchangeOutcome>> {
        {
            let mut phase = self.phase.lock().unwrap();
            if *phase != Phase::Idle {
                return Err(MidiError::ProtocolViolation(format!(
                    "start() called in phase {:?}",
                    *phase
                )));
            }
            if self.events.is_empty() {
                return Err(MidiError::ProtocolViolation(
                    "no exchange events queued".to_string(),
                ));
            }
            *phase = Phase::Running;
        }

        let (mut sink, mut source) = self
            .transport
            .take()
            .expect("transport present in Idle phase");

        // The one subscription this exchange holds while running. The driver
        // thread owns the receiver and drops it on its way out, which is the
        // single release point.
        let frames = match source.subscribe() {
            Ok(frames) => frames,
            Err(err) => {
                *self.phase.lock().unwrap() = Phase::Failed;
                return Err(err);
            }
        };

        let (done_tx, done_rx) = bounded(1);
        let phase = Arc::clone(&self.phase);
        let identity = self.identity;
        let events = self.events.clone();
        let timeout = self.timeout;

        thread::spawn(move || {
            let outcome = run_events(&events, &identity, timeout, sink.as_mut(), &frames);
            *phase.lock().unwrap() = match outcome {
                ExchangeOutcome::Completed(_) => Phase::Completed,
                ExchangeOutcome::Failed { .. } => Phase::Failed,
            };
            let _ = done_tx.send(outcome);
            // The transport pair lives until the terminal transition; dropping
            // it here releases the subscription exactly once.
            drop(source);
            drop(sink);
        });

        Ok(done_rx)
    }
}

fn run_events(
    events: &[ExchangeEvent],
    identity: &DeviceIdentity,
    timeout: Duration,
    sink: &mut dyn FrameSink,
    frames: &Receiver<Frame>,
) -> ExchangeOutcome {
    let mut responses = Vec::new();

    for (index, event) in events.iter().enumerate() {
        debug!(
            "arming exchange event {} ({} byte request, {} descriptor(s))",
            index,
            event.request.len(),
            event.expects.len()
        );
        if let Err(error) = sink.send(&event.request, None) {
            return ExchangeOutcome::Failed {
                event: index,
                error,
                responses,
            };
        }

        let mut progress = EventProgress::new(event, identity);
        // Single-shot timer for this event; dropped (cancelled) when the
        // event completes, so it can never fire against a later index.
        let deadline = after(timeout);
        loop {
            let inbound = select! {
                recv(frames) -> frame => frame,
                recv(deadline) -> _ => {
                    warn!("exchange event {} timed out after {:?}", index, timeout);
                    return ExchangeOutcome::Failed {
                        event: index,
                        error: MidiError::Timeout { event: index },
                        responses,
                    };
                }
            };

            let frame = match inbound {
                Ok(frame) => frame,
                Err(_) => {
                    return ExchangeOutcome::Failed {
                        event: index,
                        error: MidiError::TransportUnavailable(
                            "input closed while exchange was running".to_string(),
                        ),
                        responses,
                    };
                }
            };
            match Message::new(frame.bytes, frame.timestamp) {
                Ok(msg) => {
                    if progress.offer(msg) {
                        break;
                    }
                }
                Err(err) => warn!("dropping inbound frame: {}", err),
            }
        }
        responses.extend(progress.into_captured());
    }

    debug!(
        "exchange completed with {} captured response(s)",
        responses.len()
    );
    ExchangeOutcome::Completed(responses)
}
