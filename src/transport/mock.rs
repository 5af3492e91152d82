use crate::error::{MidiError, Result};
use crate::transport::{Frame, FrameSink, FrameSource};
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// In-memory transport for tests: records every frame sent through its sink
/// and lets the test inject inbound frames into its source.
pub struct MockTransport {
    sent: Arc<Mutex<Vec<(Vec<u8>, Option<u64>)>>>,
    tx: Option<Sender<Frame>>,
    rx: Option<Receiver<Frame>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        MockTransport {
            sent: Arc::new(Mutex::new(Vec::new())),
            tx: Some(tx),
            rx: Some(rx),
        }
    }

    /// Outbound half, handed to the code under test
    pub fn sink(&self) -> MockSink {
        MockSink {
            sent: Arc::clone(&self.sent),
        }
    }

    /// Inbound half, handed to the code under test. Can be taken once.
    pub fn source(&mut self) -> MockSource {
        MockSource { rx: self.rx.take() }
    }

    /// Sender the test uses to inject inbound frames
    pub fn injector(&self) -> Sender<Frame> {
        self.tx
            .as_ref()
            .expect("mock transport already disconnected")
            .clone()
    }

    /// Simulates transport disconnection: all inbound senders are dropped and
    /// the subscription channel closes
    pub fn disconnect(&mut self) {
        self.tx = None;
    }

    /// Frames sent through the sink so far, in order
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(bytes, _)| bytes.clone())
            .collect()
    }

    /// Frames sent through the sink along with their requested send times
    pub fn sent_with_times(&self) -> Vec<(Vec<u8>, Option<u64>)> {
        self.sent.lock().unwrap().clone()
    }
}

pub struct MockSink {
    sent: Arc<Mutex<Vec<(Vec<u8>, Option<u64>)>>>,
}

impl FrameSink for MockSink {
    fn send(&mut self, frame: &[u8], at: Option<u64>) -> Result<()> {
        self.sent.lock().unwrap().push((frame.to_vec(), at));
        Ok(())
    }
}

pub struct MockSource {
    rx: Option<Receiver<Frame>>,
}

impl FrameSource for MockSource {
    fn subscribe(&mut self) -> Result<Receiver<Frame>> {
        self.rx.take().ok_or_else(|| {
            MidiError::TransportUnavailable("mock input subscription already taken".to_string())
        })
    }
}
