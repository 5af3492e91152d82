use crate::error::{MidiError, Result};
use crate::transport::{Frame, FrameSink, FrameSource};
use crossbeam::channel::{unbounded, Receiver};
use log::{debug, info};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

/// Inbound transport over a real MIDI input port
pub struct MidirInput {
    #[allow(dead_code)]
    connection: MidiInputConnection<()>,
    rx: Option<Receiver<Frame>>,
}

impl MidirInput {
    /// Opens the first input port whose name contains `device_name`
    pub fn open(device_name: &str) -> Result<Self> {
        let mut midi_in = MidiInput::new("midiwire-in")?;
        midi_in.ignore(Ignore::None);

        let in_ports = midi_in.ports();
        let in_port = in_ports
            .iter()
            .find(|p| {
                midi_in
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(device_name)
            })
            .ok_or("Input device not found")?;

        info!(
            "Connecting to MIDI input port: {}",
            midi_in.port_name(in_port).unwrap_or_default()
        );

        let (tx, rx) = unbounded();
        let connection = midi_in.connect(
            in_port,
            "midiwire-input",
            move |stamp, message, _| {
                let _ = tx.send(Frame {
                    bytes: message.to_vec(),
                    timestamp: stamp,
                });
            },
            (),
        )?;

        Ok(MidirInput {
            connection,
            rx: Some(rx),
        })
    }
}

impl FrameSource for MidirInput {
    fn subscribe(&mut self) -> Result<Receiver<Frame>> {
        self.rx.take().ok_or_else(|| {
            MidiError::TransportUnavailable("input subscription already taken".to_string())
        })
    }
}

/// Outbound transport over a real MIDI output port
pub struct MidirOutput {
    connection: MidiOutputConnection,
}

impl MidirOutput {
    /// Opens the first output port whose name contains `device_name`
    pub fn open(device_name: &str) -> Result<Self> {
        let midi_out = MidiOutput::new("midiwire-out")?;

        let out_ports = midi_out.ports();
        let out_port = out_ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(device_name)
            })
            .ok_or("Output device not found")?;

        info!(
            "Connecting to MIDI output port: {}",
            midi_out.port_name(out_port).unwrap_or_default()
        );

        let connection = midi_out.connect(out_port, "midiwire-output")?;
        Ok(MidirOutput { connection })
    }
}

impl FrameSink for MidirOutput {
    fn send(&mut self, frame: &[u8], at: Option<u64>) -> Result<()> {
        if let Some(at) = at {
            // midir has no scheduled output; send now and note the request
            debug!("scheduled send at t={} not supported, sending immediately", at);
        }
        self.connection.send(frame)?;
        Ok(())
    }
}
