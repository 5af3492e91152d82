//! Outbound frame builders
//!
//! Pure functions assembling well-formed wire frames. Channel numbers are
//! masked to 4 bits and data bytes to 7 bits, so a caller can never produce a
//! stray status byte mid-frame.

use crate::message::status;

/// Sub-id byte for universal non-realtime sysex (0x7E family)
pub const NON_REALTIME: u8 = 0x7E;
/// Sub-id byte for universal realtime sysex (0x7F family)
pub const REALTIME: u8 = 0x7F;

// Controller numbers used by the parameter-number sequences
const DATA_ENTRY_MSB: u8 = 6;
const DATA_ENTRY_LSB: u8 = 38;
const NRPN_LSB: u8 = 98;
const NRPN_MSB: u8 = 99;
const RPN_LSB: u8 = 100;
const RPN_MSB: u8 = 101;

pub fn note_on(channel: u8, note: u8, velocity: u8) -> Vec<u8> {
    vec![
        status::NOTE_ON | (channel & 0x0F),
        note & 0x7F,
        velocity & 0x7F,
    ]
}

pub fn note_off(channel: u8, note: u8, velocity: u8) -> Vec<u8> {
    vec![
        status::NOTE_OFF | (channel & 0x0F),
        note & 0x7F,
        velocity & 0x7F,
    ]
}

pub fn control_change(channel: u8, controller: u8, value: u8) -> Vec<u8> {
    vec![
        status::CONTROL_CHANGE | (channel & 0x0F),
        controller & 0x7F,
        value & 0x7F,
    ]
}

pub fn program_change(channel: u8, program: u8) -> Vec<u8> {
    vec![status::PROGRAM_CHANGE | (channel & 0x0F), program & 0x7F]
}

/// Builds a pitch-bend frame from a zero-centered value in -8192..=8191
pub fn pitch_bend(channel: u8, bend: i16) -> Vec<u8> {
    let raw = (bend.clamp(-8192, 8191) + 8192) as u16;
    vec![
        status::PITCH_BEND | (channel & 0x0F),
        (raw % 128) as u8,
        (raw / 128) as u8,
    ]
}

fn universal(realtime_byte: u8, device: u8, sub_id1: u8, sub_id2: Option<u8>, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![status::SYSEX, realtime_byte, device & 0x7F, sub_id1 & 0x7F];
    if let Some(sub_id2) = sub_id2 {
        frame.push(sub_id2 & 0x7F);
    }
    frame.extend(payload.iter().map(|b| b & 0x7F));
    frame.push(status::EOX);
    frame
}

/// Universal non-realtime sysex frame: `F0 7E dev sub1 [sub2] payload F7`
pub fn universal_non_realtime(device: u8, sub_id1: u8, sub_id2: Option<u8>, payload: &[u8]) -> Vec<u8> {
    universal(NON_REALTIME, device, sub_id1, sub_id2, payload)
}

/// Universal realtime sysex frame: `F0 7F dev sub1 [sub2] payload F7`
pub fn universal_realtime(device: u8, sub_id1: u8, sub_id2: Option<u8>, payload: &[u8]) -> Vec<u8> {
    universal(REALTIME, device, sub_id1, sub_id2, payload)
}

/// General-information identity request for the addressed device
pub fn identity_request(device: u8) -> Vec<u8> {
    universal_non_realtime(device, 0x06, Some(0x01), &[])
}

// Receivers require the parameter address to arrive before the value, in this
// exact controller order. The four sequences below only differ in the address
// controllers and in whether a value LSB triplet is appended.
fn parameter(channel: u8, msb_ctl: u8, lsb_ctl: u8, msb: u8, lsb: u8, value: u8, value_lsb: Option<u8>) -> Vec<u8> {
    let mut frame = control_change(channel, msb_ctl, msb);
    frame.extend(control_change(channel, lsb_ctl, lsb));
    frame.extend(control_change(channel, DATA_ENTRY_MSB, value));
    if let Some(value_lsb) = value_lsb {
        frame.extend(control_change(channel, DATA_ENTRY_LSB, value_lsb));
    }
    frame
}

/// Registered parameter write with a 7-bit value (three CC triplets)
pub fn rpn(channel: u8, msb: u8, lsb: u8, value: u8) -> Vec<u8> {
    parameter(channel, RPN_MSB, RPN_LSB, msb, lsb, value, None)
}

/// Registered parameter write with a 14-bit value (four CC triplets)
pub fn rpn_14bit(channel: u8, msb: u8, lsb: u8, value: u16) -> Vec<u8> {
    let value = value.min(0x3FFF);
    parameter(
        channel,
        RPN_MSB,
        RPN_LSB,
        msb,
        lsb,
        (value / 128) as u8,
        Some((value % 128) as u8),
    )
}

/// Non-registered parameter write with a 7-bit value
pub fn nrpn(channel: u8, msb: u8, lsb: u8, value: u8) -> Vec<u8> {
    parameter(channel, NRPN_MSB, NRPN_LSB, msb, lsb, value, None)
}

/// Non-registered parameter write with a 14-bit value
pub fn nrpn_14bit(channel: u8, msb: u8, lsb: u8, value: u16) -> Vec<u8> {
    let value = value.min(0x3FFF);
    parameter(
        channel,
        NRPN_MSB,
        NRPN_LSB,
        msb,
        lsb,
        (value / 128) as u8,
        Some((value % 128) as u8),
    )
}

/// Null parameter terminator: sets RPN MSB/LSB to 0x7F/0x7F, exiting
/// addressing mode so later data entry cannot hit a stale parameter
pub fn rpn_null(channel: u8) -> Vec<u8> {
    let mut frame = control_change(channel, RPN_MSB, 0x7F);
    frame.extend(control_change(channel, RPN_LSB, 0x7F));
    frame
}
