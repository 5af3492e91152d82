use midiwire::builder;

#[test]
fn test_channel_voice_frames_are_bit_exact() {
    assert_eq!(builder::note_on(0, 60, 100), vec![0x90, 60, 100]);
    assert_eq!(builder::note_off(9, 38, 64), vec![0x89, 38, 64]);
    assert_eq!(builder::control_change(15, 64, 127), vec![0xBF, 64, 127]);
    assert_eq!(builder::program_change(2, 12), vec![0xC2, 12]);
}

#[test]
fn test_channel_and_data_bytes_are_masked() {
    // Channel 16 wraps to 0, data bytes lose their high bit
    assert_eq!(builder::note_on(16, 0x80 | 60, 0x80 | 100), vec![0x90, 60, 100]);
}

#[test]
fn test_pitch_bend_encoding() {
    assert_eq!(builder::pitch_bend(0, 0), vec![0xE0, 0x00, 0x40]);
    assert_eq!(builder::pitch_bend(0, -8192), vec![0xE0, 0x00, 0x00]);
    assert_eq!(builder::pitch_bend(0, 8191), vec![0xE0, 0x7F, 0x7F]);
    // Out-of-range values clamp instead of wrapping into a status byte
    assert_eq!(builder::pitch_bend(0, i16::MAX), vec![0xE0, 0x7F, 0x7F]);
    assert_eq!(builder::pitch_bend(0, i16::MIN), vec![0xE0, 0x00, 0x00]);
}

#[test]
fn test_universal_sysex_layout() {
    assert_eq!(
        builder::universal_non_realtime(0x10, 0x06, Some(0x01), &[]),
        vec![0xF0, 0x7E, 0x10, 0x06, 0x01, 0xF7]
    );
    assert_eq!(
        builder::universal_realtime(0x7F, 0x04, Some(0x01), &[0x00, 0x64]),
        vec![0xF0, 0x7F, 0x7F, 0x04, 0x01, 0x00, 0x64, 0xF7]
    );
    // sub-id 2 is optional
    assert_eq!(
        builder::universal_non_realtime(0x01, 0x7B, None, &[]),
        vec![0xF0, 0x7E, 0x01, 0x7B, 0xF7]
    );
}

#[test]
fn test_identity_request() {
    assert_eq!(
        builder::identity_request(0x7F),
        vec![0xF0, 0x7E, 0x7F, 0x06, 0x01, 0xF7]
    );
}

#[test]
fn test_rpn_emits_address_before_value() {
    // Three CC triplets: parameter MSB (CC101), parameter LSB (CC100), value
    assert_eq!(
        builder::rpn(0, 0x00, 0x02, 40),
        vec![0xB0, 101, 0x00, 0xB0, 100, 0x02, 0xB0, 6, 40]
    );
}

#[test]
fn test_rpn_14bit_appends_value_lsb() {
    let value = 1000u16; // 0x03E8 = MSB 7, LSB 104
    assert_eq!(
        builder::rpn_14bit(1, 0x00, 0x00, value),
        vec![0xB1, 101, 0x00, 0xB1, 100, 0x00, 0xB1, 6, 7, 0xB1, 38, 104]
    );
}

#[test]
fn test_nrpn_uses_its_own_address_controllers() {
    assert_eq!(
        builder::nrpn(4, 0x10, 0x20, 5),
        vec![0xB4, 99, 0x10, 0xB4, 98, 0x20, 0xB4, 6, 5]
    );
    assert_eq!(
        builder::nrpn_14bit(4, 0x10, 0x20, 129),
        vec![0xB4, 99, 0x10, 0xB4, 98, 0x20, 0xB4, 6, 1, 0xB4, 38, 1]
    );
}

#[test]
fn test_rpn_null_terminator() {
    assert_eq!(
        builder::rpn_null(0),
        vec![0xB0, 101, 0x7F, 0xB0, 100, 0x7F]
    );
}
