use super::*;

/// A DS3 input transfer with everything released, sticks centred, full
/// battery.
fn ds3_raw() -> [u8; 49] {
    let mut raw = [0u8; 49];
    raw[0] = 0x01; // report id
    raw[2] = 0xFF; // device sends buttons inverted
    raw[3] = 0xFF;
    raw[6] = 0x80;
    raw[7] = 0x80;
    raw[8] = 0x80;
    raw[9] = 0x80;
    raw[30] = 0x05; // full battery
    raw
}

/// A DS4 input transfer with everything released: D-pad neutral, both
/// fingers lifted, full battery on USB power.
fn ds4_raw() -> [u8; 64] {
    let mut raw = [0u8; 64];
    raw[0] = 0x01; // report id
    raw[1] = 0x80;
    raw[2] = 0x80;
    raw[3] = 0x80;
    raw[4] = 0x80;
    raw[5] = 0x08; // D-pad neutral
    raw[30] = 0x1B; // full battery, USB plugged
    raw[35] = 0x80; // finger 1 lifted
    raw[39] = 0x80; // finger 2 lifted
    raw
}

#[test]
fn ds3_buttons_and_pressures() {
    let mut raw = ds3_raw();
    raw[2] = 0xFE; // Select pressed
    raw[8] = 0x80;
    raw[24] = 0x42; // Cross pressure

    let report = InputReport::parse(PadModel::Ds3, &raw).unwrap();
    let data = report.unified();
    assert_eq!(data[0], 0x01);
    assert_eq!(data[1], 0x00);
    assert_eq!(data[2], 0x80);
    assert_eq!(data[12], 0x42);
}

#[test]
fn ds3_field_positions() {
    let mut raw = ds3_raw();
    raw[6] = 10; // left stick X
    raw[7] = 11;
    raw[8] = 12; // right stick X
    raw[9] = 13;
    for (i, b) in (14..26).zip(20u8..) {
        raw[i] = b;
    }

    let data = InputReport::parse(PadModel::Ds3, &raw).unwrap().unified();
    // Sticks: right pair first in the unified vector
    assert_eq!(&data[2..6], &[12, 13, 10, 11]);
    // D-pad pressures reorder to right, left, up, down
    assert_eq!(&data[6..10], &[21, 23, 20, 22]);
    // Face buttons: triangle, circle, cross, square
    assert_eq!(&data[10..14], &[28, 29, 30, 31]);
    // Shoulders: L1, R1, L2, R2
    assert_eq!(&data[14..18], &[26, 27, 24, 25]);
}

#[test]
fn ds3_battery_led_when_ps_held() {
    let mut raw = ds3_raw();
    raw[4] = 0x01; // PS held
    raw[30] = 0x03;
    let report = InputReport::parse(PadModel::Ds3, &raw).unwrap();
    assert_eq!(report.led_state(0), [0x06, 0, 0, 0]);
}

#[test]
fn ds3_normal_led_when_ps_released() {
    let raw = ds3_raw();
    let report = InputReport::parse(PadModel::Ds3, &raw).unwrap();
    assert_eq!(report.led_state(0), [0x02, 0, 0, 0]);
    assert_eq!(report.led_state(1), [0x04, 0, 0, 0]);
}

#[test]
fn ds3_charging_blinks() {
    let mut raw = ds3_raw();
    raw[4] = 0x01; // PS held, but charging wins
    raw[30] = 0xEE;
    let report = InputReport::parse(PadModel::Ds3, &raw).unwrap();
    assert_eq!(report.led_state(0), [0x02, 0, 0, 1]);
}

#[test]
fn ds3_out_of_table_power_keeps_pattern() {
    let mut raw = ds3_raw();
    raw[4] = 0x01;
    raw[30] = 0x09;
    let report = InputReport::parse(PadModel::Ds3, &raw).unwrap();
    assert_eq!(report.led_state(0)[0], 0x02);
}

#[test]
fn ds4_dpad_and_cross() {
    let mut raw = ds4_raw();
    raw[5] = 0x03 | 0x20; // D-pad south-east, Cross
    raw[7] = 0x02; // touchpad clicked
    raw[35] = 0x00; // finger 1 down...
    raw[36] = 0xF4; // ...at X = 500
    raw[37] = 0x01;

    let report = InputReport::parse(PadModel::Ds4, &raw).unwrap();
    let data = report.unified();
    assert_eq!(data[0] & 0x01, 0); // Share synthesized from the touch
    assert_eq!(data[1] & 0x40, 0); // Cross pressed
    assert_eq!(data[6], 255); // right
    assert_eq!(data[9], 255); // down
    assert_eq!(data[12], 255); // synthesized Cross pressure
    assert_eq!(data[16], 0x00); // L2 analog passes through
}

#[test]
fn ds4_dpad_table() {
    // (value, up, right, down, left)
    let cases = [
        (0u8, true, false, false, false),
        (1, true, true, false, false),
        (2, false, true, false, false),
        (3, false, true, true, false),
        (4, false, false, true, false),
        (5, false, false, true, true),
        (6, false, false, false, true),
        (7, true, false, false, true),
        (8, false, false, false, false),
    ];
    for (value, up, right, down, left) in cases {
        let mut raw = ds4_raw();
        raw[5] = value;
        let data = InputReport::parse(PadModel::Ds4, &raw).unwrap().unified();
        assert_eq!(data[8] == 255, up, "dpad {}", value);
        assert_eq!(data[6] == 255, right, "dpad {}", value);
        assert_eq!(data[9] == 255, down, "dpad {}", value);
        assert_eq!(data[7] == 255, left, "dpad {}", value);
        // Bits 4..8 of byte 0 mirror the synthesized pressures
        assert_eq!(data[0] & 0x10 == 0, up, "dpad {}", value);
        assert_eq!(data[0] & 0x20 == 0, right, "dpad {}", value);
        assert_eq!(data[0] & 0x40 == 0, down, "dpad {}", value);
        assert_eq!(data[0] & 0x80 == 0, left, "dpad {}", value);
    }
}

#[test]
fn ds4_touchpad_halves_map_to_share_and_option() {
    let mut raw = ds4_raw();
    raw[7] = 0x02; // touchpad clicked
    raw[35] = 0x00; // finger 1 at X = 500
    raw[36] = 0xF4;
    raw[37] = 0x01;
    raw[39] = 0x01; // finger 2 at X = 1500 (id 1)
    raw[40] = 0xDC;
    raw[41] = 0x05;

    let data = InputReport::parse(PadModel::Ds4, &raw).unwrap().unified();
    assert_eq!(data[0] & 0x01, 0); // Share
    assert_eq!(data[0] & 0x08, 0); // Option
}

#[test]
fn ds4_unclicked_touchpad_is_inert() {
    let mut raw = ds4_raw();
    raw[35] = 0x00; // finger down but pad not clicked
    raw[36] = 0xF4;
    raw[37] = 0x01;

    let data = InputReport::parse(PadModel::Ds4, &raw).unwrap().unified();
    assert_eq!(data[0], 0xFF);
}

#[test]
fn ds4_lifted_fingers_are_inert() {
    let mut raw = ds4_raw();
    raw[7] = 0x02; // clicked, but neither finger present

    let data = InputReport::parse(PadModel::Ds4, &raw).unwrap().unified();
    assert_eq!(data[0], 0xFF);
}

#[test]
fn ds4_shoulder_bits_synthesize_pressures() {
    let mut raw = ds4_raw();
    raw[6] = 0x01 | 0x04; // L1, L2
    raw[8] = 0x55; // L2 analog

    let data = InputReport::parse(PadModel::Ds4, &raw).unwrap().unified();
    assert_eq!(data[1] & 0x04, 0); // L1
    assert_eq!(data[1] & 0x01, 0); // L2
    assert_eq!(data[14], 255);
    assert_eq!(data[16], 0x55);
}

#[test]
fn ds4_battery_led_when_ps_held() {
    let mut raw = ds4_raw();
    raw[7] = 0x01; // PS held
    raw[12] = 0x42;
    let report = InputReport::parse(PadModel::Ds4, &raw).unwrap();
    assert_eq!(report.led_state(0), [0x42, 0, 0, 0]);
}

#[test]
fn ds4_normal_led_when_ps_released() {
    let report = InputReport::parse(PadModel::Ds4, &ds4_raw()).unwrap();
    assert_eq!(report.led_state(0), [0x00, 0x00, 0x7F, 0]);
    assert_eq!(report.led_state(1), [0x00, 0x7F, 0x00, 0]);
}

#[test]
fn ds4_charging_blinks() {
    let mut raw = ds4_raw();
    raw[30] = 0x12; // charging on USB power
    let report = InputReport::parse(PadModel::Ds4, &raw).unwrap();
    assert_eq!(report.led_state(0)[3], 1);
}

#[test]
fn ds4_unplugged_does_not_blink() {
    let mut raw = ds4_raw();
    raw[30] = 0x02; // low battery, not plugged
    let report = InputReport::parse(PadModel::Ds4, &raw).unwrap();
    assert_eq!(report.led_state(0)[3], 0);
}

#[test]
fn empty_poll_is_discarded() {
    let mut raw = ds3_raw();
    raw[0] = 0x00;
    assert!(InputReport::parse(PadModel::Ds3, &raw).is_none());
    let mut raw = ds4_raw();
    raw[0] = 0x00;
    assert!(InputReport::parse(PadModel::Ds4, &raw).is_none());
}

#[test]
fn truncated_reports_are_discarded() {
    let raw = ds3_raw();
    assert!(InputReport::parse(PadModel::Ds3, &raw[..30]).is_none());
    let raw = ds4_raw();
    assert!(InputReport::parse(PadModel::Ds4, &raw[..42]).is_none());
    assert!(InputReport::parse(PadModel::Ds4, &[]).is_none());
}
