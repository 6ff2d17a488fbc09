//! Building the LED/rumble command reports.

/// Length of the DS3 0x01 output report.
pub const DS3_OUTPUT_LEN: usize = 48;

/// Length of the DS4 0x02 output report.
pub const DS4_OUTPUT_LEN: usize = 32;

// The 0x01 report template. The four five-byte groups are per-LED
// timing/brightness descriptors; their fixed bytes go out verbatim.
const OUTPUT_01_REPORT: [u8; DS3_OUTPUT_LEN] = [
    0x00, //
    0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, //
    0x02, //
    0xFF, 0x27, 0x10, 0x00, 0x32, //
    0xFF, 0x27, 0x10, 0x00, 0x32, //
    0xFF, 0x27, 0x10, 0x00, 0x32, //
    0xFF, 0x27, 0x10, 0x00, 0x32, //
    0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00,
];

/// Build a DS3 0x01 output report: motor durations and powers, the
/// player-LED mask, and blink timing on each LED when `led[3]` is set.
///
/// Sent as a control-out SET_REPORT with report type OUTPUT, id 0x01.
pub fn ds3_output_report(
    led: &[u8; 4],
    lrum: u8,
    rrum: u8,
) -> [u8; DS3_OUTPUT_LEN] {
    let mut buf = OUTPUT_01_REPORT;

    buf[1] = 0xFE; // right motor duration
    buf[2] = rrum; // right motor power
    buf[3] = 0xFE; // left motor duration
    buf[4] = lrum; // left motor power

    buf[9] = led[0] & 0x7F;

    if led[3] != 0 {
        // charging: blink each player LED
        buf[13] = 0x32;
        buf[18] = 0x32;
        buf[23] = 0x32;
        buf[28] = 0x32;
    }

    buf
}

/// Build a DS4 0x02 output report: feature-enable mask, rumble, the
/// lightbar colour, and flash timing when `led[3]` is set.
///
/// Sent over the interrupt OUT endpoint.
pub fn ds4_output_report(
    led: &[u8; 4],
    lrum: u8,
    rrum: u8,
) -> [u8; DS4_OUTPUT_LEN] {
    let mut buf = [0u8; DS4_OUTPUT_LEN];

    buf[0] = 0x02;
    buf[1] = 0xFF; // enable rumble, lightbar and flash

    buf[4] = rrum;
    buf[5] = lrum;

    buf[6] = led[0]; // r
    buf[7] = led[1]; // g
    buf[8] = led[2]; // b

    if led[3] != 0 {
        buf[9] = 0x80; // time to flash bright (255 = 2.5s)
        buf[10] = 0x80; // time to flash dark
    }

    buf
}

#[cfg(all(test, feature = "std"))]
#[path = "tests/output.rs"]
mod tests;
