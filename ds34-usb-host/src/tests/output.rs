use super::*;

#[test]
fn ds3_report_carries_rumble_and_led() {
    let report = ds3_output_report(&[0x04, 0, 0, 0], 0x40, 0x80);
    assert_eq!(report.len(), DS3_OUTPUT_LEN);
    assert_eq!(report[1], 0xFE);
    assert_eq!(report[2], 0x80);
    assert_eq!(report[3], 0xFE);
    assert_eq!(report[4], 0x40);
    assert_eq!(report[9], 0x04);
    // No blink: the per-LED descriptors keep their template bytes
    assert_eq!(&report[10..15], &[0xFF, 0x27, 0x10, 0x00, 0x32]);
    assert_eq!(report[13], 0x00);
}

#[test]
fn ds3_led_mask_is_clamped() {
    let report = ds3_output_report(&[0xFF, 0, 0, 0], 0, 0);
    assert_eq!(report[9], 0x7F);
}

#[test]
fn ds3_blink_patches_each_led() {
    let report = ds3_output_report(&[0x02, 0, 0, 1], 0, 0);
    assert_eq!(report[13], 0x32);
    assert_eq!(report[18], 0x32);
    assert_eq!(report[23], 0x32);
    assert_eq!(report[28], 0x32);
}

#[test]
fn ds3_template_tail_is_zero() {
    let report = ds3_output_report(&[0x02, 0, 0, 0], 0, 0);
    assert!(report[30..].iter().all(|&b| b == 0));
}

#[test]
fn ds4_report_carries_rumble_and_colour() {
    let report = ds4_output_report(&[0x10, 0x20, 0x30, 0], 0x40, 0x80);
    assert_eq!(report.len(), DS4_OUTPUT_LEN);
    assert_eq!(report[0], 0x02);
    assert_eq!(report[1], 0xFF);
    assert_eq!(report[4], 0x80);
    assert_eq!(report[5], 0x40);
    assert_eq!(&report[6..9], &[0x10, 0x20, 0x30]);
    assert_eq!(report[9], 0x00);
    assert_eq!(report[10], 0x00);
}

#[test]
fn ds4_blink_sets_flash_times() {
    let report = ds4_output_report(&[0, 0, 0x7F, 1], 0, 0);
    assert_eq!(report[9], 0x80);
    assert_eq!(report[10], 0x80);
}
