//! Decoding the two input-report layouts into the unified vector.
//!
//! Both decoders work byte-by-byte off the raw transfer buffer; the
//! layouts are bit-packed and differ completely between the models, so
//! there is nothing to gain from an overlay struct.

use crate::pad::{PadModel, LED_PATTERNS, POWER_LEVEL, RGB_PATTERNS};

/// DS3 power code meaning "charging".
const DS3_POWER_CHARGING: u8 = 0xEE;

/// DS4 power code meaning fully charged; anything else on USB power is
/// still charging.
const DS4_POWER_FULL: u8 = 0x0B;

/// Horizontal midpoint of the 1920-wide DS4 touch surface. Touches left
/// of it act as Share, right of it as Option.
const TOUCHPAD_MID_X: u16 = 960;

/// (up, right, down, left) for each of the eight compass points the DS4
/// D-pad reports, clockwise from north. The out-of-table value 8 is
/// neutral.
const DPAD_DIRECTIONS: [(bool, bool, bool, bool); 8] = [
    (true, false, false, false),
    (true, true, false, false),
    (false, true, false, false),
    (false, true, true, false),
    (false, false, true, false),
    (false, false, true, true),
    (false, false, false, true),
    (true, false, false, true),
];

/// A decoded DS3 input report.
///
/// The field block starts two bytes into the transfer buffer. Button
/// state arrives as two already-inverted bitmask bytes plus a pressure
/// byte per button; the power byte doubles as the charge indicator.
pub struct Ds3Report {
    buttons_low: u8,
    buttons_high: u8,
    ps_button: bool,
    left_stick_x: u8,
    left_stick_y: u8,
    right_stick_x: u8,
    right_stick_y: u8,
    pressure_up: u8,
    pressure_right: u8,
    pressure_down: u8,
    pressure_left: u8,
    pressure_l2: u8,
    pressure_r2: u8,
    pressure_l1: u8,
    pressure_r1: u8,
    pressure_triangle: u8,
    pressure_circle: u8,
    pressure_cross: u8,
    pressure_square: u8,
    power: u8,
}

impl Ds3Report {
    // Through the power byte, the furthest field we read
    const MIN_LEN: usize = 31;

    fn parse(raw: &[u8]) -> Option<Self> {
        if raw.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            buttons_low: raw[2],
            buttons_high: raw[3],
            ps_button: (raw[4] & 0x01) != 0,
            left_stick_x: raw[6],
            left_stick_y: raw[7],
            right_stick_x: raw[8],
            right_stick_y: raw[9],
            pressure_up: raw[14],
            pressure_right: raw[15],
            pressure_down: raw[16],
            pressure_left: raw[17],
            pressure_l2: raw[18],
            pressure_r2: raw[19],
            pressure_l1: raw[20],
            pressure_r1: raw[21],
            pressure_triangle: raw[22],
            pressure_circle: raw[23],
            pressure_cross: raw[24],
            pressure_square: raw[25],
            power: raw[30],
        })
    }

    fn unified(&self) -> [u8; 18] {
        [
            !self.buttons_low,
            !self.buttons_high,
            self.right_stick_x,
            self.right_stick_y,
            self.left_stick_x,
            self.left_stick_y,
            self.pressure_right,
            self.pressure_left,
            self.pressure_up,
            self.pressure_down,
            self.pressure_triangle,
            self.pressure_circle,
            self.pressure_cross,
            self.pressure_square,
            self.pressure_l1,
            self.pressure_r1,
            self.pressure_l2,
            self.pressure_r2,
        ]
    }

    fn led_state(&self, slot: usize) -> [u8; 4] {
        let normal = LED_PATTERNS[slot];
        let charging = self.power == DS3_POWER_CHARGING;
        let primary = if self.ps_button && !charging {
            POWER_LEVEL
                .get(self.power as usize)
                .copied()
                .unwrap_or(normal)
        } else {
            normal
        };
        [primary, 0, 0, charging as u8]
    }
}

/// One touchpad finger record: an active-low flag plus a 12-bit X.
struct TouchFinger {
    active: bool,
    x: u16,
}

impl TouchFinger {
    fn parse(raw: &[u8]) -> Self {
        Self {
            active: (raw[0] & 0x80) == 0,
            x: u16::from(raw[1]) | (u16::from(raw[2] & 0x0F) << 8),
        }
    }
}

/// A decoded DS4 input report.
///
/// Buttons arrive as single bits (the D-pad as a direction nibble), so
/// most pressures in the unified vector are synthesized; only L2/R2 are
/// analog on this model.
pub struct Ds4Report {
    left_stick_x: u8,
    left_stick_y: u8,
    right_stick_x: u8,
    right_stick_y: u8,
    dpad: u8,
    square: bool,
    cross: bool,
    circle: bool,
    triangle: bool,
    l1: bool,
    r1: bool,
    l2: bool,
    r2: bool,
    share: bool,
    option: bool,
    l3: bool,
    r3: bool,
    ps_button: bool,
    tpad: bool,
    pressure_l2: u8,
    pressure_r2: u8,
    battery: u8,
    power: u8,
    usb_plugged: bool,
    finger1: TouchFinger,
    finger2: TouchFinger,
}

impl Ds4Report {
    // Through the second finger record
    const MIN_LEN: usize = 43;

    fn parse(raw: &[u8]) -> Option<Self> {
        if raw.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            left_stick_x: raw[1],
            left_stick_y: raw[2],
            right_stick_x: raw[3],
            right_stick_y: raw[4],
            dpad: raw[5] & 0x0F,
            square: (raw[5] & 0x10) != 0,
            cross: (raw[5] & 0x20) != 0,
            circle: (raw[5] & 0x40) != 0,
            triangle: (raw[5] & 0x80) != 0,
            l1: (raw[6] & 0x01) != 0,
            r1: (raw[6] & 0x02) != 0,
            l2: (raw[6] & 0x04) != 0,
            r2: (raw[6] & 0x08) != 0,
            share: (raw[6] & 0x10) != 0,
            option: (raw[6] & 0x20) != 0,
            l3: (raw[6] & 0x40) != 0,
            r3: (raw[6] & 0x80) != 0,
            ps_button: (raw[7] & 0x01) != 0,
            tpad: (raw[7] & 0x02) != 0,
            pressure_l2: raw[8],
            pressure_r2: raw[9],
            battery: raw[12],
            power: raw[30] & 0x0F,
            usb_plugged: (raw[30] & 0x10) != 0,
            finger1: TouchFinger::parse(&raw[35..39]),
            finger2: TouchFinger::parse(&raw[39..43]),
        })
    }

    fn unified(&self) -> [u8; 18] {
        let (up, right, down, left) = DPAD_DIRECTIONS
            .get(self.dpad as usize)
            .copied()
            .unwrap_or((false, false, false, false));

        // A pressed touchpad acts as Share or Option depending on which
        // half each finger is on
        let mut share = self.share;
        let mut option = self.option;
        if self.tpad {
            for finger in [&self.finger1, &self.finger2] {
                if finger.active {
                    if finger.x < TOUCHPAD_MID_X {
                        share = true;
                    } else {
                        option = true;
                    }
                }
            }
        }

        [
            !(u8::from(share)
                | u8::from(self.l3) << 1
                | u8::from(self.r3) << 2
                | u8::from(option) << 3
                | u8::from(up) << 4
                | u8::from(right) << 5
                | u8::from(down) << 6
                | u8::from(left) << 7),
            !(u8::from(self.l2)
                | u8::from(self.r2) << 1
                | u8::from(self.l1) << 2
                | u8::from(self.r1) << 3
                | u8::from(self.triangle) << 4
                | u8::from(self.circle) << 5
                | u8::from(self.cross) << 6
                | u8::from(self.square) << 7),
            self.right_stick_x,
            self.right_stick_y,
            self.left_stick_x,
            self.left_stick_y,
            u8::from(right) * 255,
            u8::from(left) * 255,
            u8::from(up) * 255,
            u8::from(down) * 255,
            u8::from(self.triangle) * 255,
            u8::from(self.circle) * 255,
            u8::from(self.cross) * 255,
            u8::from(self.square) * 255,
            u8::from(self.l1) * 255,
            u8::from(self.r1) * 255,
            self.pressure_l2,
            self.pressure_r2,
        ]
    }

    fn led_state(&self, slot: usize) -> [u8; 4] {
        let charging = self.power != DS4_POWER_FULL && self.usb_plugged;
        let [r, g, b] = if self.ps_button {
            [self.battery, 0, 0]
        } else {
            RGB_PATTERNS[slot]
        };
        [r, g, b, charging as u8]
    }
}

/// A decoded input report from either pad model.
pub enum InputReport {
    Ds3(Ds3Report),
    Ds4(Ds4Report),
}

impl InputReport {
    /// Decode a raw transfer buffer.
    ///
    /// Returns `None` for empty polls (first byte zero, seen on some
    /// pad revisions) and for transfers too short to carry the fields
    /// we read.
    pub fn parse(model: PadModel, raw: &[u8]) -> Option<InputReport> {
        if raw.first().copied().unwrap_or(0) == 0 {
            return None;
        }
        match model {
            PadModel::Ds3 => Ds3Report::parse(raw).map(InputReport::Ds3),
            PadModel::Ds4 => Ds4Report::parse(raw).map(InputReport::Ds4),
        }
    }

    /// The 18-byte vector shared by both models.
    ///
    /// Bytes 0 and 1 are inverted: a clear bit means the button is
    /// pressed, matching what legacy hosts expect.
    pub fn unified(&self) -> [u8; 18] {
        match self {
            InputReport::Ds3(r) => r.unified(),
            InputReport::Ds4(r) => r.unified(),
        }
    }

    /// What the pad's light should show after this report: battery
    /// level while the PS button is held, the slot's normal pattern
    /// otherwise, with the blink flag following the charge state.
    pub fn led_state(&self, slot: usize) -> [u8; 4] {
        match self {
            InputReport::Ds3(r) => r.led_state(slot),
            InputReport::Ds4(r) => r.led_state(slot),
        }
    }
}

#[cfg(all(test, feature = "std"))]
#[path = "tests/report.rs"]
mod tests;
