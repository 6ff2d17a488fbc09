//! The pad slot table and the constants both pad models are driven by.

use crate::host_controller::{InterruptEndpoint, UsbError};
use crate::lock::TransferLock;
use bitflags::bitflags;
use core::cell::RefCell;

/// How many pads can be bound at once.
pub const MAX_PADS: usize = 2;

/// Size of a transfer buffer; no report we exchange is longer.
pub const MAX_BUFFER_SIZE: usize = 64;

/// Sony's USB vendor id.
pub const SONY_VID: u16 = 0x054C;
/// DualShock 3 ("Sixaxis") product id.
pub const DS3_PID: u16 = 0x0268;
/// DualShock 4 product id.
pub const DS4_PID: u16 = 0x05C4;
/// Second-revision ("slim") DualShock 4 product id.
pub const DS4_SLIM_PID: u16 = 0x09CC;

/// Which pad model a slot is speaking to.
///
/// The two models share nothing on the wire beyond the unified vector
/// we produce, so the report parser and the output builder are both
/// case-wise over this.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Debug))]
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum PadModel {
    Ds3,
    Ds4,
}

impl PadModel {
    pub fn from_product_id(pid: u16) -> Option<Self> {
        match pid {
            DS3_PID => Some(PadModel::Ds3),
            DS4_PID | DS4_SLIM_PID => Some(PadModel::Ds4),
            _ => None,
        }
    }
}

bitflags! {
    /// Enumeration progress, host-visible through `get_status`.
    ///
    /// Bits are only ever gained in declaration order; disconnecting
    /// clears them all at once.
    pub struct PadStatus: u8 {
        const AUTHORIZED = 0x01;
        const CONNECTED = 0x02;
        const CONFIGURED = 0x04;
        const RUNNING = 0x08;
    }
}

/// Player-number LED bitmasks for the DS3, indexed by slot.
pub(crate) const LED_PATTERNS: [u8; MAX_PADS] = [0x02, 0x04];

/// Bright lightbar colours for the DS4, indexed by slot (blue, green).
pub(crate) const RGB_PATTERNS: [[u8; 3]; MAX_PADS] =
    [[0x00, 0x00, 0x7F], [0x00, 0x7F, 0x00]];

/// DS3 player-LED masks showing battery level, indexed by the report's
/// power field.
pub(crate) const POWER_LEVEL: [u8; 6] = [0x00, 0x00, 0x02, 0x06, 0x0E, 0x1E];

/// Fixed link key written alongside a bdaddr; the DS4 refuses to pair
/// with a host that has not presented one.
pub(crate) const LINK_KEY: [u8; 16] = [
    0x56, 0xE8, 0x81, 0x38, 0x08, 0x06, 0x51, 0x41, //
    0xC0, 0x7F, 0x12, 0xAA, 0xD9, 0x66, 0x3C, 0xCE,
];

/// Unified vector for a pad at rest: no buttons, centred sticks.
pub(crate) const IDLE_DATA: [u8; 18] = [
    0xFF, 0xFF, 0x7F, 0x7F, 0x7F, 0x7F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// The device a slot is bound to.
#[derive(Copy, Clone)]
pub(crate) struct PadDevice {
    pub address: u8,
    pub packet_size_ep0: u8,
    pub model: PadModel,
}

pub(crate) struct PadState {
    pub enabled: bool,
    pub dev: Option<PadDevice>,
    pub status: PadStatus,
    pub interrupt_in: Option<InterruptEndpoint>,
    pub interrupt_out: Option<InterruptEndpoint>,
    /// Last decoded unified input vector
    pub data: [u8; 18],
    /// Last commanded LED state {primary/r, g, b, blink}
    pub old_led: [u8; 4],
    pub lrum: u8,
    pub rrum: u8,
    /// Latch suppressing output commands while a bdaddr exchange is due
    pub update_rum: bool,
    /// Result of the most recent input-transfer completion
    pub last_result: Result<usize, UsbError>,
}

impl PadState {
    fn new() -> Self {
        Self {
            enabled: true,
            dev: None,
            status: PadStatus::empty(),
            interrupt_in: None,
            interrupt_out: None,
            data: IDLE_DATA,
            old_led: [0; 4],
            lrum: 0,
            rrum: 0,
            update_rum: true,
            last_result: Ok(0),
        }
    }

    /// Return the slot to its just-loaded state, keeping only `enabled`.
    pub fn release(&mut self) {
        let enabled = self.enabled;
        *self = Self::new();
        self.enabled = enabled;
    }
}

pub(crate) struct PadSlot {
    pub state: RefCell<PadState>,
    /// Serializes input transfers and writes to the unified vector
    pub pad_lock: TransferLock,
    /// Serializes output and feature-report transfers
    pub cmd_lock: TransferLock,
}

impl PadSlot {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(PadState::new()),
            pad_lock: TransferLock::new(),
            cmd_lock: TransferLock::new(),
        }
    }
}
