//! The interface the pad driver needs from a USB host stack.

use crate::wire::SetupPacket;
use core::future::Future;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Debug))]
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum UsbError {
    Nak,
    Stall,
    Timeout,
    Overflow,
    BitStuffError,
    CrcError,
    DataSeqError,
    BufferTooSmall,
    ProtocolError,
}

/// The data stage of a control transfer, if any.
pub enum DataPhase<'a> {
    In(&'a mut [u8]),
    Out(&'a [u8]),
    None,
}

impl DataPhase<'_> {
    pub fn is_in(&self) -> bool {
        matches!(self, DataPhase::In(_))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, DataPhase::None)
    }

    /// Run `f` on the IN buffer, if this is an IN data phase
    pub fn in_with<F: FnOnce(&mut [u8])>(&mut self, f: F) {
        if let DataPhase::In(buf) = self {
            f(buf)
        }
    }
}

/// A device as delivered by the host stack's connect callback.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Debug))]
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct UsbDevice {
    /// Bus address; also the driver's opaque identifier for the device
    pub address: u8,
    /// Maximum packet size on the default control endpoint
    pub packet_size_ep0: u8,
    pub vid: u16,
    pub pid: u16,
}

/// An interrupt endpoint discovered during enumeration.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Debug))]
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct InterruptEndpoint {
    pub number: u8,
    pub max_packet_size: u16,
}

/// A USB host stack, as seen from the pad driver.
///
/// One future at a time is in flight per endpoint; the driver enforces
/// that discipline itself, so implementations need not queue.
pub trait HostController {
    fn control_transfer(
        &self,
        address: u8,
        packet_size: u8,
        setup: SetupPacket,
        data_phase: DataPhase<'_>,
    ) -> impl Future<Output = Result<usize, UsbError>>;

    fn interrupt_in_transfer(
        &self,
        address: u8,
        endpoint: u8,
        packet_size: u16,
        data: &mut [u8],
    ) -> impl Future<Output = Result<usize, UsbError>>;

    fn interrupt_out_transfer(
        &self,
        address: u8,
        endpoint: u8,
        packet_size: u16,
        data: &[u8],
    ) -> impl Future<Output = Result<usize, UsbError>>;
}
