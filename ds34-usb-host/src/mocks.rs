//! A mock host stack for driving the driver in unit tests.

use crate::host_controller::{DataPhase, HostController, UsbError};
use crate::wire::SetupPacket;
use mockall::mock;

mock! {
    pub HostControllerInner {
        pub fn control_transfer<'a>(
            &self,
            address: u8,
            packet_size: u8,
            setup: SetupPacket,
            data_phase: DataPhase<'a>,
        ) -> impl core::future::Future<Output = Result<usize, UsbError>>;

        pub fn interrupt_in_transfer(
            &self,
            address: u8,
            endpoint: u8,
            packet_size: u16,
            data: &mut [u8],
        ) -> impl core::future::Future<Output = Result<usize, UsbError>>;

        pub fn interrupt_out_transfer(
            &self,
            address: u8,
            endpoint: u8,
            packet_size: u16,
            data: &[u8],
        ) -> impl core::future::Future<Output = Result<usize, UsbError>>;
    }
}

pub struct MockHostController {
    pub inner: MockHostControllerInner,
}

impl Default for MockHostController {
    fn default() -> Self {
        Self {
            inner: MockHostControllerInner::new(),
        }
    }
}

impl HostController for MockHostController {
    fn control_transfer(
        &self,
        address: u8,
        packet_size: u8,
        setup: SetupPacket,
        data_phase: DataPhase<'_>,
    ) -> impl core::future::Future<Output = Result<usize, UsbError>> {
        self.inner
            .control_transfer(address, packet_size, setup, data_phase)
    }

    fn interrupt_in_transfer(
        &self,
        address: u8,
        endpoint: u8,
        packet_size: u16,
        data: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, UsbError>> {
        self.inner
            .interrupt_in_transfer(address, endpoint, packet_size, data)
    }

    fn interrupt_out_transfer(
        &self,
        address: u8,
        endpoint: u8,
        packet_size: u16,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<usize, UsbError>> {
        self.inner
            .interrupt_out_transfer(address, endpoint, packet_size, data)
    }
}
