//! USB wire-format structures and the descriptor walk.

use crate::host_controller::InterruptEndpoint;

/// A SETUP packet as transmitted on control endpoints.
///
/// All transactions on control endpoints start with a SETUP packet of
/// this format; some are then followed by IN or OUT data packets. The
/// format (and the un-Rust-like names of its fields) are defined in the
/// USB 2.0 specification, section 9.3. The HID class specification
/// dictates what the pads expect in these fields for report traffic.
#[repr(C)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Debug))]
#[allow(non_snake_case)] // These names are from USB 2.0 table 9-2
pub struct SetupPacket {
    /// The type and specific target of the request.
    pub bmRequestType: u8,
    /// The particular request.
    pub bRequest: u8,
    /// A parameter to the request.
    pub wValue: u16,
    /// A second parameter to the request.
    pub wIndex: u16,
    /// The length of the subsequent IN or OUT data phase; zero if the
    /// setup packet itself carries all the required information.
    pub wLength: u16,
}

#[repr(C)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Debug))]
#[derive(Copy, Clone)]
#[allow(non_snake_case)] // These names are from USB 2.0 table 9-10
pub struct ConfigurationDescriptor {
    pub bLength: u8,
    pub bDescriptorType: u8,
    pub wTotalLength: [u8; 2],
    pub bNumInterfaces: u8,
    pub bConfigurationValue: u8,
    pub iConfiguration: u8,
    pub bmAttributes: u8,
    pub bMaxPower: u8,
}

// SAFETY: all fields zeroable
unsafe impl bytemuck::Zeroable for ConfigurationDescriptor {}
// SAFETY: no padding, no disallowed bit patterns
unsafe impl bytemuck::Pod for ConfigurationDescriptor {}

#[repr(C)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Debug))]
#[derive(Copy, Clone)]
#[allow(non_snake_case)] // These names are from USB 2.0 table 9-12
pub struct InterfaceDescriptor {
    pub bLength: u8,
    pub bDescriptorType: u8,
    pub bInterfaceNumber: u8,
    pub bAlternateSetting: u8,
    pub bNumEndpoints: u8,
    pub bInterfaceClass: u8,
    pub bInterfaceSubClass: u8,
    pub bInterfaceProtocol: u8,
    pub iInterface: u8,
}

// SAFETY: all fields zeroable
unsafe impl bytemuck::Zeroable for InterfaceDescriptor {}
// SAFETY: no padding, no disallowed bit patterns
unsafe impl bytemuck::Pod for InterfaceDescriptor {}

#[repr(C)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Debug))]
#[derive(Copy, Clone)]
#[allow(non_snake_case)] // These names are from USB 2.0 table 9-13
pub struct EndpointDescriptor {
    pub bLength: u8,
    pub bDescriptorType: u8,
    pub bEndpointAddress: u8,
    pub bmAttributes: u8,
    pub wMaxPacketSize: [u8; 2],
    pub bInterval: u8,
}

// SAFETY: all fields zeroable
unsafe impl bytemuck::Zeroable for EndpointDescriptor {}
// SAFETY: no padding, no disallowed bit patterns
unsafe impl bytemuck::Pod for EndpointDescriptor {}

// For bmRequestType (USB 2.0 table 9-2)
pub const DEVICE_TO_HOST: u8 = 0x80;
pub const HOST_TO_DEVICE: u8 = 0;
pub const CLASS_REQUEST: u8 = 0x20;
pub const RECIPIENT_INTERFACE: u8 = 1;

// For bRequest (USB 2.0 table 9-4)
pub const GET_DESCRIPTOR: u8 = 6;
pub const SET_CONFIGURATION: u8 = 9;

// Descriptor types (USB 2.0 table 9-5, HID 1.11 section 7.1)
pub const CONFIGURATION_DESCRIPTOR: u8 = 2;
pub const INTERFACE_DESCRIPTOR: u8 = 4;
pub const ENDPOINT_DESCRIPTOR: u8 = 5;
pub const HID_DESCRIPTOR: u8 = 0x21;

// HID class requests (HID 1.11 section 7.2)
pub const HID_GET_REPORT: u8 = 0x01;
pub const HID_SET_REPORT: u8 = 0x09;

// HID report types, the high byte of wValue in report requests
pub const REPORT_TYPE_OUTPUT: u8 = 2;
pub const REPORT_TYPE_FEATURE: u8 = 3;

// Endpoint descriptor fields (USB 2.0 table 9-13)
pub const ENDPOINT_DIR_MASK: u8 = 0x80;
pub const ENDPOINT_DIR_IN: u8 = 0x80;
pub const ENDPOINT_TYPE_MASK: u8 = 0x03;
pub const ENDPOINT_TYPE_INTERRUPT: u8 = 3;

/// Callbacks made by [`parse_descriptors`] as it walks a configuration.
pub trait DescriptorVisitor {
    fn on_configuration(&mut self, _c: &ConfigurationDescriptor) {}
    fn on_interface(&mut self, _i: &InterfaceDescriptor) {}
    fn on_endpoint(&mut self, _e: &EndpointDescriptor) {}
    fn on_other(&mut self, _d: &[u8]) {}
}

/// Walk a configuration-descriptor blob, handing each descriptor to the
/// visitor. Truncated or undersized descriptors end the walk.
pub fn parse_descriptors(buf: &[u8], v: &mut impl DescriptorVisitor) {
    let mut index = 0;

    while buf.len() > index + 2 {
        let dlen = buf[index] as usize;
        let dtype = buf[index + 1];

        if dlen < 2 || buf.len() < index + dlen {
            return;
        }

        match dtype {
            CONFIGURATION_DESCRIPTOR => {
                if let Ok(c) =
                    bytemuck::try_from_bytes(&buf[index..index + dlen])
                {
                    v.on_configuration(c);
                }
            }
            INTERFACE_DESCRIPTOR => {
                if let Ok(i) =
                    bytemuck::try_from_bytes(&buf[index..index + dlen])
                {
                    v.on_interface(i);
                }
            }
            ENDPOINT_DESCRIPTOR => {
                if let Ok(e) =
                    bytemuck::try_from_bytes(&buf[index..index + dlen])
                {
                    v.on_endpoint(e);
                }
            }
            _ => v.on_other(&buf[index..(index + dlen)]),
        }

        index += dlen;
    }
}

/// Finds the endpoints a pad is driven through.
///
/// Remembers the configuration value and the first interrupt endpoint
/// seen in each direction. The walk runs to the end of the blob rather
/// than trusting `bNumEndpoints`: second-revision DS4 pads report
/// `bNumEndpoints == 0` while still listing both endpoints.
#[derive(Default)]
pub struct EndpointFinder {
    configuration_value: Option<u8>,
    interrupt_in: Option<InterruptEndpoint>,
    interrupt_out: Option<InterruptEndpoint>,
}

impl EndpointFinder {
    pub fn configuration_value(&self) -> Option<u8> {
        self.configuration_value
    }

    pub fn interrupt_in(&self) -> Option<InterruptEndpoint> {
        self.interrupt_in
    }

    pub fn interrupt_out(&self) -> Option<InterruptEndpoint> {
        self.interrupt_out
    }
}

impl DescriptorVisitor for EndpointFinder {
    fn on_configuration(&mut self, c: &ConfigurationDescriptor) {
        self.configuration_value = Some(c.bConfigurationValue);
    }

    fn on_endpoint(&mut self, e: &EndpointDescriptor) {
        if (e.bmAttributes & ENDPOINT_TYPE_MASK) != ENDPOINT_TYPE_INTERRUPT {
            return;
        }
        let ep = InterruptEndpoint {
            number: e.bEndpointAddress & 0x0F,
            max_packet_size: u16::from_le_bytes(e.wMaxPacketSize),
        };
        if (e.bEndpointAddress & ENDPOINT_DIR_MASK) == ENDPOINT_DIR_IN {
            if self.interrupt_in.is_none() {
                self.interrupt_in = Some(ep);
            }
        } else if self.interrupt_out.is_none() {
            self.interrupt_out = Some(ep);
        }
    }
}

#[cfg(all(test, feature = "std"))]
#[path = "tests/wire.rs"]
mod tests;
