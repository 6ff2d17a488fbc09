#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod debug;
pub mod delay;
pub mod driver;
pub mod host_controller;
pub mod lock;
#[cfg(feature = "std")]
pub mod mocks;
pub mod output;
pub mod pad;
pub mod report;
pub mod wire;

pub use driver::{Error, PadDriver};
pub use host_controller::{HostController, UsbDevice, UsbError};
