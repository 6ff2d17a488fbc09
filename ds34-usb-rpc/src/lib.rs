#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

mod debug;
pub mod rpc;
pub use rpc::{dispatch, opcode, BIND_RPC_ID};
