//! Decoding pad commands and running them against the driver.

use crate::debug;
use ds34_usb_host::delay::DelayMs;
use ds34_usb_host::driver::PadDriver;
use ds34_usb_host::host_controller::HostController;

/// Service identifier a host binds to reach the pad driver.
pub const BIND_RPC_ID: u32 = 0x18E3878E;

/// Byte opcodes, one per driver entry point.
pub mod opcode {
    pub const INIT: u8 = 1;
    pub const GET_STATUS: u8 = 2;
    pub const GET_BDADDR: u8 = 3;
    pub const SET_BDADDR: u8 = 4;
    pub const SET_RUMBLE: u8 = 5;
    pub const SET_LED: u8 = 6;
    pub const GET_DATA: u8 = 7;
    pub const RESET: u8 = 8;
}

/// Decode one command and run it, writing any reply back into `buf` in
/// place:
///
/// * `GET_STATUS`: `[port]` in, `[status]` out
/// * `GET_BDADDR`: `[port, ..6]` in, `[result, bdaddr[0..6]]` out
/// * `SET_BDADDR`: `[port, bdaddr[0..6]]`
/// * `SET_RUMBLE`: `[port, left, right]`
/// * `SET_LED`: `[port, led[0..4]]`
/// * `GET_DATA`: `[port, ..]` in, the 18-byte unified vector out
/// * `INIT`: `[enable_mask]`, `RESET`: empty
///
/// Undersized payloads and unknown opcodes are ignored.
pub async fn dispatch<HC: HostController, D: DelayMs>(
    driver: &PadDriver<HC, D>,
    cmd: u8,
    buf: &mut [u8],
) {
    match cmd {
        opcode::INIT if !buf.is_empty() => driver.init(buf[0]),
        opcode::GET_STATUS if !buf.is_empty() => {
            buf[0] = driver.get_status(buf[0] as usize);
        }
        opcode::GET_BDADDR if buf.len() >= 7 => {
            let port = buf[0] as usize;
            let mut bdaddr = [0u8; 6];
            let ok = driver.get_bdaddr(&mut bdaddr, port).await;
            if ok {
                buf[1..7].copy_from_slice(&bdaddr);
            }
            buf[0] = ok as u8;
        }
        opcode::SET_BDADDR if buf.len() >= 7 => {
            let port = buf[0] as usize;
            let mut bdaddr = [0u8; 6];
            bdaddr.copy_from_slice(&buf[1..7]);
            driver.set_bdaddr(&bdaddr, port).await;
        }
        opcode::SET_RUMBLE if buf.len() >= 3 => {
            driver.set_rumble(buf[1], buf[2], buf[0] as usize).await;
        }
        opcode::SET_LED if buf.len() >= 5 => {
            let port = buf[0] as usize;
            let led = [buf[1], buf[2], buf[3], buf[4]];
            driver.set_led(led, port).await;
        }
        opcode::GET_DATA if !buf.is_empty() => {
            let port = buf[0] as usize;
            let n = buf.len().min(18);
            driver.get_data(&mut buf[..n], port).await;
        }
        opcode::RESET => driver.reset(),
        _ => debug::println!("unhandled pad command {}", cmd),
    }
}

#[cfg(all(test, feature = "std"))]
#[path = "tests/rpc.rs"]
mod tests;
