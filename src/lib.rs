#![cfg_attr(not(test), no_std)]

//! Control firmware core for a half-duplex LoRa radio node.
//!
//! Serial bytes are framed into messages, carried over a bounded queue to
//! the application loop, decoded into packets, and dispatched to the
//! settings store or the radio controller. The radio controller runs a
//! standby/transmit/receive state machine with interrupt-flag completion
//! signalling and bounded RSSI sampling while listening.
//!
//! Hardware (radio driver, GPS decoder, durable storage, serial transport)
//! sits behind traits so the whole pipeline runs under `cargo test`.

pub mod app;
pub mod config;
pub mod gps;
pub mod protocol;
pub mod queue;
pub mod radio;
pub mod settings;
pub mod storage;
pub mod tasks;
