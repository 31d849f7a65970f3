//! Roshambo Session - The coordinator runtime
//!
//! This crate implements the concurrent core of the game server:
//! - The session coordinator: a single actor loop that owns all shared
//!   state and serializes every mutation through its mailbox
//! - The round engine: an independent task collecting choices against a
//!   deadline and reporting resolved rounds back to the coordinator
//! - Broadcast fan-out: per-subscriber delivery decoupling slow
//!   consumers from the coordinator loop
//! - An explicit shutdown signal observed by every long-lived task

pub mod config;
pub mod coordinator;
pub mod fanout;
pub mod shutdown;

mod command;
mod round;

pub use config::*;
pub use coordinator::*;
pub use fanout::*;
pub use shutdown::*;
