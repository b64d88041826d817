//! Kata registry library exports

pub mod config;
pub mod gate;
pub mod index;
pub mod server;
