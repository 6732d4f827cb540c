//! bcrypt-queue CLI
//!
//! Simulates an embedding host around the bcrypt job dispatcher: loads the
//! plugin, attaches script instances and ticks it from a tokio interval.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod host_loop;
