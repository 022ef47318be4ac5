//! Ringchat CLI application library

pub mod cli;
pub mod config;
pub mod error;
