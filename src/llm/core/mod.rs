//! Core abstractions for the provider layer

pub mod config;
pub mod error;
pub mod lines;
pub mod provider;
pub mod types;
