//! Core library for the `loadplan` CLI.
//!
//! This crate provides the internal building blocks used by the binary:
//! plan-file parsing, the controller tree and its traversal engine,
//! virtual-user drivers, the sample distribution pipeline, and streaming
//! statistics. The primary user-facing interface is the `loadplan`
//! command-line application; library APIs may evolve as the CLI grows.
pub mod args;
pub mod config;
pub mod control;
pub mod driver;
pub mod entry;
pub mod error;
pub mod logger;
pub mod plan;
pub mod sample;
pub mod sender;
pub mod shutdown;
pub mod stats;
pub mod summary;
