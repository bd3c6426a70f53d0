//! Core library for the `wavebench` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration loading, the phase resolver and segment runner, the
//! HTTP executor, the bounded worker pool, and the metrics aggregator. The
//! primary user-facing interface is the `wavebench` command-line
//! application; library APIs may evolve as the CLI grows.
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod pool;
pub mod runner;
