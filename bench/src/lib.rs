//! Benchmark utilities for Strata.
//!
//! This crate provides benchmarking infrastructure for the component stores:
//!
//! - **Microbenchmarks**: Individual store operations (write, read, destroy), cache hit
//!   patterns, composite intersection and bulk slice traversal
//! - **Scenario benchmarks**: A realistic per-frame workload over a configured world
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p strata_bench
//!
//! # Run specific benchmark group
//! cargo bench -p strata_bench -- cache
//! ```
//!
//! # Benchmark Results
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod components;
pub mod scenarios;
