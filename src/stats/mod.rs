//! Streaming statistics over sample latencies.
mod calculator;


pub use calculator::StatCalculator;
