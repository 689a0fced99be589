//! Sample records, events, and the leaf execution contract.
mod result;
mod sampler;

#[cfg(test)]
mod tests;

pub use result::{SampleEvent, SampleResult};
pub use sampler::{DelaySampler, Sampler};
