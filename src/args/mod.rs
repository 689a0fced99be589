//! Command-line interface.
mod cli;
mod parsers;


pub use cli::PlanArgs;
