pub mod runner;

pub use runner::{RunPolicy, RunSummary, Runner};
