pub mod catalog;
pub mod engine;
pub mod exec;
pub mod host;
pub mod model;
pub mod preflight;
pub mod storage;
