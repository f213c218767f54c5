//! Credit application desk: record store, filter engine, analytics
//! aggregator, and the simulated live-update feed that drives them.
//!
//! Control flow: the generator seeds the store once, the feed perturbs it
//! on a timer, and every write recomputes the filtered subset and its
//! summary before publishing a change. See `desk` for the write path.

pub mod analytics;
pub mod command;
pub mod config;
pub mod desk;
pub mod error;
pub mod event;
pub mod export;
pub mod feed;
pub mod filter;
pub mod generator;
pub mod name_generator;
pub mod record;
pub mod rng;
pub mod store;
pub mod types;

pub use desk::{Desk, DeskView};
pub use error::{DeskError, DeskResult};
