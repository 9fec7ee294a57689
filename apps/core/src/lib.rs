//! chatline core
//!
//! - `brain`: normalization, tokenization, sentiment, knowledge matching
//! - `actors`: background analytics delivery
//! - `session`: the console interaction loop
//! - `population`: World Bank projection chart job
//! - `config` / `logging` / `error`: shared plumbing for both binaries

pub mod actors;
pub mod brain;
pub mod config;
pub mod error;
pub mod logging;
pub mod population;
pub mod session;

pub use error::AppError;

#[cfg(test)]
mod tests;
