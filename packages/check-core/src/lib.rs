//! Verification harness for the blog application.
//!
//! Provides the test runner and reporter, static text rules over the
//! application sources, a live database probe, and the integration
//! sequence that exercises the article retrieval function.

pub mod articles;
pub mod artifact;
pub mod config;
pub mod connection;
pub mod error;
pub mod outcome;
pub mod probe;
pub mod quality;
pub mod rules;
pub mod runner;
pub mod sequence;

pub use error::{CheckError, Result};
pub use outcome::TestOutcome;
pub use runner::{RunSummary, Runner};
