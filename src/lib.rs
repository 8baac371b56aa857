//! nbforge: batch generation, validation and title repair of educational notebooks
//!
//! Specifications from a catalog are turned into notebooks by a generative
//! service, persisted into a category-organized tree and checked against a
//! structural policy. An independent audit pass finds notebooks whose title
//! heading drifted and repairs them from a canonical title table.

pub mod artifact;
pub mod audit;
pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod provider;
