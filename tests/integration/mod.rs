//! Integration tests for the nbforge generation, audit and repair pipeline

mod audit_repair;
mod batch_pipeline;
mod config_integration;
mod test_utils;
