//! Property-based tests for repair and validation guarantees

mod repair_idempotence;
mod validator_purity;
