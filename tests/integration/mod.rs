//! Integration test suite for stepref
//!
//! End-to-end tests over the public API and the `stepref` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **round_trip**: save/load over whole plans, aliasing and identity repair
//! - **paste**: pasting fragments into live documents
//! - **cli**: the `stepref` binary

mod cli;
mod paste;
mod round_trip;
