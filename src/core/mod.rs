//! Core types for stepref
//!
//! This module holds the fundamental types every other module builds on:
//!
//! - [`StepRefError`] / [`ErrorContext`] - typed errors and their user-facing form
//! - [`StepId`] - the identity token carried by every step
//!
//! # Error First Design
//!
//! Operations that can fail return [`anyhow::Result`] when they delegate through
//! the serializer plugin chain (errors from delegates propagate unmodified), and
//! build [`StepRefError`] values for the failures they detect themselves.
//! Conditions that must never abort a pass, such as an unresolved reference or
//! a duplicate identity, are reported as diagnostics instead of errors.

pub mod error;
pub mod identity;

pub use error::{ErrorContext, StepRefError, user_friendly_error};
pub use identity::StepId;
