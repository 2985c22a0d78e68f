//! Test doubles for pipeline authors.
//!
//! Exercising a pipeline against a real model backend is slow and
//! non-deterministic; these doubles script the transport instead.

mod mocks;

pub use mocks::{MockModelClient, RecordedRequest};
