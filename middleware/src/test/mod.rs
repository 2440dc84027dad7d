//! Unit test module
//!
//! Middleware unit tests live here, separate from source files.

mod subscription_gate_test;
