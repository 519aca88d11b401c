//! Shared helpers for integration and end-to-end tests.

#![allow(dead_code)]

pub mod probe_utils;
pub mod socket_guard;
