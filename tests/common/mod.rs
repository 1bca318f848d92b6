//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod counting_store;
