//! Integration tests entry point
//!
//! Pulls in every module under integration/ so the suite builds as a single
//! test binary.

mod integration;
