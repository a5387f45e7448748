//! End-to-end scenarios for the physics-body layer.
//!
//! The scenarios live in `integration/` and run as the `integration` test
//! target.
