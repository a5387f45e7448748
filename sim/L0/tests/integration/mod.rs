//! Integration tests for the body-* crate ecosystem.
//!
//! These tests drive bodies the way a scene would, through the in-memory
//! server and scene tree:
//! - Characters sliding over floors, walls and moving platforms
//! - Rigid bodies stepped with contact monitoring
//! - Static bodies driven kinematically
//! - Physical bones joined into a chain and simulated

pub mod character_motion;
pub mod contact_monitor;
pub mod motion_properties;
pub mod physical_bones;
pub mod static_motion;
