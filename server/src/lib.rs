//! LabTrack server
//!
//! Authentication, role gating and request auditing for the laboratory
//! sample tracking API.

pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
