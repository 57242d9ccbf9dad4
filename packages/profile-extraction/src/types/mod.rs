//! Data types for the profile extraction library.

pub mod config;
pub mod message;
pub mod page;
pub mod profile;
