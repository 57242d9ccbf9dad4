//! Core trait abstractions for the profile extraction library.
//!
//! These traits define the collaborator boundaries: where page text comes
//! from, and which backend turns a prompt into text.

pub mod completion;
pub mod fetcher;
