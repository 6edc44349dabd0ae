//! Library crate for esxi-ping-report exposing reusable modules.
pub mod classify;
pub mod config;
pub mod console;
pub mod error;
pub mod extract;
pub mod locate;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod types;
