//! `cquery`: search configured entities with encoded-key filters from the command line

pub mod app;
pub mod core;
pub mod utils;
