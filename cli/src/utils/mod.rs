//! Utility functions for the CLI

pub mod path;
