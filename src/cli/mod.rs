//! Command-line interface for grove.
//!
//! Argument definitions live in [`args`]; command implementations in
//! [`commands`].

pub mod args;
pub mod commands;
