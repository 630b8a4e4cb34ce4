//! Command line host for the theme engine: configuration, logging and
//! commands that drive a guild snapshot.

pub mod args;
pub mod commands;
pub mod config;
pub mod logger;
