//! # Discord Themer Core Library
//!
//! Core library for validating, parsing and applying guild theme files.
//! A theme is a small text file that renames the guild, swaps its icon,
//! changes the bot's avatar and nickname, and remaps role names.
//!
//! ## Modules
//!
//! - [`theme`] - Theme file tokenizer, validator, parser, registry, exporter and applier
//! - [`action`] - Action modes for dispatching outbound mutation requests
//! - [`platform`] - Boundary to the chat platform plus an in-memory guild snapshot
//! - [`assets`] - Theme image resolution, reading and remote fetching
//! - [`validation`] - Generic validator trait and theme name validation
//! - [`taskpool`] - Task pool for bounded concurrent deliveries
//! - [`common`] - Error types and rate limiting
//! - [`themer`] - High level facade tying a registry to a guild

pub mod action;
pub mod assets;
pub mod common;
pub mod platform;
pub mod taskpool;
pub mod theme;
pub mod themer;
pub mod validation;

pub use action::{ActionMode, Mutation, MutationKind};
pub use common::{AssetError, HttpError, ThemeError};
pub use theme::{ThemeRegistry, ThemeToken};
pub use themer::{Themer, ThemerBuilder};
