//! Library crate for bue-admin.
//!
//! This crate exposes the building blocks of the TUI:
//! - HTTP access to the user resource and error normalization (`api`)
//! - Controllers, application state and the event loop (`app`)
//! - Settings and command-line parsing (`config`)
//! - Startup error types (`error`)
//! - UI rendering (`ui`)
//!
//! It is used by the `bue-admin` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod ui;

pub use error::{Error, Result};
