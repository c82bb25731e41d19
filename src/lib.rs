//! Murmur narrates a colony-management game for screen-reader users.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core::speech`] is the single narration sink. It owns interruption,
//!   verbosity, history and the fallback to a direct reader channel.
//! - [`core::host`] is the narrow, versioned boundary to the game. Everything
//!   the modes read or change goes through its traits.
//! - [`core::modes`] implements the exclusive keyboard modes (area painting,
//!   command browsing, the mod list and dialog trees) and the coordinator that
//!   keeps at most one of them open.
//! - [`core::app`] ties one host, one channel and the coordinator together.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which loads configuration and runs the
//! terminal demo against the in-memory host.

pub mod cli;
pub mod core;
pub mod utils;
