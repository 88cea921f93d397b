//! Core of calmirror: one-way mirroring of an exported calendar into a
//! remote calendar store.
//!
//! - `identity`, `convert`, `diff`, `exceptions` and `sync` make up the
//!   reconciliation engine
//! - `destination` is the interface the engine mutates the store through
//! - `protocol` and `provider` implement that interface over provider binaries
//! - `ics` reads the exported calendar

pub mod config;
pub mod convert;
pub mod destination;
pub mod diff;
pub mod error;
pub mod event;
pub mod exceptions;
pub mod ics;
pub mod identity;
pub mod protocol;
pub mod provider;
pub mod sync;

pub use event::*;
