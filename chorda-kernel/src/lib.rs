//! Chorda kernel - the key-chord compilation and dispatch core.
//!
//! This crate contains the whole pipeline:
//! - Preprocessor (`:include` inlining)
//! - Scanner (stateful, UTF-8 aware)
//! - Parser (handler dispatch, error recovery)
//! - Transformer (dedup, inheritance, resolution, sort)
//! - Dispatcher (the runtime menu loop)

pub mod chord;
pub mod menu;
pub mod parser;
pub mod preprocessor;
pub mod scanner;
pub mod spawn;
pub mod transform;
pub mod transpiler;

mod compile;
mod error;

pub use compile::{Compilation, compile};
pub use error::ChordError;
