//! Ragline is a terminal client for asking questions about an uploaded
//! document through a retrieval backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns runtime state: the document lifecycle, the conversation
//!   log, and the word-by-word reveal of answers.
//! - [`api`] defines the backend contract, its HTTP implementation, and the
//!   tolerant decoding of backend responses.
//! - [`commands`] implements slash-command parsing and execution.
//! - [`ui`] renders snapshots to the console and runs the event loop that
//!   feeds input and backend results into the state.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`ui::chat_loop`] for
//! interactive sessions.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
