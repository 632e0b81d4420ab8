//! Terminal front end.
//!
//! - [`chat_loop`]: the event loop that feeds stdin to [`crate::commands`]
//!   and runs backend calls through its executors.
//! - [`console`]: line-oriented rendering of [`crate::core::app::AppSnapshot`]s.
//!
//! Ownership boundary: this layer captures input and prints state, while
//! [`crate::core`] owns the lifecycle and chat state machines.

pub mod chat_loop;
pub mod console;
