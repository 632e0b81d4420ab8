//! The interactive chat loop.
//!
//! Input lines, backend results and reveal steps all arrive as actions on
//! one queue. The loop applies them in batches, starts the side effects the
//! reducer asks for, and prints whatever changed.

mod event_loop;
pub mod executors;

pub use event_loop::{run_chat, ChatOptions};
