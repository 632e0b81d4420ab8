pub mod app;
pub mod config;
pub mod document;
pub mod error;
pub mod message;
pub mod reveal;
pub mod session;
