// Library interface for insight modules
// This allows tests and other binaries to import modules

pub mod chat;
pub mod datefmt;
pub mod error;
pub mod llm;
pub mod server;
pub mod store;
pub mod view;
