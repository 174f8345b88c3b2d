//! Context management module
//!
//! Named contexts bundle a project with its default zone, region, API host
//! and service version so that switching between projects is one command.

mod commands;
mod models;
mod resolve;
mod store;

pub use commands::run_context_command;
pub use models::{Context, ContextConfig};
pub use resolve::{resolve_active_context, resolve_active_context_name};
pub use store::ContextStore;
