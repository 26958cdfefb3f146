//! Parrot agent library root.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod web;

pub use agent::{create_parrot_agent, HandlerError, ParrotAgent};
pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use error::{Error, Result};
pub use protocol::{Envelope, Event, Payload};
pub use web::{create_app_router, run_server};
