pub mod config;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod limiter;
pub mod paths;
pub mod schedule;
pub mod service;
pub mod state;
pub mod target;

pub use error::{AutopilotError, Result};
