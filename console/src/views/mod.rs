//! View controllers
//!
//! Each view owns the state and behavior behind one console screen. The
//! shell renders them and forwards operator input; the views talk to the
//! backend through [`crate::http::ConsoleApi`] and post outcomes through
//! the notifier.

pub mod dashboard;
pub mod deploy;
pub mod devices;
pub mod history;
pub mod login;
pub mod logs;
pub mod metrics;
pub mod scripts;
pub mod security;
pub mod status;
