//! Application wiring: options, shared state, routing, the shell, and
//! the run loop.

pub mod options;
pub mod router;
pub mod run;
pub mod shell;
pub mod state;

pub use options::AppOptions;
pub use run::run;
