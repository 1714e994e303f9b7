//! Background polling
//!
//! Views never talk to the backend on a timer themselves. They subscribe
//! to the [`scheduler::PollScheduler`], which runs at most one fetch loop
//! per poll key and fans results out over watch channels.

pub mod scheduler;

pub use scheduler::{PollKey, PollScheduler, PollUpdate, Subscription};
