//! ConfigWeaver: an administrative console for MikroTik RouterOS fleets.
//!
//! The console talks to a backend API that owns the devices. It manages
//! the device inventory, deploys configuration templates, follows live
//! reachability and resource metrics, and keeps the operator informed
//! through an activity feed.

pub mod app;
pub mod authn;
pub mod catalog;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod metrics;
pub mod notify;
pub mod poll;
pub mod storage;
pub mod utils;
pub mod views;
