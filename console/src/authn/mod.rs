//! Authentication: session ownership and persistence

pub mod session;
