pub mod config;
pub mod core;
pub mod notify;
pub mod permissions;
pub mod rate;
pub mod surface;
pub mod task;
