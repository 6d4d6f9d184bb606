//! Core traits for the dynamic DNS system
//!
//! - [`HostManager`]: CRUD access to host records, implemented by the
//!   provider backend, the cache backend and the façade

pub mod host_manager;

pub use host_manager::HostManager;
