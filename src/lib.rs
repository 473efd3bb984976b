//! Client and cache-synchronization layer for the Stasher inventory API.
//!
//! Layers, leaf first:
//!
//! - [`api`]: transport plus one flat module per backend resource
//! - [`cache`] and [`query`]: keyed, coalesced, invalidatable reads
//! - [`hooks`]: the query and mutation surface front ends use
//! - [`session`]: auth bootstrap and login state
//!
//! [`context::AppContext`] wires them together.

pub mod api;
pub mod cache;
pub mod config;
pub mod context;
pub mod error_message;
pub mod hooks;
pub mod logging;
pub mod notify;
pub mod query;
pub mod session;
pub mod storage;

pub use context::AppContext;
