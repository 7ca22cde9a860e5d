//! SRD monitoring admin API.
//!
//! Exposes config, state, error handling and routes so the binaries and the
//! integration tests build the same application.

pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
