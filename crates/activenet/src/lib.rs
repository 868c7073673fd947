//! Per-visitor client for the ActiveNet recreation-booking REST API.
//!
//! Provides the raw cookie-jar transport, the anonymous-session
//! bootstrap protocol (redirect chain + embedded CSRF token), the
//! stateful [`client::ActiveNetClient`], and typed activity service
//! calls built on top of it.

pub mod bootstrap;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod services;
