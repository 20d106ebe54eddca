//! Core types and trait definitions for the samaj community portal.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the role model, the authorization decisions, and the form-window rules; the
//! store and server crates depend on it.

pub mod access;
pub mod booking;
pub mod error;
pub mod form;
pub mod member;
pub mod principal;
pub mod registration;
pub mod role;
pub mod store;

pub use error::{Error, Result};
