//! Marketplace backend client library
//!
//! Records, typed errors and an async REST client for the farm-to-restaurant
//! marketplace backend, plus the in-flight request guards and cart arithmetic
//! shared by the dashboards.

pub mod api;
pub mod auth;
pub mod cart;
pub mod error;
pub mod model;
pub mod rate_limit;
pub mod validation;

mod client;

pub use client::*;
