//! Store Core - Domain types and relationship rules.
//!
//! This crate provides the types shared by every store component:
//! - `api` - REST backend (axum + `PostgreSQL`)
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Everything here can be exercised without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails and prices
//! - [`entities`] - In-memory User, Address, Category and Product
//! - [`relationships`] - The only code allowed to mutate both sides of an
//!   association

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod entities;
pub mod relationships;
pub mod types;

pub use entities::*;
pub use types::*;
