//! Stemma Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Stemma crates:
//!
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Person**: The typed ingest record ([`person::PersonRecord`]) and
//!   [`person::Sex`]

pub mod geometry;
pub mod person;
