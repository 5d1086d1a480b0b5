//! Lightwatch core domain logic.
//!
//! Everything in this crate is pure: no database access, no network, no
//! runtime. The `db`, `events` and `worker` crates build on these types.

pub mod alerting;
pub mod channels;
pub mod error;
pub mod types;
