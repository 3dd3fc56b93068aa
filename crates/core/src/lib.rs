//! Pure domain logic for the photo service.
//!
//! Nothing in this crate performs I/O: content sniffing, hashing, upload
//! limits, identifier parsing and storage key naming are all plain
//! functions so every other crate can share and test them cheaply.

pub mod error;
pub mod fingerprint;
pub mod hashing;
pub mod ids;
pub mod limits;
pub mod messages;
pub mod naming;
pub mod types;
