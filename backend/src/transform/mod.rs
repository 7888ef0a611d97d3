//! Record derivation.
//!
//! - [`hashing`]: SHA-256 hex digests
//! - [`derive`]: validated submission + client IP -> stored record
//! - [`intake`]: validate-then-derive over a batch of raw JSON records

pub mod derive;
pub mod hashing;
pub mod intake;

pub use derive::{derive, RecordDeriver};
pub use hashing::sha256_hex;
pub use intake::{derive_records, process_file, validate_records, IntakeReport, ValidationReport};
