//! Common types, protocol definitions, and errors shared across `kvcrypt` crates.

pub mod error;
pub mod protocol;

pub use error::CryptoError;
