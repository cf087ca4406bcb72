//! Request signing for the Kagami asset mirror.
//!
//! This crate provides:
//! - Digest primitives (SHA-256/SHA-1 hashing, HMAC chains over byte keys)
//! - The cloud-API signing scheme (TC3-style HMAC-SHA256 chain)
//! - The object-storage signing scheme (COS-style time-windowed HMAC-SHA1)
//!
//! The two schemes are structurally similar but differ in literal constants,
//! header sets, and encoding rules; they are deliberately kept as two
//! distinct strategies behind the [`RequestSigner`] trait rather than one
//! parameterized implementation.

pub mod cos;
pub mod digest;
pub mod error;
pub mod request;
pub mod tc3;

pub use cos::CosSigner;
pub use error::{SignerError, SignerResult};
pub use request::{RequestSigner, SignableRequest};
pub use tc3::Tc3Signer;
