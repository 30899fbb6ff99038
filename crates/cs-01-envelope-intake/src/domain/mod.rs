//! Domain layer: key material, the envelope unpacker and the access guard.

pub mod envelope;
pub mod errors;
pub mod guard;
pub mod keys;
