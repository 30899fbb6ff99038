//! # Attack Simulations
//!
//! | Attack | Target | Expected |
//! |--------|--------|----------|
//! | Bit flips anywhere in the envelope | CS-01 unpacker | opaque `EnvelopeError` |
//! | Credential guessing | CS-01 access guard | rejected before any crypto |
//! | Forged signer / wrong recipient / `alg: none` | CS-01 unpacker | opaque `EnvelopeError` |
//! | Redelivery of one confirmation | CS-02 redelivery guard | one email |

pub mod credential_guessing;
pub mod envelope_tampering;
pub mod key_substitution;
pub mod redelivery_flood;
