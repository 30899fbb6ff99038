//! # Outbound Ports (Driven Ports / SPI)
//!
//! The cryptographic envelope opener, behind a trait so the intake service
//! can be exercised without real keys.

use crate::domain::envelope::EnvelopeUnpacker;
use crate::domain::errors::EnvelopeError;
use shared_types::VoteConfirmationPayload;

/// Opens a compact envelope into a payload.
pub trait EnvelopeOpener: Send + Sync {
    fn unpack(&self, envelope: &str) -> Result<VoteConfirmationPayload, EnvelopeError>;
}

impl EnvelopeOpener for EnvelopeUnpacker {
    fn unpack(&self, envelope: &str) -> Result<VoteConfirmationPayload, EnvelopeError> {
        EnvelopeUnpacker::unpack(self, envelope)
    }
}

impl<O: EnvelopeOpener + ?Sized> EnvelopeOpener for std::sync::Arc<O> {
    fn unpack(&self, envelope: &str) -> Result<VoteConfirmationPayload, EnvelopeError> {
        (**self).unpack(envelope)
    }
}
