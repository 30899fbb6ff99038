//! Payload validation. A whitespace-only field counts as empty.

use crate::domain::entities::VoterRecord;
use crate::domain::errors::ValidationError;
use shared_types::VoteConfirmationPayload;

/// Check the required fields and produce a trimmed [`VoterRecord`].
pub fn validate(payload: &VoteConfirmationPayload) -> Result<VoterRecord, ValidationError> {
    let nombres = payload.nombres.trim();
    let cedula = payload.cedula.trim();
    let email = payload.email.trim();

    let missing: Vec<&'static str> = [("nombres", nombres), ("cedula", cedula), ("email", email)]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError { missing });
    }

    Ok(VoterRecord {
        nombres: nombres.to_string(),
        cedula: cedula.to_string(),
        email: email.to_string(),
        recinto: payload
            .recinto
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string),
    })
}
