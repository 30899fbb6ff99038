//! Domain layer: certificate entities, validation and error types.

pub mod entities;
pub mod errors;
pub mod validation;

pub use entities::*;
pub use errors::*;
pub use validation::validate;
