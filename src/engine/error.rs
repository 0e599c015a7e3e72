use thiserror::Error;

use crate::dom::DomError;

/// Failure inside an enhancement phase.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Dom(#[from] DomError),
}
