use thiserror::Error;
use tickwatch_core::{AggregateError, FixtureLoadError, OwnershipError, ProviderFailure};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickwatch_core::ValidationError),

    #[error(transparent)]
    Ownership(#[from] OwnershipError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Fixture(#[from] FixtureLoadError),

    #[error("provider failure: {0}")]
    Provider(#[from] ProviderFailure),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Ownership(_) => 3,
            Self::Aggregate(AggregateError::OwnershipLookupFailed(_)) => 3,
            Self::Aggregate(AggregateError::DeadlineExceeded { .. }) => 4,
            Self::Serialization(_) => 5,
            Self::Provider(_) => 6,
            Self::Fixture(FixtureLoadError::Io { .. }) => 10,
            Self::Fixture(FixtureLoadError::Invalid { .. }) => 2,
            Self::Io(_) => 10,
        }
    }
}
