use std::fmt::{self, Display};
use std::path::PathBuf;

use crate::content_store::ContentStoreError;
use crate::crypto::EnvelopeError;
use crate::keys::KeyError;
use crate::ledger::LedgerError;
use crate::source::RandomError;

/// The protocol step an exchange failed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    ReadArtifact,
    GenerateKey,
    Seal,
    NameKey,
    StoreKey,
    StoreContent,
    BuildRecord,
    AnchorRecord,
    ReadRecord,
    FetchContent,
    FetchKey,
    Open,
    ListRecords,
    DeleteRecord,
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::ReadArtifact => "read artifact",
            Step::GenerateKey => "generate key",
            Step::Seal => "seal",
            Step::NameKey => "name key",
            Step::StoreKey => "store key",
            Step::StoreContent => "store content",
            Step::BuildRecord => "build record",
            Step::AnchorRecord => "anchor record",
            Step::ReadRecord => "read record",
            Step::FetchContent => "fetch content",
            Step::FetchKey => "fetch key",
            Step::Open => "open",
            Step::ListRecords => "list records",
            Step::DeleteRecord => "delete record",
        };
        f.write_str(name)
    }
}

/// Coarse grouping of failures for callers deciding what to tell a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Something could not be fetched or stored
    Infrastructure,
    /// Data was fetched but failed authentication
    Trust,
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("{step}: could not read {path:?}: {source}")]
    Io {
        step: Step,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{step}: {source}")]
    KeyUnavailable {
        step: Step,
        #[source]
        source: KeyError,
    },
    #[error("{step}: {source}")]
    ContentUnavailable {
        step: Step,
        #[source]
        source: ContentStoreError,
    },
    /// The stored blob did not authenticate under its key. Always fatal.
    #[error("{step}: {source}")]
    AuthenticationFailure {
        step: Step,
        #[source]
        source: EnvelopeError,
    },
    #[error("{step}: {source}")]
    LedgerFailure {
        step: Step,
        #[source]
        source: LedgerError,
    },
    #[error("{step}: {source}")]
    Encryption {
        step: Step,
        #[source]
        source: EnvelopeError,
    },
    #[error("{step}: {source}")]
    Random {
        step: Step,
        #[source]
        source: RandomError,
    },
}

impl ExchangeError {
    pub fn step(&self) -> Step {
        match self {
            ExchangeError::Io { step, .. }
            | ExchangeError::KeyUnavailable { step, .. }
            | ExchangeError::ContentUnavailable { step, .. }
            | ExchangeError::AuthenticationFailure { step, .. }
            | ExchangeError::LedgerFailure { step, .. }
            | ExchangeError::Encryption { step, .. }
            | ExchangeError::Random { step, .. } => *step,
        }
    }

    pub fn class(&self) -> FailureClass {
        match self {
            ExchangeError::AuthenticationFailure { .. } => FailureClass::Trust,
            _ => FailureClass::Infrastructure,
        }
    }

    /// True if the failure was a collaborator call running past its deadline
    pub fn is_timeout(&self) -> bool {
        use crate::secret_store::SecretStoreError;

        matches!(
            self,
            ExchangeError::KeyUnavailable {
                source: KeyError::Unavailable {
                    source: SecretStoreError::Timeout(_),
                    ..
                },
                ..
            } | ExchangeError::ContentUnavailable {
                source: ContentStoreError::Timeout(_),
                ..
            } | ExchangeError::LedgerFailure {
                source: LedgerError::Timeout(_),
                ..
            }
        )
    }
}
