use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use cti_exchange::state::{AppState, NetworkExchange, StateError};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("no Vault token given: pass --{flag} or set {env}")]
    MissingToken {
        flag: &'static str,
        env: &'static str,
    },
}

#[derive(Clone)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.cti)
    pub config_path: Option<PathBuf>,
    creator_token: Option<String>,
    consumer_token: Option<String>,
}

impl OpContext {
    pub fn new(
        config_path: Option<PathBuf>,
        creator_token: Option<String>,
        consumer_token: Option<String>,
    ) -> Self {
        Self {
            config_path,
            creator_token,
            consumer_token,
        }
    }

    pub fn load_state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_path.clone())
    }

    /// Exchange authenticated as the publishing party
    pub fn creator_exchange(&self) -> Result<NetworkExchange, ContextError> {
        let token = self
            .creator_token
            .as_deref()
            .ok_or(ContextError::MissingToken {
                flag: "creator-token",
                env: "CTI_CREATOR_TOKEN",
            })?;
        Ok(self.load_state()?.exchange(token)?)
    }

    /// Exchange authenticated as the consuming party
    pub fn consumer_exchange(&self) -> Result<NetworkExchange, ContextError> {
        let token = self
            .consumer_token
            .as_deref()
            .ok_or(ContextError::MissingToken {
                flag: "consumer-token",
                env: "CTI_CONSUMER_TOKEN",
            })?;
        Ok(self.load_state()?.exchange(token)?)
    }

    /// Ledger-only operations still go through an exchange, which needs
    ///  some token; the Vault side is never called for them
    pub fn ledger_exchange(&self) -> Result<NetworkExchange, ContextError> {
        let token = self
            .consumer_token
            .as_deref()
            .or(self.creator_token.as_deref())
            .unwrap_or_default();
        Ok(self.load_state()?.exchange(token)?)
    }
}

impl fmt::Debug for OpContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpContext")
            .field("config_path", &self.config_path)
            .field("creator_token", &self.creator_token.as_ref().map(|_| "[REDACTED]"))
            .field("consumer_token", &self.consumer_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
