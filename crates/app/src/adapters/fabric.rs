use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::process::Command;

use common::ledger::{Ledger, LedgerError};

/// How to reach the chaincode through the `kubectl hlf` plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricSettings {
    /// Program the `hlf chaincode invoke` subcommand is run under
    #[serde(default = "default_kubectl")]
    pub kubectl: String,
    /// Network config handed to `--config`
    #[serde(default = "default_config_file")]
    pub config_file: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_peer")]
    pub peer: String,
    #[serde(default = "default_chaincode")]
    pub chaincode: String,
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_kubectl() -> String {
    "kubectl".to_string()
}

fn default_config_file() -> String {
    "cti/org1.yaml".to_string()
}

fn default_user() -> String {
    "org1-admin-default".to_string()
}

fn default_peer() -> String {
    "org1-peer0.default".to_string()
}

fn default_chaincode() -> String {
    "ctitransfer104".to_string()
}

fn default_channel() -> String {
    "demo".to_string()
}

impl Default for FabricSettings {
    fn default() -> Self {
        Self {
            kubectl: default_kubectl(),
            config_file: default_config_file(),
            user: default_user(),
            peer: default_peer(),
            chaincode: default_chaincode(),
            channel: default_channel(),
        }
    }
}

/// Ledger backed by Hyperledger Fabric chaincode, one subprocess per call
#[derive(Debug, Clone)]
pub struct FabricLedger {
    settings: FabricSettings,
}

impl FabricLedger {
    pub fn new(settings: FabricSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FabricSettings {
        &self.settings
    }

    /// Arguments after the program name; each function argument
    ///  gets its own `--args` flag
    fn invoke_args(&self, function: &str, args: &[String]) -> Vec<String> {
        let s = &self.settings;
        let mut argv: Vec<String> = [
            "hlf",
            "chaincode",
            "invoke",
            "--config",
            s.config_file.as_str(),
            "--user",
            s.user.as_str(),
            "--peer",
            s.peer.as_str(),
            "--chaincode",
            s.chaincode.as_str(),
            "--channel",
            s.channel.as_str(),
            "--fcn",
            function,
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect();
        for arg in args {
            argv.push("--args".to_string());
            argv.push(arg.clone());
        }
        argv
    }
}

/// Parse chaincode output. Empty output means the function returned nothing.
fn parse_output(function: &str, stdout: &str) -> Result<Value, LedgerError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }
    // The plugin may log before printing the payload
    let last = trimmed.lines().last().unwrap_or_default();
    serde_json::from_str(last).map_err(|e| LedgerError::Malformed {
        function: function.to_string(),
        reason: format!("{}: {}", e, trimmed),
    })
}

#[async_trait]
impl Ledger for FabricLedger {
    async fn invoke(&self, function: &str, args: &[String]) -> Result<Value, LedgerError> {
        let output = Command::new(&self.settings.kubectl)
            .args(self.invoke_args(function, args))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                LedgerError::Transport(format!(
                    "failed to run {}: {}",
                    self.settings.kubectl, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(LedgerError::Invocation {
                function: function.to_string(),
                message,
            });
        }

        tracing::debug!(
            function,
            chaincode = %self.settings.chaincode,
            channel = %self.settings.channel,
            "chaincode invoked"
        );
        parse_output(function, &String::from_utf8_lossy(&output.stdout))
    }
}
