use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use common::secret_store::{SecretStore, SecretStoreError};

use super::{join_url, AdapterError};

const TOKEN_HEADER: &str = "X-Vault-Token";

#[derive(Serialize)]
struct WriteRequest<'a> {
    data: SecretValue<'a>,
}

#[derive(Serialize)]
struct SecretValue<'a> {
    value: &'a str,
}

/// KV v2 read responses nest the secret under `data.data`
#[derive(Deserialize)]
struct ReadResponse {
    data: ReadData,
}

#[derive(Deserialize)]
struct ReadData {
    data: StoredValue,
}

#[derive(Deserialize)]
struct StoredValue {
    value: String,
}

/// Secret store backed by a Vault KV v2 engine
///
/// Secret names are `{mount}/{key}` and map onto
///  `{addr}/v1/{mount}/data/{key}`. The key is the last path segment, so
///  the mount may itself be nested (`teams/cti`).
#[derive(Clone)]
pub struct VaultSecretStore {
    addr: Url,
    token: String,
    client: Client,
}

impl VaultSecretStore {
    pub fn new(addr: &Url, token: impl Into<String>) -> Result<Self, AdapterError> {
        let client = Client::builder().build()?;
        Ok(Self {
            addr: addr.clone(),
            token: token.into(),
            client,
        })
    }

    pub fn addr(&self) -> &Url {
        &self.addr
    }

    fn secret_url(&self, name: &str) -> Result<Url, SecretStoreError> {
        let (mount, path) = name
            .rsplit_once('/')
            .filter(|(mount, path)| !mount.is_empty() && !path.is_empty())
            .ok_or_else(|| {
                SecretStoreError::Malformed(format!("secret name {:?} has no mount", name))
            })?;
        join_url(&self.addr, &format!("v1/{}/data/{}", mount, path))
            .map_err(|e| SecretStoreError::Malformed(e.to_string()))
    }
}

impl fmt::Debug for VaultSecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultSecretStore")
            .field("addr", &self.addr.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

fn transport(e: reqwest::Error) -> SecretStoreError {
    SecretStoreError::Transport(e.to_string())
}

/// Map a non-success status onto the secret store's error kinds
async fn check_status(name: &str, response: Response) -> Result<Response, SecretStoreError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(SecretStoreError::NotFound(name.to_string())),
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
            Err(SecretStoreError::Denied(name.to_string()))
        }
        status => {
            let body = response.text().await.unwrap_or_default();
            Err(SecretStoreError::Transport(format!(
                "HTTP status {}: {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl SecretStore for VaultSecretStore {
    async fn put(&self, name: &str, value: String) -> Result<(), SecretStoreError> {
        let url = self.secret_url(name)?;
        let response = self
            .client
            .post(url)
            .header(TOKEN_HEADER, &self.token)
            .json(&WriteRequest {
                data: SecretValue { value: &value },
            })
            .send()
            .await
            .map_err(transport)?;
        check_status(name, response).await?;
        tracing::debug!(name, "secret written to vault");
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<String, SecretStoreError> {
        let url = self.secret_url(name)?;
        let response = self
            .client
            .get(url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(transport)?;
        let response = check_status(name, response).await?;
        let body: ReadResponse = response
            .json()
            .await
            .map_err(|e| SecretStoreError::Malformed(e.to_string()))?;
        Ok(body.data.data.value)
    }
}
