use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use url::Url;

use common::content_store::{ContentId, ContentStore, ContentStoreError};

use super::{join_url, AdapterError};

/// Name the sealed blob is uploaded under
const UPLOAD_FILE_NAME: &str = "encrypted_data";

/// Content store backed by an IPFS cluster's add endpoint for writes
///  and an IPFS gateway for reads
#[derive(Debug, Clone)]
pub struct IpfsContentStore {
    add_url: Url,
    gateway_url: Url,
    client: Client,
}

impl IpfsContentStore {
    pub fn new(add_url: &Url, gateway_url: &Url) -> Result<Self, AdapterError> {
        Ok(Self {
            add_url: add_url.clone(),
            gateway_url: gateway_url.clone(),
            client: Client::builder().build()?,
        })
    }

    fn content_url(&self, id: &ContentId) -> Result<Url, ContentStoreError> {
        join_url(&self.gateway_url, id.as_str())
            .map_err(|e| ContentStoreError::Malformed(e.to_string()))
    }
}

/// Pull the CID out of an add response.
///  The cluster streams one JSON object per line and may encode the
///  CID either as a string or as an IPLD link (`{"/": "..."}`).
fn parse_add_response(body: &str) -> Result<ContentId, ContentStoreError> {
    let line = body
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| ContentStoreError::Malformed("empty add response".to_string()))?;
    let value: Value = serde_json::from_str(line)
        .map_err(|e| ContentStoreError::Malformed(format!("invalid add response: {}", e)))?;

    let cid = match &value["cid"] {
        Value::String(cid) => Some(cid.as_str()),
        Value::Object(link) => link.get("/").and_then(Value::as_str),
        _ => None,
    };
    match cid {
        Some(cid) if !cid.is_empty() => Ok(ContentId::new(cid)),
        _ => Err(ContentStoreError::Malformed(format!(
            "add response carries no CID: {}",
            line
        ))),
    }
}

fn transport(e: reqwest::Error) -> ContentStoreError {
    ContentStoreError::Transport(e.to_string())
}

async fn status_error(response: Response) -> ContentStoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ContentStoreError::Transport(format!("HTTP status {}: {}", status, body))
}

#[async_trait]
impl ContentStore for IpfsContentStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, ContentStoreError> {
        let size = data.len();
        let part = Part::bytes(data.to_vec()).file_name(UPLOAD_FILE_NAME);
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.add_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        match response.status() {
            status if status.is_success() => {}
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                return Err(ContentStoreError::Denied(self.add_url.to_string()))
            }
            _ => return Err(status_error(response).await),
        }

        let body = response.text().await.map_err(transport)?;
        let cid = parse_add_response(&body)?;
        tracing::debug!(cid = %cid, size, "blob added to ipfs");
        Ok(cid)
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, ContentStoreError> {
        let response = self
            .client
            .get(self.content_url(id)?)
            .send()
            .await
            .map_err(transport)?;
        match response.status() {
            status if status.is_success() => response.bytes().await.map_err(transport),
            StatusCode::NOT_FOUND => Err(ContentStoreError::NotFound(id.clone())),
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                Err(ContentStoreError::Denied(id.to_string()))
            }
            _ => Err(status_error(response).await),
        }
    }
}
