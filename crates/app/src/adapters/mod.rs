//! Network-backed collaborators for the exchange
//!
//! - [`VaultSecretStore`]: HashiCorp Vault KV v2 over HTTP
//! - [`IpfsContentStore`]: an IPFS cluster add endpoint plus a gateway
//! - [`FabricLedger`]: Hyperledger Fabric chaincode invoked via `kubectl hlf`
//!
//! These are transports only. Deadlines are applied by the exchange.

mod fabric;
mod ipfs;
mod vault;

pub use fabric::{FabricLedger, FabricSettings};
pub use ipfs::IpfsContentStore;
pub use vault::VaultSecretStore;

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Join a path onto a base URL, keeping any path the base already has
pub(crate) fn join_url(base: &url::Url, path: &str) -> Result<url::Url, url::ParseError> {
    url::Url::parse(&format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_join_url_keeps_base_path() {
        let base = url::Url::parse("http://172.20.0.2:8080/ipfs").unwrap();
        assert_eq!(
            join_url(&base, "bafkreiexample").unwrap().as_str(),
            "http://172.20.0.2:8080/ipfs/bafkreiexample"
        );

        let base = url::Url::parse("http://172.20.0.2:8200/").unwrap();
        assert_eq!(
            join_url(&base, "/v1/kv-v2/data/key").unwrap().as_str(),
            "http://172.20.0.2:8200/v1/kv-v2/data/key"
        );
    }
}
