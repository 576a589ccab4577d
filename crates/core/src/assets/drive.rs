//! Google Drive asset store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::DriveConfig;

use super::error::AssetFetchError;
use super::traits::AssetStore;
use super::types::FetchedAsset;

const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Slack subtracted from the token lifetime so a token is never used at the
/// edge of expiry.
const TOKEN_EXPIRY_SLACK_SECS: i64 = 60;

/// Service-account credentials, parsed from the configured JSON blob.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at - ChronoDuration::seconds(TOKEN_EXPIRY_SLACK_SECS)
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[allow(dead_code)]
    name: String,
    md5_checksum: Option<String>,
}

/// Google Drive implementation of [`AssetStore`].
///
/// Authenticates with a service-account JWT assertion and resolves files by
/// name within the configured shared folder.
#[derive(Debug)]
pub struct DriveClient {
    client: Client,
    key: ServiceAccountKey,
    folder_id: String,
    token: RwLock<Option<CachedToken>>,
}

impl DriveClient {
    /// Create a new client from the drive configuration.
    ///
    /// Fails fast on credentials that cannot be parsed or a folder link
    /// without a folder id; both are configuration problems, not fetch-time
    /// conditions.
    pub fn new(config: &DriveConfig) -> Result<Self, AssetFetchError> {
        let key: ServiceAccountKey = serde_json::from_str(&config.service_account_json)
            .map_err(|e| AssetFetchError::InvalidCredentials(e.to_string()))?;
        let folder_id = parse_folder_id(&config.folder_link)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            key,
            folder_id,
            token: RwLock::new(None),
        })
    }

    /// Get a valid access token, exchanging a fresh JWT assertion if the
    /// cached one is missing or near expiry.
    async fn access_token(&self) -> Result<String, AssetFetchError> {
        let now = Utc::now();
        {
            let token = self.token.read().await;
            if let Some(ref cached) = *token {
                if !cached.is_expired(now) {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let assertion = self.build_assertion(now)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AssetFetchError::Auth(format!("HTTP {status}: {body}")));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AssetFetchError::Auth(e.to_string()))?;

        let cached = CachedToken {
            access_token: token_response.access_token.clone(),
            expires_at: now + ChronoDuration::seconds(token_response.expires_in),
        };
        *self.token.write().await = Some(cached);

        debug!(expires_in = token_response.expires_in, "Drive token refreshed");
        Ok(token_response.access_token)
    }

    fn build_assertion(&self, now: DateTime<Utc>) -> Result<String, AssetFetchError> {
        let claims = TokenClaims {
            iss: &self.key.client_email,
            scope: DRIVE_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + 3600,
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| AssetFetchError::InvalidCredentials(e.to_string()))?;

        encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| AssetFetchError::InvalidCredentials(e.to_string()))
    }

    /// Look a file up by name within the shared folder.
    async fn find_file(&self, token: &str, name: &str) -> Result<DriveFile, AssetFetchError> {
        let query = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            name.replace('\'', "\\'"),
            self.folder_id
        );

        let response = self
            .client
            .get(format!("{DRIVE_API_BASE}/files"))
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name,md5Checksum)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AssetFetchError::Api {
                status,
                message: truncate(&body, 200),
            });
        }

        let list: FileList = response
            .json()
            .await
            .map_err(|e| AssetFetchError::Http(e.to_string()))?;

        list.files
            .into_iter()
            .next()
            .ok_or_else(|| AssetFetchError::NotFound {
                name: name.to_string(),
            })
    }

    /// Download a file's content and verify it against the drive-reported
    /// checksum when one is available.
    async fn download(
        &self,
        token: &str,
        file: &DriveFile,
        name: &str,
    ) -> Result<Vec<u8>, AssetFetchError> {
        let response = self
            .client
            .get(format!("{DRIVE_API_BASE}/files/{}", file.id))
            .bearer_auth(token)
            .query(&[("alt", "media"), ("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AssetFetchError::Api {
                status,
                message: truncate(&body, 200),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(map_transport_error)?
            .to_vec();

        if let Some(ref expected) = file.md5_checksum {
            let actual = format!("{:x}", md5::compute(&bytes));
            if &actual != expected {
                return Err(AssetFetchError::ChecksumMismatch {
                    name: name.to_string(),
                });
            }
        }

        Ok(bytes)
    }
}

#[async_trait]
impl AssetStore for DriveClient {
    fn name(&self) -> &str {
        "drive"
    }

    async fn fetch(
        &self,
        names: &[String],
        dest_dir: &Path,
    ) -> Result<Vec<FetchedAsset>, AssetFetchError> {
        let token = self.access_token().await?;
        tokio::fs::create_dir_all(dest_dir).await?;

        let mut fetched = Vec::with_capacity(names.len());
        for name in names {
            let file = self.find_file(&token, name).await?;
            let bytes = self.download(&token, &file, name).await?;

            let path = dest_dir.join(name);
            let size_bytes = bytes.len() as u64;
            tokio::fs::write(&path, bytes).await?;

            debug!(name = %name, size_bytes, "Asset downloaded");
            fetched.push(FetchedAsset {
                name: name.clone(),
                path,
                size_bytes,
            });
        }

        info!(count = fetched.len(), dir = %dest_dir.display(), "Assets fetched");
        Ok(fetched)
    }
}

fn map_transport_error(e: reqwest::Error) -> AssetFetchError {
    if e.is_timeout() {
        AssetFetchError::Timeout
    } else {
        AssetFetchError::Http(e.to_string())
    }
}

fn truncate(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

/// Extract the folder id from a share link, or accept a raw id verbatim.
fn parse_folder_id(link: &str) -> Result<String, AssetFetchError> {
    let link = link.trim();
    if link.is_empty() {
        return Err(AssetFetchError::InvalidFolderLink(link.to_string()));
    }

    if !link.contains('/') {
        return Ok(link.to_string());
    }

    let Some(after) = link.split("/folders/").nth(1) else {
        return Err(AssetFetchError::InvalidFolderLink(link.to_string()));
    };

    let id: String = after
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if id.is_empty() {
        return Err(AssetFetchError::InvalidFolderLink(link.to_string()));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_folder_id_from_share_link() {
        let id = parse_folder_id(
            "https://drive.google.com/drive/folders/1AbC-dEf_9?usp=sharing",
        )
        .unwrap();
        assert_eq!(id, "1AbC-dEf_9");
    }

    #[test]
    fn test_parse_folder_id_accepts_raw_id() {
        assert_eq!(parse_folder_id("1AbC-dEf_9").unwrap(), "1AbC-dEf_9");
    }

    #[test]
    fn test_parse_folder_id_rejects_non_folder_link() {
        let err = parse_folder_id("https://drive.google.com/file/d/xyz/view").unwrap_err();
        assert!(matches!(err, AssetFetchError::InvalidFolderLink(_)));
    }

    #[test]
    fn test_cached_token_expiry_slack() {
        let now = Utc::now();
        let token = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + ChronoDuration::seconds(30),
        };
        // Inside the 60s slack window counts as expired.
        assert!(token.is_expired(now));

        let fresh = CachedToken {
            access_token: "t".to_string(),
            expires_at: now + ChronoDuration::seconds(3600),
        };
        assert!(!fresh.is_expired(now));
    }

    #[test]
    fn test_invalid_credentials_fail_construction() {
        let config = DriveConfig {
            service_account_json: "not json".to_string(),
            folder_link: "1AbC".to_string(),
            timeout_secs: 10,
        };
        let err = DriveClient::new(&config).unwrap_err();
        assert!(matches!(err, AssetFetchError::InvalidCredentials(_)));
    }

    #[test]
    fn test_retryability_classification() {
        assert!(AssetFetchError::Timeout.is_retryable());
        assert!(AssetFetchError::Api {
            status: 500,
            message: String::new()
        }
        .is_retryable());
        assert!(!AssetFetchError::NotFound {
            name: "bg.png".to_string()
        }
        .is_retryable());
        assert!(!AssetFetchError::InvalidCredentials("x".to_string()).is_retryable());
    }
}
