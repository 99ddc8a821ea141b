//! The REST identity store client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medipass_core::IdentityId;
use medipass_directory::{
    DirectoryError, DirectoryResult, Identity, IdentityStore, NewIdentity, RecoveryArtifact,
    StoreKind,
};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::RestIdentityConfig;

/// Wire shape of an identity record.
#[derive(Debug, Deserialize)]
struct IdentityDto {
    id: Uuid,
    address: String,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl From<IdentityDto> for Identity {
    fn from(dto: IdentityDto) -> Self {
        Identity {
            id: IdentityId::from_uuid(dto.id),
            address: dto.address,
            metadata: dto.metadata,
            created_at: dto.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdentityListDto {
    identities: Vec<IdentityDto>,
}

#[derive(Debug, Serialize)]
struct SecretDto<'a> {
    secret: &'a str,
}

#[derive(Debug, Serialize)]
struct RecoveryRequestDto<'a> {
    identity_id: Uuid,
    redirect_to: &'a str,
}

#[derive(Debug, Deserialize)]
struct RecoveryDto {
    identity_id: Uuid,
    action_link: String,
    expires_at: DateTime<Utc>,
}

/// [`IdentityStore`] implementation over the identity provider's HTTP
/// API.
pub struct RestIdentityStore {
    config: RestIdentityConfig,
    client: Client,
}

impl std::fmt::Debug for RestIdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestIdentityStore")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

fn transport_error(e: &reqwest::Error) -> DirectoryError {
    DirectoryError::backend(StoreKind::Identity, e.to_string())
}

impl RestIdentityStore {
    /// Build the client from a validated config.
    ///
    /// # Errors
    ///
    /// Returns a backend error when the config is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(config: RestIdentityConfig) -> DirectoryResult<Self> {
        config
            .validate()
            .map_err(|message| DirectoryError::backend(StoreKind::Identity, message))?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .build()
            .map_err(|e| transport_error(&e))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    fn service_auth(&self) -> String {
        format!("Bearer {}", self.config.service_token)
    }

    /// Map a non-success admin response to a directory error, passing
    /// the body message through verbatim.
    async fn admin_error(response: Response, resource: &'static str) -> DirectoryError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => DirectoryError::not_found(resource, None),
            StatusCode::CONFLICT => DirectoryError::AddressInUse { address: body },
            _ => DirectoryError::backend(
                StoreKind::Identity,
                format!("{status}: {body}"),
            ),
        }
    }
}

#[async_trait]
impl IdentityStore for RestIdentityStore {
    async fn find_by_address(&self, address: &str) -> DirectoryResult<Option<Identity>> {
        let response = self
            .client
            .get(self.url("/admin/identities"))
            .header(reqwest::header::AUTHORIZATION, self.service_auth())
            .query(&[("address", address)])
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        if !response.status().is_success() {
            return Err(Self::admin_error(response, "Identity").await);
        }
        let list: IdentityListDto = response.json().await.map_err(|e| transport_error(&e))?;
        Ok(list.identities.into_iter().next().map(Identity::from))
    }

    async fn list(&self) -> DirectoryResult<Vec<Identity>> {
        let response = self
            .client
            .get(self.url("/admin/identities"))
            .header(reqwest::header::AUTHORIZATION, self.service_auth())
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        if !response.status().is_success() {
            return Err(Self::admin_error(response, "Identity").await);
        }
        let list: IdentityListDto = response.json().await.map_err(|e| transport_error(&e))?;
        Ok(list.identities.into_iter().map(Identity::from).collect())
    }

    async fn create(&self, new: NewIdentity) -> DirectoryResult<Identity> {
        let response = self
            .client
            .post(self.url("/admin/identities"))
            .header(reqwest::header::AUTHORIZATION, self.service_auth())
            .json(&new)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        if response.status() == StatusCode::CONFLICT {
            return Err(DirectoryError::AddressInUse {
                address: new.address,
            });
        }
        if !response.status().is_success() {
            return Err(Self::admin_error(response, "Identity").await);
        }
        let dto: IdentityDto = response.json().await.map_err(|e| transport_error(&e))?;
        tracing::debug!(identity_id = %dto.id, "Identity created");
        Ok(dto.into())
    }

    async fn rotate_secret(&self, id: IdentityId, secret: &str) -> DirectoryResult<()> {
        let response = self
            .client
            .put(self.url(&format!("/admin/identities/{id}/secret")))
            .header(reqwest::header::AUTHORIZATION, self.service_auth())
            .json(&SecretDto { secret })
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        if !response.status().is_success() {
            return Err(Self::admin_error(response, "Identity").await);
        }
        Ok(())
    }

    async fn delete(&self, id: IdentityId) -> DirectoryResult<()> {
        // The provider cascades role-binding removal on this call.
        let response = self
            .client
            .delete(self.url(&format!("/admin/identities/{id}")))
            .header(reqwest::header::AUTHORIZATION, self.service_auth())
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        if !response.status().is_success() {
            return Err(Self::admin_error(response, "Identity").await);
        }
        Ok(())
    }

    async fn resolve_bearer(&self, token: &str) -> DirectoryResult<Identity> {
        let response = self
            .client
            .get(self.url("/identities/me"))
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DirectoryError::InvalidToken),
            status if status.is_success() => {
                let dto: IdentityDto =
                    response.json().await.map_err(|e| transport_error(&e))?;
                Ok(dto.into())
            }
            _ => Err(Self::admin_error(response, "Identity").await),
        }
    }

    async fn mint_recovery(
        &self,
        identity_id: IdentityId,
        redirect_to: &str,
    ) -> DirectoryResult<RecoveryArtifact> {
        let response = self
            .client
            .post(self.url("/admin/recovery"))
            .header(reqwest::header::AUTHORIZATION, self.service_auth())
            .json(&RecoveryRequestDto {
                identity_id: *identity_id.as_uuid(),
                redirect_to,
            })
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        if !response.status().is_success() {
            return Err(Self::admin_error(response, "Identity").await);
        }
        let dto: RecoveryDto = response.json().await.map_err(|e| transport_error(&e))?;
        Ok(RecoveryArtifact {
            identity_id: IdentityId::from_uuid(dto.identity_id),
            action_link: dto.action_link,
            expires_at: dto.expires_at,
        })
    }
}
