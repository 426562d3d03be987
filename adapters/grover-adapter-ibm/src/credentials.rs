//! Credential resolution for the IBM runtime.
//!
//! Sources, first match wins:
//! 1. `IBM_API_KEY` + `IBM_SERVICE_CRN` (IBM Cloud, IAM exchange)
//! 2. `IBM_QUANTUM_TOKEN` (legacy bearer token)
//! 3. the saved account file written by `grover auth save`

use std::fmt;

use grover_hal::{AccountStore, Channel, SavedAccount};
use tracing::info;

use crate::api::{DEFAULT_INSTANCE, IbmClient, LEGACY_ENDPOINT};
use crate::error::{IbmError, IbmResult};

pub const API_KEY_VAR: &str = "IBM_API_KEY";
pub const SERVICE_CRN_VAR: &str = "IBM_SERVICE_CRN";
pub const TOKEN_VAR: &str = "IBM_QUANTUM_TOKEN";

/// Where a credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    SavedAccount,
}

/// Resolved credentials for one of the two IBM channels.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Bearer token against the legacy platform or a custom endpoint.
    Token {
        token: String,
        endpoint: String,
        instance: Option<String>,
        source: CredentialSource,
    },
    /// IBM Cloud API key exchanged for an IAM token.
    CloudApiKey {
        api_key: String,
        service_crn: String,
        source: CredentialSource,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Token {
                endpoint,
                instance,
                source,
                ..
            } => f
                .debug_struct("Token")
                .field("endpoint", endpoint)
                .field("instance", instance)
                .field("source", source)
                .finish_non_exhaustive(),
            Credentials::CloudApiKey {
                service_crn, source, ..
            } => f
                .debug_struct("CloudApiKey")
                .field("service_crn", service_crn)
                .field("source", source)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// Resolve from the process environment and, failing that, `store`.
    pub fn resolve(store: Option<&AccountStore>) -> IbmResult<Self> {
        let saved = match store {
            Some(store) => store.load().map_err(IbmError::Account)?,
            None => None,
        };
        Self::from_sources(|key| std::env::var(key).ok(), saved)
    }

    /// Resolve from an environment lookup and an optional saved account.
    pub fn from_sources(
        env: impl Fn(&str) -> Option<String>,
        saved: Option<SavedAccount>,
    ) -> IbmResult<Self> {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = var(API_KEY_VAR) {
            let service_crn = var(SERVICE_CRN_VAR).ok_or(IbmError::MissingServiceCrn)?;
            return Ok(Credentials::CloudApiKey {
                api_key,
                service_crn,
                source: CredentialSource::Environment,
            });
        }
        if let Some(token) = var(TOKEN_VAR) {
            return Ok(Credentials::Token {
                token,
                endpoint: LEGACY_ENDPOINT.to_string(),
                instance: Some(DEFAULT_INSTANCE.to_string()),
                source: CredentialSource::Environment,
            });
        }

        match saved {
            Some(account) => Self::from_account(account),
            None => Err(IbmError::MissingToken),
        }
    }

    fn from_account(account: SavedAccount) -> IbmResult<Self> {
        match account.channel {
            Channel::IbmCloud => Ok(Credentials::CloudApiKey {
                api_key: account.token,
                service_crn: account.instance.ok_or(IbmError::MissingServiceCrn)?,
                source: CredentialSource::SavedAccount,
            }),
            Channel::IbmQuantum => Ok(Credentials::Token {
                token: account.token,
                endpoint: account.url.unwrap_or_else(|| LEGACY_ENDPOINT.to_string()),
                instance: Some(
                    account
                        .instance
                        .unwrap_or_else(|| DEFAULT_INSTANCE.to_string()),
                ),
                source: CredentialSource::SavedAccount,
            }),
        }
    }

    /// Point token credentials at another endpoint. API keys always use the
    /// IBM Cloud endpoint.
    #[must_use]
    pub fn with_endpoint(self, url: impl Into<String>) -> Self {
        match self {
            Credentials::Token {
                token,
                instance,
                source,
                ..
            } => Credentials::Token {
                token,
                endpoint: url.into(),
                instance,
                source,
            },
            cloud @ Credentials::CloudApiKey { .. } => cloud,
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            Credentials::Token { .. } => Channel::IbmQuantum,
            Credentials::CloudApiKey { .. } => Channel::IbmCloud,
        }
    }

    pub fn source(&self) -> CredentialSource {
        match self {
            Credentials::Token { source, .. } | Credentials::CloudApiKey { source, .. } => *source,
        }
    }

    /// Authenticate and build an API client.
    pub async fn client(&self) -> IbmResult<IbmClient> {
        match self {
            Credentials::CloudApiKey {
                api_key,
                service_crn,
                ..
            } => {
                info!("connecting to IBM Cloud (IAM key exchange)");
                IbmClient::connect(api_key, service_crn).await
            }
            Credentials::Token {
                token,
                endpoint,
                instance,
                ..
            } => {
                info!("connecting to {endpoint} with a bearer token");
                let client = IbmClient::new(endpoint.as_str(), token)?;
                Ok(match instance {
                    Some(instance) => client.with_instance(instance.as_str()),
                    None => client,
                })
            }
        }
    }
}
