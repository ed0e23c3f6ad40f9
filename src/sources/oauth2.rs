use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};

use crate::cache::token::{TokenRecord, TokenResponse};
use crate::cache::token_store::TokenStore;
use crate::error::{AuthError, TransportError};
use crate::helpers::time::{Clock, SystemClock};
use crate::sources::transport::Transport;

pub const TOKEN_PATH: &str = "/oauth2/token";

const GRANT_REFRESH_TOKEN: &str = "refresh_token";
const GRANT_CLIENT_CREDENTIALS: &str = "client_credentials";

/// Client credentials used for reissue; both halves must be present to be usable.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
}

impl Credentials {
    pub fn new(client_id: Option<String>, client_secret: Option<SecretString>) -> Self {
        Self { client_id, client_secret }
    }

    fn pair(&self) -> Option<(&str, &str)> {
        let id = self.client_id.as_deref().filter(|v| !v.is_empty())?;
        let secret = self
            .client_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .filter(|v| !v.is_empty())?;
        Some((id, secret))
    }
}

/// Decides between the cached token, a refresh and a full reissue.
///
/// Cached token younger than two hours is returned without network traffic.
/// Otherwise a refresh is tried when a refresh token exists, and a failed
/// refresh falls back to exactly one client-credentials reissue.
pub struct TokenManager<S, T, C = SystemClock> {
    store: S,
    transport: T,
    credentials: Credentials,
    clock: C,
}

impl<S: TokenStore, T: Transport> TokenManager<S, T, SystemClock> {
    pub fn new(store: S, transport: T, credentials: Credentials) -> Self {
        Self::with_clock(store, transport, credentials, SystemClock)
    }
}

impl<S: TokenStore, T: Transport, C: Clock> TokenManager<S, T, C> {
    pub fn with_clock(store: S, transport: T, credentials: Credentials, clock: C) -> Self {
        Self { store, transport, credentials, clock }
    }

    pub async fn usable_token(&self) -> Result<String, AuthError> {
        let record = match self.store.load() {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                warn!("could not read token record, starting without one: {}", e);
                TokenRecord::default()
            }
        };

        if record.is_fresh(self.clock.now()) {
            if let Some(token) = record.access_token() {
                info!("found valid access token in cache");
                return Ok(token.to_owned());
            }
        }

        if let Some(refresh_token) = record.refresh_token() {
            if record.access_token().is_some() {
                info!("access token expired, refreshing");
            } else {
                info!("found refresh token, refreshing");
            }
            match self.refresh(refresh_token).await {
                Ok(response) => return Ok(self.persist(response, Some(refresh_token))),
                Err(e) => warn!("token refresh failed: {}", e),
            }
        }

        self.reissue().await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, TransportError> {
        let mut form = vec![
            ("grant_type", GRANT_REFRESH_TOKEN.to_owned()),
            ("refresh_token", refresh_token.to_owned()),
        ];
        if let Some((id, secret)) = self.credentials.pair() {
            form.push(("client_id", id.to_owned()));
            form.push(("client_secret", secret.to_owned()));
        }
        self.exchange(&form).await
    }

    async fn reissue(&self) -> Result<String, AuthError> {
        let (id, secret) = self.credentials.pair().ok_or(AuthError::NoCredentials)?;
        info!("authenticating with client credentials");
        let form = [
            ("grant_type", GRANT_CLIENT_CREDENTIALS.to_owned()),
            ("client_id", id.to_owned()),
            ("client_secret", secret.to_owned()),
        ];
        let response = self.exchange(&form).await.map_err(AuthError::ExchangeFailed)?;
        Ok(self.persist(response, None))
    }

    async fn exchange(&self, form: &[(&str, String)]) -> Result<TokenResponse, TransportError> {
        let body = self.transport.post_form(TOKEN_PATH, form).await?;
        let response: TokenResponse =
            serde_json::from_value(body).map_err(|e| TransportError::Decode(e.to_string()))?;
        if response.access_token.is_empty() {
            return Err(TransportError::Decode("empty access_token".to_owned()));
        }
        Ok(response)
    }

    /// Store the new record; a failed write still hands out the fresh token.
    fn persist(&self, response: TokenResponse, previous_refresh: Option<&str>) -> String {
        let refresh_token = response
            .refresh_token
            .filter(|t| !t.is_empty())
            .or_else(|| previous_refresh.map(str::to_owned));
        let record = TokenRecord {
            access_token: Some(response.access_token.clone()),
            refresh_token,
            issued_at: Some(self.clock.now()),
            client_id: self.credentials.client_id.clone(),
            client_secret: self.credentials.client_secret.clone(),
        };
        if let Err(e) = self.store.save(&record) {
            warn!("could not persist token record: {}", e);
        }
        response.access_token
    }
}
