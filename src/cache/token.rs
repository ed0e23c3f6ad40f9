use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Access tokens older than this are refreshed before use.
pub const MAX_TOKEN_AGE_SECONDS: f64 = 7200.0;

/// Persisted credential record.
///
/// `timestamp` is the issue time of `access_token` in unix seconds and has no
/// meaning without it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "timestamp", default)]
    pub issued_at: Option<f64>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default, serialize_with = "serialize_secret")]
    pub client_secret: Option<SecretString>,
}

impl TokenRecord {
    pub fn access_token(&self) -> Option<&str> {
        non_empty(&self.access_token)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        non_empty(&self.refresh_token)
    }

    /// Seconds since the access token was issued, if there is one.
    pub fn age(&self, now: f64) -> Option<f64> {
        self.access_token()?;
        self.issued_at.filter(|ts| *ts > 0.0).map(|ts| now - ts)
    }

    pub fn is_fresh(&self, now: f64) -> bool {
        self.age(now).is_some_and(|age| age < MAX_TOKEN_AGE_SECONDS)
    }
}

/// Fields consumed from the token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn serialize_secret<S: Serializer>(secret: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error> {
    secret
        .as_ref()
        .map(|value| value.expose_secret().as_str())
        .serialize(serializer)
}
