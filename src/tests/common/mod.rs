#![cfg(test)]

pub use serde_json::json;

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use crate::cache::token::TokenRecord;
use crate::error::TransportError;
use crate::sources::transport::Transport;

/// Request seen by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub path: String,
    pub form: Vec<(String, String)>,
    pub bearer: Option<String>,
}

impl Call {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// Transport answering from a queue of canned results, in order.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<Value, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: Call) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(call);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted response left".into())))
    }
}

impl Transport for ScriptedTransport {
    async fn post_form(&self, path: &str, form: &[(&str, String)]) -> Result<Value, TransportError> {
        self.answer(Call {
            path: path.to_owned(),
            form: form.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            bearer: None,
        })
    }

    async fn get_json(&self, path_and_query: &str, bearer: &str) -> Result<Value, TransportError> {
        self.answer(Call {
            path: path_and_query.to_owned(),
            form: Vec::new(),
            bearer: Some(bearer.to_owned()),
        })
    }
}

pub fn token_response(access: &str, refresh: &str) -> Result<Value, TransportError> {
    Ok(json!({"access_token": access, "refresh_token": refresh, "token_type": "bearer", "expires_in": 7200}))
}

pub fn http_failure(status: u16) -> Result<Value, TransportError> {
    Err(TransportError::Status {
        status: http::StatusCode::from_u16(status).unwrap(),
        body: "{\"error\":\"invalid_grant\"}".into(),
    })
}

pub fn record(access: Option<&str>, refresh: Option<&str>, issued_at: Option<f64>) -> TokenRecord {
    TokenRecord {
        access_token: access.map(str::to_owned),
        refresh_token: refresh.map(str::to_owned),
        issued_at,
        client_id: None,
        client_secret: None,
    }
}
