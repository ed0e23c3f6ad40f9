#[cfg(test)]
mod tests {
    use secrecy::{ExposeSecret, SecretString};

    use crate::cache::token_store::{MemoryTokenStore, TokenStore};
    use crate::error::AuthError;
    use crate::helpers::time::FixedClock;
    use crate::sources::oauth2::{Credentials, TokenManager, TOKEN_PATH};
    use crate::tests::common::{http_failure, json, record, token_response, ScriptedTransport};

    const NOW: f64 = 1_760_000_000.0;

    fn credentials() -> Credentials {
        Credentials::new(Some("client-id".into()), Some(SecretString::new("client-secret".into())))
    }

    fn manager<'a>(
        store: &'a MemoryTokenStore,
        transport: &'a ScriptedTransport,
        credentials: Credentials,
    ) -> TokenManager<&'a MemoryTokenStore, &'a ScriptedTransport, FixedClock> {
        TokenManager::with_clock(store, transport, credentials, FixedClock(NOW))
    }

    #[tokio::test]
    async fn fresh_token_is_served_from_cache() {
        let store = MemoryTokenStore::new(Some(record(Some("cached"), Some("r"), Some(NOW - 7199.0))));
        let transport = ScriptedTransport::new(vec![]);

        let token = manager(&store, &transport, credentials()).usable_token().await.unwrap();

        assert_eq!(token, "cached");
        assert!(transport.calls().is_empty());
        assert_eq!(store.saves(), 0);
    }

    #[tokio::test]
    async fn token_at_two_hours_is_refreshed() {
        let store = MemoryTokenStore::new(Some(record(Some("old"), Some("refresh-1"), Some(NOW - 7200.0))));
        let transport = ScriptedTransport::new(vec![token_response("new", "refresh-2")]);

        let token = manager(&store, &transport, credentials()).usable_token().await.unwrap();

        assert_eq!(token, "new");
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, TOKEN_PATH);
        assert_eq!(calls[0].field("grant_type"), Some("refresh_token"));
        assert_eq!(calls[0].field("refresh_token"), Some("refresh-1"));
        assert_eq!(calls[0].field("client_id"), Some("client-id"));
        assert_eq!(calls[0].field("client_secret"), Some("client-secret"));

        let stored = store.snapshot().unwrap();
        assert_eq!(stored.access_token(), Some("new"));
        assert_eq!(stored.refresh_token(), Some("refresh-2"));
        assert_eq!(stored.issued_at, Some(NOW));
        assert_eq!(stored.client_id.as_deref(), Some("client-id"));
        assert_eq!(stored.client_secret.unwrap().expose_secret(), "client-secret");
    }

    #[tokio::test]
    async fn refresh_without_credentials_omits_them() {
        let store = MemoryTokenStore::new(Some(record(None, Some("refresh-1"), None)));
        let transport = ScriptedTransport::new(vec![token_response("new", "refresh-2")]);

        let token = manager(&store, &transport, Credentials::default()).usable_token().await.unwrap();

        assert_eq!(token, "new");
        let calls = transport.calls();
        assert_eq!(calls[0].field("grant_type"), Some("refresh_token"));
        assert!(calls[0].field("client_id").is_none());
        assert!(calls[0].field("client_secret").is_none());
    }

    #[tokio::test]
    async fn refresh_response_without_refresh_token_keeps_previous_one() {
        let store = MemoryTokenStore::new(Some(record(Some("old"), Some("refresh-1"), Some(NOW - 9000.0))));
        let transport = ScriptedTransport::new(vec![Ok(json!({"access_token": "new"}))]);

        manager(&store, &transport, credentials()).usable_token().await.unwrap();

        assert_eq!(store.snapshot().unwrap().refresh_token(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn failed_refresh_falls_back_to_one_reissue() {
        let store = MemoryTokenStore::new(Some(record(Some("old"), Some("refresh-1"), Some(NOW - 8000.0))));
        let transport = ScriptedTransport::new(vec![http_failure(400), token_response("issued", "refresh-9")]);

        let token = manager(&store, &transport, credentials()).usable_token().await.unwrap();

        assert_eq!(token, "issued");
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].field("grant_type"), Some("client_credentials"));
        assert_eq!(calls[1].field("client_id"), Some("client-id"));
        assert!(calls[1].field("refresh_token").is_none());
        assert_eq!(store.snapshot().unwrap().refresh_token(), Some("refresh-9"));
    }

    #[tokio::test]
    async fn malformed_refresh_response_counts_as_failure() {
        let store = MemoryTokenStore::new(Some(record(None, Some("refresh-1"), None)));
        let transport = ScriptedTransport::new(vec![Ok(json!({"error": "nope"})), token_response("issued", "r")]);

        let token = manager(&store, &transport, credentials()).usable_token().await.unwrap();

        assert_eq!(token, "issued");
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn failed_refresh_and_reissue_leave_record_untouched() {
        let before = record(Some("old"), Some("refresh-1"), Some(NOW - 8000.0));
        let store = MemoryTokenStore::new(Some(before.clone()));
        let transport = ScriptedTransport::new(vec![http_failure(401), http_failure(503), token_response("x", "y")]);

        let err = manager(&store, &transport, credentials()).usable_token().await.unwrap_err();

        assert!(matches!(err, AuthError::ExchangeFailed(_)));
        assert!(err.to_string().contains("503"));
        assert_eq!(transport.calls().len(), 2);
        let after = store.snapshot().unwrap();
        assert_eq!(after.access_token, before.access_token);
        assert_eq!(after.refresh_token, before.refresh_token);
        assert_eq!(after.issued_at, before.issued_at);
        assert_eq!(store.saves(), 0);
    }

    #[tokio::test]
    async fn failed_refresh_without_credentials_is_auth_error() {
        let store = MemoryTokenStore::new(Some(record(Some("old"), Some("refresh-1"), Some(NOW - 8000.0))));
        let transport = ScriptedTransport::new(vec![http_failure(400)]);

        let err = manager(&store, &transport, Credentials::new(Some("id".into()), None))
            .usable_token()
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::NoCredentials));
        assert_eq!(err.to_string(), "no credentials available");
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn empty_store_reissues_directly() {
        let store = MemoryTokenStore::new(None);
        let transport = ScriptedTransport::new(vec![token_response("issued", "refresh-1")]);

        let token = manager(&store, &transport, credentials()).usable_token().await.unwrap();

        assert_eq!(token, "issued");
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].field("grant_type"), Some("client_credentials"));
        assert_eq!(store.saves(), 1);
        assert_eq!(store.load().unwrap().unwrap().issued_at, Some(NOW));
    }

    #[tokio::test]
    async fn empty_store_without_credentials_makes_no_call() {
        let store = MemoryTokenStore::new(None);
        let transport = ScriptedTransport::new(vec![]);

        let err = manager(&store, &transport, Credentials::default()).usable_token().await.unwrap_err();

        assert!(matches!(err, AuthError::NoCredentials));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn persist_failure_still_returns_token() {
        let store = MemoryTokenStore::failing(None);
        let transport = ScriptedTransport::new(vec![token_response("issued", "refresh-1")]);

        let token = manager(&store, &transport, credentials()).usable_token().await.unwrap();

        assert_eq!(token, "issued");
        assert!(store.snapshot().is_none());
    }
}
