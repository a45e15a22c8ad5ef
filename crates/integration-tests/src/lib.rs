//! End-to-end harness for the village portal.
//!
//! [`TestServer`] binds the real router to an ephemeral port over a fresh
//! memory store, so tests exercise HTTP framing, CORS, multipart and the
//! typed client together without a database.
//!
//! ```rust,ignore
//! let server = TestServer::start().await;
//! let admin = server.admin_client().await;
//! admin.create_activity(&draft).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use village_portal_api::config::LogFormat;
use village_portal_api::db::{MemoryStore, Store};
use village_portal_api::services::auth::hash_password;
use village_portal_api::{AppState, PortalConfig, app};
use village_portal_client::{PortalClient, Session};
use village_portal_core::NewAdminAccount;

pub const ADMIN_USERNAME: &str = "ketua";
pub const ADMIN_PASSWORD: &str = "rahasia-rt05";

/// Upload limit used by the harness.
pub const UPLOAD_LIMIT: usize = 256 * 1024;

/// A portal server running on a background task.
///
/// The server stops when this value is dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub upload_dir: tempfile::TempDir,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with one admin account.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let upload_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        store
            .create_account(&NewAdminAccount {
                username: ADMIN_USERNAME.parse().unwrap(),
                password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
                display_name: "Ketua RT 05".to_owned(),
            })
            .await
            .unwrap();

        let config = PortalConfig {
            database_url: SecretString::from("postgres://unused"),
            jwt_secret: SecretString::from("Zt7#pQ2!vL9@xK4$mW8^cR1&nB6*yH3%"),
            host: addr.ip(),
            port: addr.port(),
            public_base_url: Some(base_url.clone()),
            upload_dir: upload_dir.path().to_path_buf(),
            cors_origin: None,
            json_body_limit: 64 * 1024,
            upload_max_bytes: UPLOAD_LIMIT,
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let router = app(AppState::new(config, store.clone()));
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            addr,
            base_url,
            store,
            upload_dir,
            handle,
        }
    }

    /// A client without a token.
    #[must_use]
    pub fn anonymous_client(&self) -> PortalClient {
        PortalClient::new(&self.base_url, Session::Anonymous).unwrap()
    }

    /// A client logged in as the seeded admin.
    pub async fn admin_client(&self) -> PortalClient {
        let client = self.anonymous_client();
        let response = client.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
        client.with_session(Session::from_login(&response))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
