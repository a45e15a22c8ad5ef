//! HTTP client for the portal API.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, multipart};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::instrument;
use url::Url;
use village_portal_core::{
    Activity, ActivityDraft, ActivityId, Envelope, FinanceTransaction, HomeHero, HomeHeroDraft,
    LoginRequest, LoginResponse, PublicUser, ReorderRequest, Resident, ResidentDraft, ResidentId,
    RosterDraft, RosterMember, RosterMemberId, RosterOrder, TransactionDraft, TransactionId,
    TransactionQuery,
    envelope::{Affected, Created},
    media::resolve_image_url,
    projection::{Event, Post},
    report::{FinanceReport, LastUpdate, ResidentStats},
};

use crate::{ClientError, Session, normalize::decode_list};

/// Characters of a failed response body kept in logs.
const LOG_BODY_CHARS: usize = 500;

/// Result of an image upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    /// Server-relative path, the value to store on a record.
    pub image_path: String,
    pub image_url: String,
}

/// Client for the portal REST API.
///
/// Cheap to clone. The session is fixed per client; use
/// [`PortalClient::with_session`] after a login.
#[derive(Clone)]
pub struct PortalClient {
    inner: Arc<PortalClientInner>,
}

struct PortalClientInner {
    http: reqwest::Client,
    /// Always ends with `/` so relative joins keep any path prefix.
    base: Url,
    session: Session,
}

impl std::fmt::Debug for PortalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalClient")
            .field("base", &self.inner.base.as_str())
            .field("authenticated", &self.inner.session.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl PortalClient {
    /// Create a client for the server at `base_url` (without `/api`).
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, session: Session) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            inner: Arc::new(PortalClientInner {
                http: reqwest::Client::new(),
                base,
                session,
            }),
        })
    }

    /// Same server and connection pool, different session.
    #[must_use]
    pub fn with_session(&self, session: Session) -> Self {
        Self {
            inner: Arc::new(PortalClientInner {
                http: self.inner.http.clone(),
                base: self.inner.base.clone(),
                session,
            }),
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Resolve a stored image reference against this server.
    #[must_use]
    pub fn resolve_image(&self, reference: &str) -> String {
        resolve_image_url(Some(self.inner.base.as_str()), reference)
    }

    // =========================================================================
    // Transport
    // =========================================================================

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.inner.base.join(&format!("api/{path}"))?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.http.request(method, url);
        match self.inner.session.bearer() {
            Some(bearer) => builder.header(reqwest::header::AUTHORIZATION, bearer),
            None => builder,
        }
    }

    /// Send a request and return the raw body of a successful envelope.
    async fn execute(&self, builder: RequestBuilder) -> Result<Value, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<Value>>(&text)
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_owned()
                });
            tracing::debug!(
                status = %status,
                body = %text.chars().take(LOG_BODY_CHARS).collect::<String>(),
                "Portal API returned non-success status"
            );
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(LOG_BODY_CHARS).collect::<String>(),
                "Failed to parse portal API response"
            );
            e
        })?;

        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let message = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_owned();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    /// Send and decode the envelope's `data`.
    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let mut body = self.execute(builder).await?;
        let data = body
            .get_mut("data")
            .map(Value::take)
            .unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.fetch(self.request(Method::GET, self.url(path)?)).await
    }

    /// GET a list, tolerating legacy response shapes.
    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, ClientError> {
        let body = self.execute(self.request(Method::GET, url)).await?;
        Ok(decode_list(body))
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.fetch(self.request(method, self.url(path)?).json(body))
            .await
    }

    async fn delete(&self, path: &str) -> Result<Affected, ClientError> {
        self.fetch(self.request(Method::DELETE, self.url(path)?))
            .await
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchange credentials for a token.
    ///
    /// The returned client is unchanged; build an authenticated one with
    /// `client.with_session(Session::from_login(&response))`.
    ///
    /// # Errors
    ///
    /// `Api { status: 401, .. }` for wrong credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let request = LoginRequest::new(username, password);
        self.send_json(Method::POST, "auth/login", &request).await
    }

    /// The account behind the current token.
    ///
    /// # Errors
    ///
    /// `Api { status: 401, .. }` without a valid token.
    pub async fn me(&self) -> Result<PublicUser, ClientError> {
        self.get("auth/me").await
    }

    // =========================================================================
    // Residents
    // =========================================================================

    /// All residents. Requires a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn residents(&self) -> Result<Vec<Resident>, ClientError> {
        self.get_list(self.url("residents")?).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn resident_stats(&self) -> Result<ResidentStats, ClientError> {
        self.get("residents/stats").await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn residents_last_update(&self) -> Result<LastUpdate, ClientError> {
        self.get("residents/last-update").await
    }

    /// # Errors
    ///
    /// `Api { status: 400, .. }` naming the first invalid field.
    pub async fn create_resident(&self, draft: &ResidentDraft) -> Result<ResidentId, ClientError> {
        let created: Created<ResidentId> = self.send_json(Method::POST, "residents", draft).await?;
        Ok(created.id)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_resident(
        &self,
        id: ResidentId,
        draft: &ResidentDraft,
    ) -> Result<Affected, ClientError> {
        self.send_json(Method::PUT, &format!("residents/{id}"), draft)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_resident(&self, id: ResidentId) -> Result<Affected, ClientError> {
        self.delete(&format!("residents/{id}")).await
    }

    // =========================================================================
    // Finance
    // =========================================================================

    /// Transactions matching the query, newest first.
    ///
    /// # Errors
    ///
    /// `Api { status: 400, .. }` for a malformed filter value.
    pub async fn transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<FinanceTransaction>, ClientError> {
        self.get_list(self.finance_url("keuangan", query)?).await
    }

    /// Every transaction, ignoring filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn all_transactions(&self) -> Result<Vec<FinanceTransaction>, ClientError> {
        self.get_list(self.url("keuangan/all")?).await
    }

    /// Server-side totals over the filtered set. `limit` is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn finance_summary(
        &self,
        query: &TransactionQuery,
    ) -> Result<FinanceReport, ClientError> {
        let url = self.finance_url("keuangan/summary", query)?;
        self.fetch(self.request(Method::GET, url)).await
    }

    fn finance_url(&self, path: &str, query: &TransactionQuery) -> Result<Url, ClientError> {
        let mut url = self.url(path)?;
        let params = [
            ("type", &query.kind),
            ("category", &query.category),
            ("month", &query.month),
            ("limit", &query.limit),
        ];
        if params.iter().any(|(_, value)| value.is_some()) {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                if let Some(value) = value {
                    pairs.append_pair(key, value);
                }
            }
        }
        Ok(url)
    }

    /// # Errors
    ///
    /// `Api { status: 400, .. }` naming the first invalid field.
    pub async fn create_transaction(
        &self,
        draft: &TransactionDraft,
    ) -> Result<TransactionId, ClientError> {
        let created: Created<TransactionId> =
            self.send_json(Method::POST, "keuangan", draft).await?;
        Ok(created.id)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_transaction(
        &self,
        id: TransactionId,
        draft: &TransactionDraft,
    ) -> Result<Affected, ClientError> {
        self.send_json(Method::PUT, &format!("keuangan/{id}"), draft)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<Affected, ClientError> {
        self.delete(&format!("keuangan/{id}")).await
    }

    // =========================================================================
    // Activities
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn activities(&self) -> Result<Vec<Activity>, ClientError> {
        self.get_list(self.url("kegiatan")?).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn activities_preview(&self) -> Result<Vec<Activity>, ClientError> {
        self.get_list(self.url("kegiatan-preview")?).await
    }

    /// Activities as news posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn posts(&self) -> Result<Vec<Post>, ClientError> {
        self.get_list(self.url("berita")?).await
    }

    /// Upcoming events, soonest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn agenda(&self) -> Result<Vec<Event>, ClientError> {
        self.get_list(self.url("agenda")?).await
    }

    /// # Errors
    ///
    /// `Api { status: 400, .. }` naming the first invalid field.
    pub async fn create_activity(&self, draft: &ActivityDraft) -> Result<ActivityId, ClientError> {
        let created: Created<ActivityId> = self.send_json(Method::POST, "kegiatan", draft).await?;
        Ok(created.id)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_activity(
        &self,
        id: ActivityId,
        draft: &ActivityDraft,
    ) -> Result<Affected, ClientError> {
        self.send_json(Method::PUT, &format!("kegiatan/{id}"), draft)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_activity(&self, id: ActivityId) -> Result<Affected, ClientError> {
        self.delete(&format!("kegiatan/{id}")).await
    }

    // =========================================================================
    // Roster
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn roster(&self) -> Result<Vec<RosterMember>, ClientError> {
        self.get_list(self.url("kepengurusan")?).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn roster_preview(&self) -> Result<Vec<RosterMember>, ClientError> {
        self.get_list(self.url("kepengurusan-preview")?).await
    }

    /// # Errors
    ///
    /// `Api { status: 400, .. }` naming the first invalid field.
    pub async fn create_roster_member(
        &self,
        draft: &RosterDraft,
    ) -> Result<RosterMemberId, ClientError> {
        let created: Created<RosterMemberId> =
            self.send_json(Method::POST, "kepengurusan", draft).await?;
        Ok(created.id)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_roster_member(
        &self,
        id: RosterMemberId,
        draft: &RosterDraft,
    ) -> Result<Affected, ClientError> {
        self.send_json(Method::PUT, &format!("kepengurusan/{id}"), draft)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_roster_member(&self, id: RosterMemberId) -> Result<Affected, ClientError> {
        self.delete(&format!("kepengurusan/{id}")).await
    }

    /// Apply several display orders in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; no order changes in that case.
    pub async fn reorder_roster(&self, orders: Vec<RosterOrder>) -> Result<Affected, ClientError> {
        let request = ReorderRequest { orders };
        self.send_json(Method::PUT, "kepengurusan/order", &request)
            .await
    }

    // =========================================================================
    // Settings & uploads
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn home_hero(&self) -> Result<HomeHero, ClientError> {
        self.get("settings/home-hero").await
    }

    /// Set the home banner; `None` or a blank path clears it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn set_home_hero(&self, image_path: Option<&str>) -> Result<HomeHero, ClientError> {
        let draft = HomeHeroDraft {
            image_path: image_path.map(str::to_owned),
        };
        self.send_json(Method::PUT, "settings/home-hero", &draft)
            .await
    }

    /// Upload one image to `pengurus`, `kegiatan` or `hero`.
    ///
    /// # Errors
    ///
    /// `Api { status: 400, .. }` if the file is not an image, `413` above the
    /// server's limit.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        destination: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ClientError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("image", part);
        let url = self.url(&format!("upload/{destination}"))?;
        self.fetch(self.request(Method::POST, url).multipart(form))
            .await
    }
}
