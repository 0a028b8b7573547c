//! # Admin Client
//!
//! The order-management side of the storefront: login, dashboard numbers,
//! order listing and status changes.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Admin Session                                    │
//! │                                                                         │
//! │  login(user, pass)                                                     │
//! │    │  POST /api/admin/login   Authorization: Basic base64(user:pass)   │
//! │    ├── 401/403 ──► Err(InvalidCredentials)                             │
//! │    └── 2xx ──► token kept + stored under "admin_auth"                  │
//! │                                                                         │
//! │  restore_session() ── reads "admin_auth" (next process start)          │
//! │                                                                         │
//! │  stats()          GET /api/admin/estadisticas                          │
//! │  orders()         GET /api/admin/pedidos                               │
//! │  update_status()  PUT /api/admin/pedidos/{id}/estado {nuevo_estado}    │
//! │    └── no token ──► Err(NotAuthenticated), nothing sent                │
//! │                                                                         │
//! │  logout() ── forgets the token and removes "admin_auth"                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The credentials are only attached as a header; the API decides whether
//! they are valid.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use tracing::{debug, info};

use tienda_core::{AdminOrder, AdminStats, OrderBook, OrderId, OrderStatus, Storage, ADMIN_SESSION_KEY};

use crate::api::{endpoint, normalize_base_url};
use crate::error::{ClientError, ClientResult, FetchError};
use crate::fetcher::ResilientFetcher;
use crate::transport::{HttpRequest, HttpTransport};

/// Admin username and password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `base64(username:password)`, the Basic-auth token.
    pub fn basic_token(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.password))
    }
}

// Never print the password
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Serialize)]
struct StatusChange {
    nuevo_estado: OrderStatus,
}

/// Authenticated access to the admin endpoints.
pub struct AdminClient<S: Storage, T: HttpTransport> {
    base_url: String,
    fetcher: ResilientFetcher<T>,
    storage: S,
    token: Option<String>,
}

impl<S: Storage, T: HttpTransport> AdminClient<S, T> {
    /// Creates a logged-out client. Call `restore_session` to pick up a
    /// stored login.
    pub fn new(base_url: &str, fetcher: ResilientFetcher<T>, storage: S) -> ClientResult<Self> {
        Ok(AdminClient {
            base_url: normalize_base_url(base_url)?,
            fetcher,
            storage,
            token: None,
        })
    }

    pub fn fetcher(&self) -> &ResilientFetcher<T> {
        &self.fetcher
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Loads the token stored by a previous `login`. Returns whether one
    /// was found.
    pub fn restore_session(&mut self) -> bool {
        self.token = self
            .storage
            .get(ADMIN_SESSION_KEY)
            .filter(|token| !token.is_empty());
        debug!(restored = self.token.is_some(), "Admin session restore");
        self.token.is_some()
    }

    /// Checks the credentials with the API and keeps them for later calls.
    ///
    /// ## Errors
    /// - `InvalidCredentials` on 401/403
    /// - `Fetch` for anything else that went wrong
    pub async fn login(&mut self, credentials: &Credentials) -> ClientResult<()> {
        let token = credentials.basic_token();
        let request = HttpRequest::post(endpoint(&self.base_url, "api/admin/login"))
            .header("Authorization", format!("Basic {}", token));

        match self.fetcher.send(&request).await {
            Ok(_) => {}
            Err(FetchError::Http {
                status: 401 | 403, ..
            }) => return Err(ClientError::InvalidCredentials),
            Err(err) => return Err(err.into()),
        }

        self.storage.set(ADMIN_SESSION_KEY, &token)?;
        self.token = Some(token);
        info!(username = %credentials.username, "Admin logged in");
        Ok(())
    }

    /// Forgets the session, in memory and in storage.
    pub fn logout(&mut self) -> ClientResult<()> {
        self.token = None;
        self.storage.remove(ADMIN_SESSION_KEY)?;
        info!("Admin logged out");
        Ok(())
    }

    /// `GET /api/admin/estadisticas`.
    pub async fn stats(&self) -> ClientResult<AdminStats> {
        let request = self.authorized(HttpRequest::get(endpoint(
            &self.base_url,
            "api/admin/estadisticas",
        )))?;
        Ok(self.fetcher.request(&request).await?)
    }

    /// `GET /api/admin/pedidos`, newest first.
    pub async fn orders(&self) -> ClientResult<OrderBook> {
        let request =
            self.authorized(HttpRequest::get(endpoint(&self.base_url, "api/admin/pedidos")))?;
        let orders: Vec<AdminOrder> = self.fetcher.request(&request).await?;
        debug!(count = orders.len(), "Admin orders fetched");
        Ok(OrderBook::new(orders))
    }

    /// `PUT /api/admin/pedidos/{id}/estado`.
    pub async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> ClientResult<()> {
        let path = format!("api/admin/pedidos/{}/estado", order_id);
        let request = self
            .authorized(HttpRequest::put(endpoint(&self.base_url, &path)))?
            .json(&StatusChange {
                nuevo_estado: status,
            })?;

        self.fetcher.send(&request).await?;
        info!(order_id, status = status.as_str(), "Order status updated");
        Ok(())
    }

    fn authorized(&self, request: HttpRequest) -> ClientResult<HttpRequest> {
        let token = self.token.as_ref().ok_or(ClientError::NotAuthenticated)?;
        Ok(request.header("Authorization", format!("Basic {}", token)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::RetryPolicy;
    use crate::testing::{ScriptedTransport, Step};
    use crate::transport::HttpMethod;
    use std::sync::Arc;
    use std::time::Duration;
    use tienda_core::{MemoryStorage, Money};

    type TestClient = AdminClient<Arc<MemoryStorage>, Arc<ScriptedTransport>>;

    fn client(steps: Vec<Step>) -> (Arc<MemoryStorage>, TestClient) {
        let storage = Arc::new(MemoryStorage::new());
        let policy = RetryPolicy::new(0, Duration::from_millis(10), Duration::from_millis(1000))
            .unwrap();
        let fetcher = ResilientFetcher::new(Arc::new(ScriptedTransport::new(steps)), policy);
        let client = AdminClient::new("http://shop.test", fetcher, storage.clone()).unwrap();
        (storage, client)
    }

    #[test]
    fn test_basic_token() {
        let credentials = Credentials::new("admin", "secreto");
        assert_eq!(credentials.basic_token(), "YWRtaW46c2VjcmV0bw==");
        assert!(!format!("{:?}", credentials).contains("secreto"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_persists_session() {
        let (storage, mut client) = client(vec![Step::respond(200, r#"{"ok": true}"#)]);

        client.login(&Credentials::new("admin", "secreto")).await.unwrap();

        assert!(client.is_logged_in());
        assert_eq!(
            storage.get(ADMIN_SESSION_KEY).as_deref(),
            Some("YWRtaW46c2VjcmV0bw==")
        );
        let sent = client.fetcher().transport().requests();
        assert_eq!(sent[0].url, "http://shop.test/api/admin/login");
        assert_eq!(
            sent[0].header_value("Authorization"),
            Some("Basic YWRtaW46c2VjcmV0bw==")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_login() {
        let (storage, mut client) = client(vec![Step::respond(401, "")]);

        let err = client
            .login(&Credentials::new("admin", "mal"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidCredentials));
        assert!(!client.is_logged_in());
        assert!(storage.get(ADMIN_SESSION_KEY).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_require_session() {
        let (_, client) = client(vec![Step::respond(200, "{}")]);

        assert!(matches!(client.stats().await, Err(ClientError::NotAuthenticated)));
        assert!(matches!(
            client.update_status(1, OrderStatus::Enviado).await,
            Err(ClientError::NotAuthenticated)
        ));
        assert_eq!(client.fetcher().transport().attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restored_session_fetches_orders() {
        let (storage, mut client) = client(vec![Step::respond(
            200,
            r#"[
                {"id": 4, "cliente_nombre": "Ana", "cliente_email": "ana@example.com",
                 "total": 12.5, "estado": "pendiente", "fecha": "2024-05-01"},
                {"id": 9, "cliente_nombre": "Luis", "cliente_email": "luis@example.com",
                 "total": 3, "estado": "en_preparacion", "items": []}
            ]"#,
        )]);
        storage.set(ADMIN_SESSION_KEY, "dG9rZW4=").unwrap();

        assert!(client.restore_session());
        let book = client.orders().await.unwrap();

        assert_eq!(book.orders()[0].id, 9);
        assert_eq!(book.find(4).unwrap().total, Money::from_cents(1250));
        let sent = client.fetcher().transport().requests();
        assert_eq!(sent[0].header_value("Authorization"), Some("Basic dG9rZW4="));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_status_body() {
        let (storage, mut client) = client(vec![Step::respond(200, "")]);
        storage.set(ADMIN_SESSION_KEY, "dG9rZW4=").unwrap();
        client.restore_session();

        client
            .update_status(17, OrderStatus::EnPreparacion)
            .await
            .unwrap();

        let sent = client.fetcher().transport().requests();
        assert_eq!(sent[0].method, HttpMethod::Put);
        assert_eq!(sent[0].url, "http://shop.test/api/admin/pedidos/17/estado");
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"nuevo_estado":"en_preparacion"}"#));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_and_logout() {
        let (storage, mut client) = client(vec![Step::respond(
            200,
            r#"{"total_pedidos": 2, "total_ingresos": 15.5,
                "pedidos_por_estado": {"pendiente": 1}, "pedido_promedio": 7.75}"#,
        )]);
        storage.set(ADMIN_SESSION_KEY, "dG9rZW4=").unwrap();
        client.restore_session();

        let stats = client.stats().await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.count_for(OrderStatus::Pendiente), 1);

        client.logout().unwrap();
        assert!(!client.is_logged_in());
        assert!(storage.get(ADMIN_SESSION_KEY).is_none());
    }
}
