//! # tienda-client: Network and Disk Layer
//!
//! Everything the storefront does over HTTP or on disk: the resilient
//! fetcher, the shop and admin endpoints, checkout and file-backed storage.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Client                                 │
//! │                                                                         │
//! │  ┌──────────────────────┐      ┌──────────────────────┐                │
//! │  │   checkout::         │      │    AdminClient       │                │
//! │  │   place_order        │      │  login / stats /     │                │
//! │  │   (cart → order)     │      │  orders / status     │                │
//! │  └──────────┬───────────┘      └──────────┬───────────┘                │
//! │             │                             │                             │
//! │  ┌──────────▼───────────┐                 │                             │
//! │  │    StorefrontApi     │                 │                             │
//! │  │  /productos          │                 │                             │
//! │  │  /api/pedidos        │                 │                             │
//! │  └──────────┬───────────┘                 │                             │
//! │             │                             │                             │
//! │  ┌──────────▼─────────────────────────────▼───────────┐                │
//! │  │                 ResilientFetcher                   │                │
//! │  │  timeout per attempt • bounded retries • cancel    │                │
//! │  └──────────────────────────┬─────────────────────────┘                │
//! │                             │                                           │
//! │  ┌──────────────────────────▼─────────────────────────┐                │
//! │  │         HttpTransport (ReqwestTransport)           │                │
//! │  └────────────────────────────────────────────────────┘                │
//! │                                                                         │
//! │  FileStorage ── implements tienda_core::Storage for the cart/session  │
//! │  ClientConfig ── defaults → storefront.toml → TIENDA_* env            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`fetcher`] - `ResilientFetcher`, `RetryPolicy`, cancellation
//! - [`transport`] - `HttpTransport` trait and the reqwest implementation
//! - [`api`] - Shop endpoints (products, orders)
//! - [`checkout`] - Cart → validated order → submission
//! - [`admin`] - Admin session and order management
//! - [`storage`] - JSON-file `Storage`
//! - [`config`] - `ClientConfig` (TOML + environment)
//! - [`error`] - `FetchError`, `ClientError`

pub mod admin;
pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod storage;
pub mod transport;

#[cfg(test)]
mod testing;

pub use admin::{AdminClient, Credentials};
pub use api::StorefrontApi;
pub use checkout::place_order;
pub use config::{BackoffKind, ClientConfig};
pub use error::{ClientError, ClientResult, ErrorCode, FetchError, FetchErrorKind};
pub use fetcher::{cancel_pair, BackoffStrategy, CancelHandle, CancelSignal, ResilientFetcher, RetryPolicy};
pub use storage::FileStorage;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
