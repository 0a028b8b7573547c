//! # tienda-core: Pure Storefront Logic
//!
//! This crate is the **heart** of the Tienda storefront. It holds the cart,
//! catalog and order-book logic as plain data structures with zero network
//! or file I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Tienda Storefront Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Presentation layer (CLI / web page)               │   │
//! │  │    Catalog ──► Cart ──► Checkout form ──► Confirmation          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  tienda-client (network + disk)                 │   │
//! │  │    ResilientFetcher, StorefrontApi, AdminClient, FileStorage    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tienda-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ CartStore │  │  contact  │  │   │
//! │  │   │   Order   │  │ (decimal) │  │ CartLine  │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │  catalog  │  │  orders   │  │  storage  │                 │   │
//! │  │   │ filter    │  │ OrderBook │  │  trait +  │                 │   │
//! │  │   │ sort      │  │ (admin)   │  │  memory   │                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO HTTP • NO FILES • NO GLOBALS • STORAGE IS INJECTED         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire types (Product, CartLine, OrderRequest, AdminOrder, ...)
//! - [`money`] - Decimal money, full precision, rounded only for display
//! - [`error`] - Domain error types
//! - [`validation`] - Checkout contact-form rules
//! - [`storage`] - String-keyed storage capability + in-memory implementation
//! - [`cart`] - `CartStore`, the persisted shopping cart
//! - [`catalog`] - `ProductCatalog` filter/search/sort
//! - [`orders`] - `OrderBook` for the admin order listing
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use tienda_core::{CartStore, MemoryStorage, Money, Product};
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let mut cart = CartStore::load(storage.clone());
//!
//! let tomatoes = Product::new(1, "Tomate", Money::from_cents(250), "kg", "verdura");
//! cart.add(&tomatoes, 2);
//!
//! assert_eq!(cart.item_count(), 2);
//! assert_eq!(cart.total().to_string(), "5.00€");
//!
//! // A fresh store over the same storage sees the persisted snapshot
//! let reloaded = CartStore::load(storage);
//! assert_eq!(reloaded.item_count(), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod orders;
pub mod storage;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::CartStore;
pub use catalog::{CatalogQuery, ProductCatalog, SortOrder};
pub use error::{CoreError, CoreResult, StorageError, ValidationError};
pub use money::Money;
pub use orders::{OrderBook, OrderFilter};
pub use storage::{MemoryStorage, Storage};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key holding the serialized cart snapshot.
///
/// The web front-end used the same key in `localStorage`, so a snapshot
/// written by either side reads back in the other.
pub const CART_STORAGE_KEY: &str = "carrito";

/// Storage key holding the admin Basic-auth token for the current session.
pub const ADMIN_SESSION_KEY: &str = "admin_auth";

/// Catalog category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "todos";
