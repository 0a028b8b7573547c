//! # Cart Store
//!
//! The persisted shopping cart.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  UI Action                Operation               Cart Change           │
//! │  ─────────                ─────────               ───────────           │
//! │                                                                         │
//! │  Click "Añadir" ─────────► add(product, 1) ──────► qty += 1 / push      │
//! │                                                                         │
//! │  Click + / - ────────────► change_quantity() ───► qty += delta          │
//! │                                                  (≤ 0 → line removed)   │
//! │                                                                         │
//! │  Click Remove ───────────► remove(id) ──────────► lines.retain(..)      │
//! │                                                                         │
//! │  Order placed ───────────► clear() ─────────────► lines.clear()         │
//! │                                                                         │
//! │  Every mutation then writes the whole snapshot under "carrito".         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Lifecycle
//! ```text
//! absent ──add──► present(qty ≥ 1) ──add / +delta──► present
//!                       │
//!                       └──delta to ≤ 0 / remove──► absent
//! ```
//!
//! ## Failure Model
//! No cart operation returns an error. An unreadable snapshot loads as an
//! empty cart; a failed write is logged and the in-memory cart stays
//! authoritative until the next successful write.

use tracing::{debug, error, warn};

use crate::error::CoreError;
use crate::money::Money;
use crate::storage::Storage;
use crate::types::{CartLine, Product, ProductId};
use crate::CART_STORAGE_KEY;

/// The shopping cart, bound to the storage it persists into.
///
/// ## Invariants
/// - At most one line per product id
/// - Every line has quantity ≥ 1
/// - Lines keep the order they were first added in
///
/// Mutations take `&mut self`, so two mutations can never interleave.
#[derive(Debug)]
pub struct CartStore<S: Storage> {
    lines: Vec<CartLine>,
    storage: S,
}

impl<S: Storage> CartStore<S> {
    /// Loads the cart persisted in `storage`.
    ///
    /// ## Behavior
    /// - No snapshot: empty cart
    /// - Snapshot that does not decode: empty cart, warning logged
    /// - Lines with quantity ≤ 0 are dropped and repeated ids are merged into
    ///   the first occurrence, so a hand-edited snapshot cannot break the
    ///   invariants
    pub fn load(storage: S) -> Self {
        let lines = match storage.get(CART_STORAGE_KEY) {
            None => Vec::new(),
            Some(raw) => match decode_snapshot(&raw) {
                Ok(lines) => normalize(lines),
                Err(err) => {
                    warn!(error = %err, "Discarding unreadable cart snapshot");
                    Vec::new()
                }
            },
        };

        debug!(lines = lines.len(), "Cart loaded");
        CartStore { lines, storage }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity_delta` units of `product`.
    ///
    /// If the product is already in the cart its quantity grows; otherwise a
    /// line is created with the product's current name, price and unit.
    ///
    /// ## Returns
    /// The resulting line, or `None` when the resulting quantity is ≤ 0 (the
    /// line is then removed, or never created).
    pub fn add(&mut self, product: &Product, quantity_delta: i64) -> Option<CartLine> {
        let result = match self.position(product.id) {
            Some(index) => {
                let quantity = self.lines[index].quantity.saturating_add(quantity_delta);
                if quantity <= 0 {
                    self.lines.remove(index);
                    None
                } else {
                    self.lines[index].quantity = quantity;
                    Some(self.lines[index].clone())
                }
            }
            None if quantity_delta > 0 => {
                let line = CartLine::from_product(product, quantity_delta);
                self.lines.push(line.clone());
                Some(line)
            }
            None => None,
        };

        debug!(
            product_id = product.id,
            delta = quantity_delta,
            quantity = result.as_ref().map(|l| l.quantity).unwrap_or(0),
            "Cart add"
        );
        self.persist();
        result
    }

    /// Applies `delta` to the line for `product_id`.
    ///
    /// An absent line is a no-op: a stale button may race a removal. A
    /// resulting quantity ≤ 0 removes the line.
    pub fn change_quantity(&mut self, product_id: ProductId, delta: i64) {
        let Some(index) = self.position(product_id) else {
            debug!(product_id, "Quantity change for a product not in the cart");
            return;
        };

        let quantity = self.lines[index].quantity.saturating_add(delta);
        if quantity <= 0 {
            self.lines.remove(index);
        } else {
            self.lines[index].quantity = quantity;
        }

        debug!(product_id, delta, quantity = quantity.max(0), "Cart quantity changed");
        self.persist();
    }

    /// Removes the line for `product_id`, if any.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.id != product_id);
        debug!(product_id, "Cart line removed");
        self.persist();
    }

    /// Empties the cart.
    ///
    /// Persists an empty snapshot rather than deleting the key, so a reload
    /// reads "empty" the same way every time.
    pub fn clear(&mut self) {
        self.lines.clear();
        debug!("Cart cleared");
        self.persist();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Σ price × quantity, full precision.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Σ quantity. The badge number, not the line count. Saturates at
    /// `i64::MAX`.
    pub fn item_count(&self) -> i64 {
        self.lines
            .iter()
            .fold(0i64, |count, line| count.saturating_add(line.quantity))
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == product_id)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The serialized snapshot as it is written to storage.
    pub fn snapshot(&self) -> String {
        serde_json::to_string(&self.lines).unwrap_or_else(|_| "[]".to_string())
    }

    /// The storage this cart persists into.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines.iter().position(|line| line.id == product_id)
    }

    fn persist(&self) {
        if let Err(err) = self.storage.set(CART_STORAGE_KEY, &self.snapshot()) {
            error!(error = %err, "Failed to persist cart");
        }
    }
}

fn decode_snapshot(raw: &str) -> Result<Vec<CartLine>, CoreError> {
    serde_json::from_str(raw).map_err(|e| CoreError::SnapshotDecode(e.to_string()))
}

fn normalize(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());

    for line in lines.into_iter().filter(|line| line.quantity > 0) {
        match merged.iter_mut().find(|existing| existing.id == line.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            }
            None => merged.push(line),
        }
    }

    merged
}

// =============================================================================
// Unit Tests
// =============================================================================
