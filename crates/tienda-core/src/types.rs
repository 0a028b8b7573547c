//! # Domain Types
//!
//! Wire and snapshot types used throughout the storefront.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartLine     │   │  OrderRequest   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (integer)   │──►│  id (product)   │──►│  items          │       │
//! │  │  nombre         │   │  nombre/precio  │   │  total          │       │
//! │  │  precio, stock  │   │  cantidad ≥ 1   │   │  cliente_*      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  OrderReceipt   │   │   AdminOrder    │   │   OrderStatus   │       │
//! │  │  id             │   │  items, total   │   │  pendiente      │       │
//! │  │  email_enviado? │   │  estado, fecha  │   │  en_preparacion │       │
//! │  └─────────────────┘   └─────────────────┘   │  enviado ...    │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! The storefront API speaks Spanish field names (`nombre`, `precio`,
//! `cantidad`). Rust fields use English names and `#[serde(rename)]` keeps the
//! JSON identical to what the API and the browser snapshot expect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

/// Product identifier as assigned by the storefront API.
pub type ProductId = i64;

/// Order identifier as assigned by the storefront API.
pub type OrderId = i64;

// =============================================================================
// Product
// =============================================================================

/// A product listed by the storefront API (`GET /productos`).
///
/// Read-only from this crate's perspective; the cart copies what it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,

    /// Display name.
    #[serde(rename = "nombre")]
    pub name: String,

    /// Price per unit.
    #[serde(rename = "precio")]
    #[ts(type = "number")]
    pub price: Money,

    /// Unit label the price refers to ("kg", "unidad", "docena").
    #[serde(rename = "unidad")]
    pub unit: String,

    /// Category used by the catalog filter.
    #[serde(rename = "categoria")]
    pub category: String,

    /// Units in stock.
    #[serde(default)]
    pub stock: u32,

    /// Image URL, if the product has one.
    #[serde(rename = "imagen", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Longer description for the product card.
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Product {
    /// Creates a product with no stock, image or description.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Money,
        unit: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Product {
            id,
            name: name.into(),
            price,
            unit: unit.into(),
            category: category.into(),
            stock: 0,
            image: None,
            description: None,
        }
    }

    /// Sets the stock count.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product's entry in the cart.
///
/// ## Frozen Fields
/// `name`, `price` and `unit` are captured when the line is created. A later
/// catalog refresh does not change what the customer saw when adding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Product this line refers to.
    pub id: ProductId,

    /// Product name at time of adding.
    #[serde(rename = "nombre")]
    pub name: String,

    /// Unit price at time of adding.
    #[serde(rename = "precio")]
    #[ts(type = "number")]
    pub price: Money,

    /// Unit label at time of adding.
    #[serde(rename = "unidad")]
    pub unit: String,

    /// Quantity; always ≥ 1 while the line is in a cart.
    #[serde(rename = "cantidad")]
    pub quantity: i64,
}

impl CartLine {
    /// Creates a line from a product with the given quantity.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            unit: product.unit.clone(),
            quantity,
        }
    }

    /// Unit price × quantity, full precision.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Checkout Contact
// =============================================================================

/// Contact details entered in the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl CustomerContact {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        CustomerContact {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    /// Returns a copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        CustomerContact {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One line of a submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    #[serde(rename = "producto_id")]
    pub product_id: ProductId,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "precio")]
    #[ts(type = "number")]
    pub price: Money,

    #[serde(rename = "cantidad")]
    pub quantity: i64,

    #[serde(rename = "unidad")]
    pub unit: String,
}

impl OrderItem {
    /// Unit price × quantity, full precision.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        OrderItem {
            product_id: line.id,
            name: line.name.clone(),
            price: line.price,
            quantity: line.quantity,
            unit: line.unit.clone(),
        }
    }
}

/// Body of `POST /api/pedidos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderRequest {
    pub items: Vec<OrderItem>,

    /// Σ price × quantity at full precision.
    #[ts(type = "number")]
    pub total: Money,

    #[serde(rename = "cliente_nombre")]
    pub customer_name: String,

    #[serde(rename = "cliente_email")]
    pub customer_email: String,

    #[serde(rename = "cliente_telefono")]
    pub customer_phone: String,

    #[serde(rename = "direccion_entrega")]
    pub delivery_address: String,
}

impl OrderRequest {
    /// Builds the request from cart lines and already-validated contact
    /// details. Contact fields are trimmed.
    pub fn from_lines(lines: &[CartLine], contact: &CustomerContact) -> Self {
        let contact = contact.trimmed();
        let items: Vec<OrderItem> = lines.iter().map(OrderItem::from).collect();
        let total = items.iter().map(OrderItem::line_total).sum();

        OrderRequest {
            items,
            total,
            customer_name: contact.name,
            customer_email: contact.email,
            customer_phone: contact.phone,
            delivery_address: contact.address,
        }
    }
}

/// Response of a successful order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderReceipt {
    /// Order number assigned by the API.
    pub id: OrderId,

    /// Whether the confirmation email went out. Absent on older APIs.
    #[serde(rename = "email_enviado", default, skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment status of an order, as managed from the admin page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Received, not yet handled.
    Pendiente,
    /// Being picked and packed.
    EnPreparacion,
    /// Handed to delivery.
    Enviado,
    /// Delivered to the customer.
    Entregado,
    /// Cancelled.
    Cancelado,
}

impl OrderStatus {
    /// Every status in menu order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pendiente,
        OrderStatus::EnPreparacion,
        OrderStatus::Enviado,
        OrderStatus::Entregado,
        OrderStatus::Cancelado,
    ];

    /// Wire value (`en_preparacion`).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pendiente => "pendiente",
            OrderStatus::EnPreparacion => "en_preparacion",
            OrderStatus::Enviado => "enviado",
            OrderStatus::Entregado => "entregado",
            OrderStatus::Cancelado => "cancelado",
        }
    }

    /// Human label (`En Preparación`).
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pendiente => "Pendiente",
            OrderStatus::EnPreparacion => "En Preparación",
            OrderStatus::Enviado => "Enviado",
            OrderStatus::Entregado => "Entregado",
            OrderStatus::Cancelado => "Cancelado",
        }
    }

    /// Maps the admin menu choice `"1"`..`"5"` to a status.
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        let index: usize = choice.trim().parse().ok()?;
        index
            .checked_sub(1)
            .and_then(|i| OrderStatus::ALL.get(i).copied())
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pendiente
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    /// Accepts the wire value or a menu number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        OrderStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == value)
            .or_else(|| OrderStatus::from_menu_choice(&value))
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// An order as listed on the admin page (`GET /api/admin/pedidos`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdminOrder {
    pub id: OrderId,

    #[serde(rename = "cliente_nombre")]
    pub customer_name: String,

    #[serde(rename = "cliente_email")]
    pub customer_email: String,

    #[serde(rename = "cliente_telefono", default)]
    pub customer_phone: String,

    #[serde(rename = "direccion_entrega", default)]
    pub delivery_address: String,

    /// Creation date as formatted by the API.
    #[serde(rename = "fecha", default)]
    pub date: String,

    #[ts(type = "number")]
    pub total: Money,

    #[serde(rename = "estado")]
    pub status: OrderStatus,

    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Dashboard numbers (`GET /api/admin/estadisticas`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdminStats {
    #[serde(rename = "total_pedidos")]
    pub total_orders: u64,

    #[serde(rename = "total_ingresos")]
    #[ts(type = "number")]
    pub total_revenue: Money,

    /// Order count per status wire value.
    #[serde(rename = "pedidos_por_estado", default)]
    pub orders_by_status: BTreeMap<String, u64>,

    #[serde(rename = "pedido_promedio")]
    #[ts(type = "number")]
    pub average_order: Money,
}

impl AdminStats {
    /// Orders in the given status, 0 when the API omitted it.
    pub fn count_for(&self, status: OrderStatus) -> u64 {
        self.orders_by_status
            .get(status.as_str())
            .copied()
            .unwrap_or(0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
