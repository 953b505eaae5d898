//! # Domain Types
//!
//! Core domain types used throughout SmartSales.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Client      │   │    CartItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  price_cents    │   │  email (unique) │   │  client+product │       │
//! │  │  stock (≥ 0)    │   │  phone, address │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │◄─►│    Payment      │──►│      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  items snapshot │   │  session_id     │   │  qty × price    │       │
//! │  │  total_cents    │   │  metadata       │   │  = total_cents  │       │
//! │  │  OrderStatus    │   │  PaymentStatus  │   │  SaleStatus     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  AuditEntry: append-only log written by every mutating workflow        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity uses a UUID v4 string as its primary key. Money is always
//! stored as integer cents (`*_cents` fields).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// Product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description, frozen into order snapshots.
    pub description: Option<String>,

    /// Category this product belongs to.
    pub category_id: Option<String>,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if the product can be sold in the given quantity.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && quantity <= self.stock
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer. Carts, orders, payments and sales all belong to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cart
// =============================================================================

/// One cart row. Unique per (client, product).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: String,
    pub client_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart row joined with the current product data.
///
/// Used for display and for checkout re-validation, so `stock` and
/// `unit_price_cents` are always read fresh from the products table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    pub item_id: String,
    pub product_id: String,
    pub product_name: String,
    pub description: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub stock: i64,
}

impl CartLine {
    /// Line subtotal (unit price × quantity).
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }

    /// Freezes this line into an order snapshot item.
    pub fn to_order_item(&self) -> OrderItem {
        OrderItem {
            product_id: self.product_id.clone(),
            product_name: self.product_name.clone(),
            description: self.description.clone(),
            unit_price_cents: self.unit_price_cents,
            quantity: self.quantity,
            subtotal_cents: self.subtotal().cents(),
        }
    }
}

/// Totals shown next to a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    /// Number of distinct products.
    pub total_items: i64,
    /// Sum of quantities.
    pub total_quantity: i64,
    pub total_price_cents: i64,
}

impl CartSummary {
    pub fn from_lines(lines: &[CartLine]) -> Self {
        CartSummary {
            total_items: lines.len() as i64,
            total_quantity: lines.iter().map(|l| l.quantity).sum(),
            total_price_cents: lines.iter().map(CartLine::subtotal).sum::<Money>().cents(),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// The lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting payment.
    Pending,
    /// Payment confirmed, being prepared.
    Processing,
    /// Paid and fulfilled.
    Completed,
    /// Payment failed or the session expired.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// Frozen copy of one cart line at checkout time.
///
/// Later price or name changes on the product never alter this snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub description: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub subtotal_cents: i64,
}

/// A purchase order created at checkout (or for a direct payment).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub client_id: String,

    /// Item snapshot, stored as a JSON column.
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub items: Vec<OrderItem>,

    pub total_cents: i64,
    pub status: OrderStatus,

    /// Payment paying for this order (at most one).
    pub payment_id: Option<String>,

    pub shipping_address: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// The lifecycle state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

/// Payment provider used for a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Stripe,
    Paypal,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Stripe
    }
}

/// Free-form payment metadata (`order_id`, `kind`, ...).
pub type PaymentMetadata = serde_json::Map<String, serde_json::Value>;

/// A payment attempt against the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub client_id: String,

    /// Order being paid (mutual back-reference with `Order::payment_id`).
    pub order_id: Option<String>,

    /// Sale this payment ultimately produced.
    pub sale_id: Option<String>,

    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,

    /// Gateway checkout session id.
    pub session_id: Option<String>,

    /// Gateway payment-intent id, known once the session completes.
    pub payment_intent_id: Option<String>,

    pub description: Option<String>,

    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub metadata: PaymentMetadata,

    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Where this payment came from, read from its metadata.
    pub fn kind(&self) -> Option<PaymentKind> {
        self.metadata
            .get(crate::META_KIND)
            .and_then(|v| v.as_str())
            .and_then(PaymentKind::parse)
    }
}

/// Origin of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Checkout of a client's cart. Completion materializes sales.
    Cart,
    /// Payment of an existing order or an arbitrary amount.
    Direct,
}

impl PaymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::Cart => "cart",
            PaymentKind::Direct => "direct",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cart" => Some(PaymentKind::Cart),
            "direct" => Some(PaymentKind::Direct),
            _ => None,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// The status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Completed,
    Cancelled,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Pending
    }
}

/// One product sold to one client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub client_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,

    /// Always `quantity × unit_price_cents`; recomputed on every persist.
    pub total_cents: i64,

    pub status: SaleStatus,
    pub sold_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Recomputes the derived total from quantity and unit price.
    pub fn recompute_total(&mut self) {
        self.total_cents = Money::from_cents(self.unit_price_cents)
            .multiply_quantity(self.quantity)
            .cents();
    }
}

/// Aggregate sales figures for the admin dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesStats {
    pub total_sales: i64,
    pub sales_last_30_days: i64,
    pub total_revenue_cents: i64,
    pub revenue_last_30_days_cents: i64,
    pub average_sale_cents: i64,
    pub best_selling_product: Option<String>,
    pub best_selling_units: i64,
}

// =============================================================================
// Audit
// =============================================================================

/// Kind of mutation recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

/// Append-only audit log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditEntry {
    pub id: String,
    pub user_id: Option<String>,
    pub action: AuditAction,
    pub entity: String,
    pub entity_id: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, qty: i64) -> CartLine {
        CartLine {
            item_id: "i".into(),
            product_id: "p".into(),
            product_name: "Mouse".into(),
            description: None,
            unit_price_cents: price,
            quantity: qty,
            stock: 10,
        }
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(SaleStatus::default(), SaleStatus::Pending);
    }

    #[test]
    fn test_cart_line_snapshot() {
        let item = line(2500, 3).to_order_item();
        assert_eq!(item.subtotal_cents, 7500);
        assert_eq!(item.product_name, "Mouse");
    }

    #[test]
    fn test_cart_summary() {
        let summary = CartSummary::from_lines(&[line(2500, 3), line(100, 2)]);
        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.total_quantity, 5);
        assert_eq!(summary.total_price_cents, 7700);
    }

    #[test]
    fn test_sale_recompute_total() {
        let now = Utc::now();
        let mut sale = Sale {
            id: "s".into(),
            client_id: "c".into(),
            product_id: "p".into(),
            quantity: 4,
            unit_price_cents: 125,
            total_cents: 0,
            status: SaleStatus::Completed,
            sold_at: now,
            updated_at: now,
        };
        sale.recompute_total();
        assert_eq!(sale.total_cents, 500);
    }

    #[test]
    fn test_payment_kind_roundtrip() {
        assert_eq!(PaymentKind::parse("cart"), Some(PaymentKind::Cart));
        assert_eq!(PaymentKind::parse(PaymentKind::Direct.as_str()), Some(PaymentKind::Direct));
        assert_eq!(PaymentKind::parse("carrito"), None);
    }
}
