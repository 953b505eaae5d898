//! # Checkout Service
//!
//! Opens gateway checkout sessions and records the Pending Order/Payment
//! pair that reconciliation will later settle.
//!
//! ## Checkout From Cart
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── load cart lines ─────────── empty ──────────► EmptyCart          │
//! │    ├── re-check every line's stock ── short ───────► InsufficientStock  │
//! │    ├── gateway.create_session ─── error ───────────► Gateway            │
//! │    ├── INSERT order   (Pending, item snapshot, total)                   │
//! │    ├── INSERT payment (Pending, session_id, {order_id, kind: cart})     │
//! │    ├── UPDATE order.payment_id                                          │
//! │    └── audit                                                            │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error above drops the transaction: nothing is written.            │
//! │  Stock is validated, not reserved. The cart is left as it is.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DbError, ServiceResult};
use crate::pool::Database;
use crate::repository::{AuditRepository, CartRepository, ClientRepository, OrderRepository, PaymentRepository};
use smartsales_core::gateway::{LineItem, PaymentGateway, SessionRequest};
use smartsales_core::validation::{validate_amount_cents, validate_currency};
use smartsales_core::{
    AuditAction, CoreError, Money, Order, OrderStatus, Payment, PaymentKind, PaymentMetadata, PaymentMethod,
    PaymentStatus, ValidationError, DEFAULT_CURRENCY, META_KIND, META_ORDER_ID,
};

/// What the client needs to continue on the hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub session_id: String,
    pub redirect_url: String,
    pub payment_id: String,
    pub order_id: String,
    pub total_cents: i64,
}

/// What a direct payment session pays for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectSessionTarget {
    /// An existing Pending order of the same client with no payment yet.
    Order { order_id: String },
    /// A free amount. An empty-snapshot Order is created for it.
    Amount {
        amount_cents: i64,
        description: Option<String>,
    },
}

pub struct CheckoutService {
    db: Database,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl CheckoutService {
    pub fn new(db: Database, gateway: Arc<dyn PaymentGateway>) -> Self {
        CheckoutService {
            db,
            gateway,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Overrides the ISO currency sent to the gateway.
    pub fn with_currency(mut self, currency: &str) -> ServiceResult<Self> {
        self.currency = validate_currency(currency)?;
        Ok(self)
    }

    /// Turns the client's cart into a Pending Order and Payment.
    pub async fn checkout_cart(&self, client_id: &str) -> ServiceResult<CheckoutReceipt> {
        let mut tx = self.db.pool().begin().await?;

        let client = ClientRepository::fetch(&mut tx, client_id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", client_id))?;

        let lines = CartRepository::fetch_lines(&mut tx, client_id).await?;
        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        for line in &lines {
            if line.quantity > line.stock {
                warn!(
                    client_id = %client_id,
                    product_id = %line.product_id,
                    stock = line.stock,
                    requested = line.quantity,
                    "Checkout refused: insufficient stock"
                );
                return Err(CoreError::InsufficientStock {
                    product: line.product_name.clone(),
                    available: line.stock,
                    requested: line.quantity,
                }
                .into());
            }
        }

        let items: Vec<_> = lines.iter().map(|l| l.to_order_item()).collect();
        let total: Money = lines.iter().map(|l| l.subtotal()).sum();
        let order_id = Uuid::new_v4().to_string();

        let request = SessionRequest {
            line_items: lines
                .iter()
                .map(|l| LineItem {
                    name: l.product_name.clone(),
                    description: l.description.clone(),
                    unit_amount_cents: l.unit_price_cents,
                    quantity: l.quantity,
                })
                .collect(),
            currency: self.currency.clone(),
            metadata: session_metadata(&order_id, client_id, Some(PaymentKind::Cart)),
            customer_email: Some(client.email.clone()),
        };

        // Dropping `tx` on error rolls everything back.
        let session = self.gateway.create_session(request).await?;

        let now = Utc::now();
        let order = Order {
            id: order_id.clone(),
            client_id: client_id.to_string(),
            items,
            total_cents: total.cents(),
            status: OrderStatus::Pending,
            payment_id: None,
            shipping_address: client.address.clone(),
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        OrderRepository::insert(&mut tx, &order).await?;

        let payment = self.pending_payment(
            client_id,
            &order_id,
            total.cents(),
            &session.session_id,
            format!("Order #{order_id}"),
            Some(PaymentKind::Cart),
        );
        PaymentRepository::insert(&mut tx, &payment).await?;
        OrderRepository::link_payment(&mut tx, &order_id, &payment.id).await?;

        AuditRepository::record(
            &mut tx,
            Some(client_id),
            AuditAction::Create,
            "payment",
            Some(&payment.id),
            &format!("Checkout session created for {total} ({} items)", order.items.len()),
        )
        .await?;

        tx.commit().await?;

        info!(
            client_id = %client_id,
            order_id = %order_id,
            payment_id = %payment.id,
            total_cents = total.cents(),
            "Cart checkout session created"
        );

        Ok(CheckoutReceipt {
            session_id: session.session_id,
            redirect_url: session.redirect_url,
            payment_id: payment.id,
            order_id,
            total_cents: total.cents(),
        })
    }

    /// Opens a session that is not built from the cart.
    pub async fn create_direct_session(
        &self,
        client_id: &str,
        target: DirectSessionTarget,
    ) -> ServiceResult<CheckoutReceipt> {
        let mut tx = self.db.pool().begin().await?;

        let client = ClientRepository::fetch(&mut tx, client_id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", client_id))?;

        // (order, is_new, description, line items, kind)
        let (order, is_new, description, line_items, kind) = match target {
            DirectSessionTarget::Order { order_id } => {
                let order = match OrderRepository::fetch(&mut tx, &order_id).await? {
                    Some(o) if o.client_id == client_id => o,
                    _ => return Err(DbError::not_found("Order", &order_id).into()),
                };
                if order.status != OrderStatus::Pending || order.payment_id.is_some() {
                    return Err(ValidationError::InvalidFormat {
                        field: "order_id".to_string(),
                        reason: format!("order is {} and cannot take a new payment", order.status),
                    }
                    .into());
                }
                validate_amount_cents(order.total_cents)?;

                let description = format!("Order #{}", order.id);
                let line_items = if order.items.is_empty() {
                    vec![single_line(&description, order.total_cents)]
                } else {
                    order
                        .items
                        .iter()
                        .map(|i| LineItem {
                            name: i.product_name.clone(),
                            description: i.description.clone(),
                            unit_amount_cents: i.unit_price_cents,
                            quantity: i.quantity,
                        })
                        .collect()
                };
                (order, false, description, line_items, None)
            }
            DirectSessionTarget::Amount {
                amount_cents,
                description,
            } => {
                if amount_cents <= 0 {
                    return Err(CoreError::InvalidPaymentAmount {
                        reason: format!("{amount_cents} cents"),
                    }
                    .into());
                }
                let description = description
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| "SmartSales payment".to_string());

                let now = Utc::now();
                let order = Order {
                    id: Uuid::new_v4().to_string(),
                    client_id: client_id.to_string(),
                    items: Vec::new(),
                    total_cents: amount_cents,
                    status: OrderStatus::Pending,
                    payment_id: None,
                    shipping_address: None,
                    completed_at: None,
                    created_at: now,
                    updated_at: now,
                };
                let line_items = vec![single_line(&description, amount_cents)];
                (order, true, description, line_items, Some(PaymentKind::Direct))
            }
        };

        let request = SessionRequest {
            line_items,
            currency: self.currency.clone(),
            metadata: session_metadata(&order.id, client_id, kind),
            customer_email: Some(client.email.clone()),
        };
        let session = self.gateway.create_session(request).await?;

        if is_new {
            OrderRepository::insert(&mut tx, &order).await?;
        }

        let payment = self.pending_payment(
            client_id,
            &order.id,
            order.total_cents,
            &session.session_id,
            description,
            kind,
        );
        PaymentRepository::insert(&mut tx, &payment).await?;
        OrderRepository::link_payment(&mut tx, &order.id, &payment.id).await?;

        AuditRepository::record(
            &mut tx,
            Some(client_id),
            AuditAction::Create,
            "payment",
            Some(&payment.id),
            &format!("Payment session created - {}", Money::from_cents(order.total_cents)),
        )
        .await?;

        tx.commit().await?;

        info!(
            client_id = %client_id,
            order_id = %order.id,
            payment_id = %payment.id,
            "Direct payment session created"
        );

        Ok(CheckoutReceipt {
            session_id: session.session_id,
            redirect_url: session.redirect_url,
            payment_id: payment.id,
            order_id: order.id,
            total_cents: order.total_cents,
        })
    }

    fn pending_payment(
        &self,
        client_id: &str,
        order_id: &str,
        amount_cents: i64,
        session_id: &str,
        description: String,
        kind: Option<PaymentKind>,
    ) -> Payment {
        let mut metadata = PaymentMetadata::new();
        metadata.insert(META_ORDER_ID.to_string(), Value::from(order_id));
        if let Some(kind) = kind {
            metadata.insert(META_KIND.to_string(), Value::from(kind.as_str()));
        }

        let now = Utc::now();
        Payment {
            id: Uuid::new_v4().to_string(),
            client_id: client_id.to_string(),
            order_id: Some(order_id.to_string()),
            sale_id: None,
            method: PaymentMethod::Stripe,
            amount_cents,
            currency: self.currency.clone(),
            status: PaymentStatus::Pending,
            session_id: Some(session_id.to_string()),
            payment_intent_id: None,
            description: Some(description),
            metadata,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

fn session_metadata(order_id: &str, client_id: &str, kind: Option<PaymentKind>) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    metadata.insert(META_ORDER_ID.to_string(), order_id.to_string());
    metadata.insert("client_id".to_string(), client_id.to_string());
    if let Some(kind) = kind {
        metadata.insert(META_KIND.to_string(), kind.as_str().to_string());
    }
    metadata
}

fn single_line(description: &str, amount_cents: i64) -> LineItem {
    LineItem {
        name: description.to_string(),
        description: None,
        unit_amount_cents: amount_cents,
        quantity: 1,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
