//! # Reconciliation Service
//!
//! Applies gateway outcomes to Payments, Orders, Sales and Carts.
//!
//! ## Session Completed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── payment WHERE session_id = ? AND status = 'pending'             │
//! │    │       └── none ─────────────────────► Ignored (duplicate / late)   │
//! │    ├── UPDATE payment → completed  (guarded, rows == 1 or Ignored)     │
//! │    ├── UPDATE order   → completed, completed_at                        │
//! │    ├── if kind = cart and snapshot non-empty:                          │
//! │    │     INSERT sale per item (completed, stock untouched)             │
//! │    │     payment.sale_id = last sale                                   │
//! │    │     DELETE cart_items WHERE client_id = ?                         │
//! │    └── audit                                                            │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Session Expired
//! Payment → failed, Order → cancelled. A payment that already completed is
//! left alone; the illegal transition is logged.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DbError, ServiceResult};
use crate::pool::Database;
use crate::repository::{AuditRepository, CartRepository, OrderRepository, PaymentRepository, SaleRepository};
use smartsales_core::gateway::{GatewayEvent, GatewayEventKind, PaymentGateway};
use smartsales_core::lifecycle::{OrderEvent, PaymentEvent};
use smartsales_core::{AuditAction, Payment, PaymentKind, PaymentStatus, Sale, SaleStatus};

/// What a reconciliation call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Completed { payment_id: String, sales_created: usize },
    Expired { payment_id: String },
    /// No matching payment, already settled, or an event kind we do not act on.
    Ignored,
}

pub struct ReconciliationService {
    db: Database,
    gateway: Arc<dyn PaymentGateway>,
}

impl ReconciliationService {
    pub fn new(db: Database, gateway: Arc<dyn PaymentGateway>) -> Self {
        ReconciliationService { db, gateway }
    }

    /// Dispatches a verified webhook event.
    pub async fn handle_event(&self, event: &GatewayEvent) -> ServiceResult<ReconcileOutcome> {
        match &event.kind {
            GatewayEventKind::SessionCompleted {
                session_id,
                payment_intent_id,
            } => self.complete_session(session_id, payment_intent_id.as_deref()).await,
            GatewayEventKind::SessionExpired { session_id } => self.expire_session(session_id).await,
            GatewayEventKind::Other(kind) => {
                info!(event_id = %event.id, kind = %kind, "Ignoring gateway event");
                Ok(ReconcileOutcome::Ignored)
            }
        }
    }

    /// Settles a paid session. Safe to call any number of times.
    pub async fn complete_session(
        &self,
        session_id: &str,
        payment_intent_id: Option<&str>,
    ) -> ServiceResult<ReconcileOutcome> {
        let mut tx = self.db.pool().begin().await?;

        let Some(payment) = PaymentRepository::find_pending_by_session(&mut tx, session_id).await? else {
            info!(session_id = %session_id, "No pending payment for completed session");
            return Ok(ReconcileOutcome::Ignored);
        };

        payment.status.apply(PaymentEvent::SessionCompleted)?;

        let now = Utc::now();
        if !PaymentRepository::mark_completed(&mut tx, &payment.id, payment_intent_id, now).await? {
            info!(payment_id = %payment.id, "Payment settled concurrently");
            return Ok(ReconcileOutcome::Ignored);
        }

        let mut sales_created = 0;

        if let Some(order_id) = payment.order_id.as_deref() {
            let order = OrderRepository::fetch(&mut tx, order_id)
                .await?
                .ok_or_else(|| DbError::not_found("Order", order_id))?;

            match order.status.apply(OrderEvent::PaymentConfirmed) {
                Ok(next) => OrderRepository::set_status(&mut tx, &order.id, next, Some(now)).await?,
                Err(e) => warn!(order_id = %order.id, error = %e, "Order not completed"),
            }

            if !order.items.is_empty() && payment.kind() == Some(PaymentKind::Cart) {
                let mut last_sale_id = None;
                for item in &order.items {
                    let sale = Sale {
                        id: Uuid::new_v4().to_string(),
                        client_id: order.client_id.clone(),
                        product_id: item.product_id.clone(),
                        quantity: item.quantity,
                        unit_price_cents: item.unit_price_cents,
                        total_cents: item.subtotal_cents,
                        status: SaleStatus::Completed,
                        sold_at: now,
                        updated_at: now,
                    };
                    SaleRepository::insert(&mut tx, &sale).await?;
                    last_sale_id = Some(sale.id);
                    sales_created += 1;
                }

                if let Some(sale_id) = last_sale_id {
                    PaymentRepository::link_sale(&mut tx, &payment.id, &sale_id).await?;
                }
                CartRepository::clear(&mut tx, &order.client_id).await?;
            }
        }

        AuditRepository::record(
            &mut tx,
            Some(&payment.client_id),
            AuditAction::Update,
            "payment",
            Some(&payment.id),
            &format!("Payment completed ({sales_created} sales)"),
        )
        .await?;

        tx.commit().await?;

        info!(
            payment_id = %payment.id,
            session_id = %session_id,
            sales_created,
            "Payment completed"
        );

        Ok(ReconcileOutcome::Completed {
            payment_id: payment.id,
            sales_created,
        })
    }

    /// Marks an abandoned session's payment failed and its order cancelled.
    pub async fn expire_session(&self, session_id: &str) -> ServiceResult<ReconcileOutcome> {
        let mut tx = self.db.pool().begin().await?;

        let Some(payment) = PaymentRepository::find_by_session(&mut tx, session_id).await? else {
            info!(session_id = %session_id, "No payment for expired session");
            return Ok(ReconcileOutcome::Ignored);
        };

        let next = match payment.status.apply(PaymentEvent::SessionExpired) {
            Ok(next) => next,
            // Completed and Refunded land here. Their Sales already exist, so
            // a late expiry never downgrades them to Failed.
            Err(e) => {
                warn!(payment_id = %payment.id, error = %e, "Expired event ignored");
                return Ok(ReconcileOutcome::Ignored);
            }
        };
        PaymentRepository::set_status(&mut tx, &payment.id, next).await?;

        if let Some(order_id) = payment.order_id.as_deref() {
            if let Some(order) = OrderRepository::fetch(&mut tx, order_id).await? {
                match order.status.apply(OrderEvent::PaymentFailed) {
                    Ok(next) => OrderRepository::set_status(&mut tx, &order.id, next, None).await?,
                    Err(e) => warn!(order_id = %order.id, error = %e, "Order not cancelled"),
                }
            }
        }

        AuditRepository::record(
            &mut tx,
            Some(&payment.client_id),
            AuditAction::Update,
            "payment",
            Some(&payment.id),
            "Payment session expired",
        )
        .await?;

        tx.commit().await?;
        info!(payment_id = %payment.id, session_id = %session_id, "Payment session expired");

        Ok(ReconcileOutcome::Expired { payment_id: payment.id })
    }

    /// Asks the gateway about a client's payment and settles it if paid.
    ///
    /// ## Returns
    /// The payment as stored after the check.
    pub async fn poll_status(&self, client_id: &str, payment_id: &str) -> ServiceResult<Payment> {
        let payment = match self.db.payments().get_by_id(payment_id).await? {
            Some(p) if p.client_id == client_id => p,
            _ => return Err(DbError::not_found("Payment", payment_id).into()),
        };

        if payment.status != PaymentStatus::Pending {
            return Ok(payment);
        }
        let Some(session_id) = payment.session_id.as_deref() else {
            return Ok(payment);
        };

        let status = self.gateway.get_session(session_id).await?;
        if status.is_paid() {
            self.complete_session(session_id, status.payment_intent_id.as_deref())
                .await?;
        }

        self.db
            .payments()
            .get_by_id(payment_id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", payment_id).into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
