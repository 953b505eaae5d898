//! # Cart Service
//!
//! Per-client persistent cart. Every mutation runs in its own transaction,
//! re-reads the product, and appends an audit entry.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│ Payment  │       │
//! │  │  Cart    │     │          │     │ (Order)  │     │ Complete │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                │             │
//! │                   add_item         cart untouched    cart cleared       │
//! │                   update_quantity                   (reconciliation)    │
//! │                   remove_item                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear ────────────────────────────►                  │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, ServiceResult};
use crate::pool::Database;
use crate::repository::{AuditRepository, CartRepository, ClientRepository, ProductRepository};
use smartsales_core::validation::validate_quantity;
use smartsales_core::{AuditAction, CartItem, CartLine, CartSummary, CoreError, Product};

const ENTITY: &str = "cart_item";

#[derive(Debug, Clone)]
pub struct CartService {
    db: Database,
}

impl CartService {
    pub fn new(db: Database) -> Self {
        CartService { db }
    }

    pub async fn lines(&self, client_id: &str) -> ServiceResult<Vec<CartLine>> {
        Ok(self.db.carts().lines(client_id).await?)
    }

    pub async fn summary(&self, client_id: &str) -> ServiceResult<CartSummary> {
        let lines = self.db.carts().lines(client_id).await?;
        Ok(CartSummary::from_lines(&lines))
    }

    /// Adds a product to the cart.
    ///
    /// ## Behavior
    /// - Product already in cart: quantities are merged
    /// - The merged quantity must fit in current stock
    /// - Inactive products are refused
    ///
    /// ## Returns
    /// The cart after the change.
    pub async fn add_item(&self, client_id: &str, product_id: &str, quantity: i64) -> ServiceResult<Vec<CartLine>> {
        validate_quantity(quantity)?;
        debug!(client_id = %client_id, product_id = %product_id, quantity, "Adding to cart");

        let mut tx = self.db.pool().begin().await?;

        if ClientRepository::fetch(&mut tx, client_id).await?.is_none() {
            return Err(DbError::not_found("Client", client_id).into());
        }
        let product = sellable_product(&mut tx, product_id).await?;

        match CartRepository::find(&mut tx, client_id, product_id).await? {
            Some(existing) => {
                let merged = existing.quantity + quantity;
                validate_quantity(merged)?;
                ensure_stock(&product, merged)?;
                CartRepository::set_quantity(&mut tx, &existing.id, merged).await?;
                AuditRepository::record(
                    &mut tx,
                    Some(client_id),
                    AuditAction::Update,
                    ENTITY,
                    Some(&existing.id),
                    &format!("{} quantity {} -> {}", product.name, existing.quantity, merged),
                )
                .await?;
            }
            None => {
                ensure_stock(&product, quantity)?;
                let now = Utc::now();
                let item = CartItem {
                    id: Uuid::new_v4().to_string(),
                    client_id: client_id.to_string(),
                    product_id: product_id.to_string(),
                    quantity,
                    created_at: now,
                    updated_at: now,
                };
                CartRepository::insert(&mut tx, &item).await?;
                AuditRepository::record(
                    &mut tx,
                    Some(client_id),
                    AuditAction::Create,
                    ENTITY,
                    Some(&item.id),
                    &format!("Added {} x{}", product.name, quantity),
                )
                .await?;
            }
        }

        let lines = CartRepository::fetch_lines(&mut tx, client_id).await?;
        tx.commit().await?;
        Ok(lines)
    }

    /// Sets the quantity of one cart row. Quantity 0 removes the row.
    pub async fn update_quantity(&self, client_id: &str, item_id: &str, quantity: i64) -> ServiceResult<Vec<CartLine>> {
        if quantity == 0 {
            return self.remove_item(client_id, item_id).await;
        }
        validate_quantity(quantity)?;

        let mut tx = self.db.pool().begin().await?;

        let item = owned_item(&mut tx, client_id, item_id).await?;
        let product = sellable_product(&mut tx, &item.product_id).await?;
        ensure_stock(&product, quantity)?;

        CartRepository::set_quantity(&mut tx, item_id, quantity).await?;
        AuditRepository::record(
            &mut tx,
            Some(client_id),
            AuditAction::Update,
            ENTITY,
            Some(item_id),
            &format!("{} quantity {} -> {}", product.name, item.quantity, quantity),
        )
        .await?;

        let lines = CartRepository::fetch_lines(&mut tx, client_id).await?;
        tx.commit().await?;
        Ok(lines)
    }

    pub async fn remove_item(&self, client_id: &str, item_id: &str) -> ServiceResult<Vec<CartLine>> {
        let mut tx = self.db.pool().begin().await?;

        owned_item(&mut tx, client_id, item_id).await?;
        CartRepository::delete(&mut tx, item_id).await?;
        AuditRepository::record(
            &mut tx,
            Some(client_id),
            AuditAction::Delete,
            ENTITY,
            Some(item_id),
            "Removed from cart",
        )
        .await?;

        let lines = CartRepository::fetch_lines(&mut tx, client_id).await?;
        tx.commit().await?;
        Ok(lines)
    }

    /// Empties the cart. Returns the number of rows removed.
    pub async fn clear(&self, client_id: &str) -> ServiceResult<u64> {
        let mut tx = self.db.pool().begin().await?;

        let removed = CartRepository::clear(&mut tx, client_id).await?;
        if removed > 0 {
            AuditRepository::record(
                &mut tx,
                Some(client_id),
                AuditAction::Delete,
                ENTITY,
                None,
                &format!("Cleared cart ({removed} items)"),
            )
            .await?;
        }

        tx.commit().await?;
        info!(client_id = %client_id, removed, "Cart cleared");
        Ok(removed)
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn sellable_product(conn: &mut SqliteConnection, product_id: &str) -> ServiceResult<Product> {
    let product = ProductRepository::fetch(conn, product_id)
        .await?
        .ok_or_else(|| DbError::not_found("Product", product_id))?;

    if !product.is_active {
        return Err(CoreError::ProductInactive(product.name).into());
    }
    Ok(product)
}

/// The row, if it exists and belongs to `client_id`. Other clients' rows
/// are reported as not found.
async fn owned_item(conn: &mut SqliteConnection, client_id: &str, item_id: &str) -> ServiceResult<CartItem> {
    match CartRepository::fetch_item(conn, item_id).await? {
        Some(item) if item.client_id == client_id => Ok(item),
        _ => Err(DbError::not_found("CartItem", item_id).into()),
    }
}

fn ensure_stock(product: &Product, requested: i64) -> ServiceResult<()> {
    if !product.can_sell(requested) {
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock,
            requested,
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::test_support::{client, product, seeded_db};

    async fn setup() -> (CartService, Database, String, Product) {
        let db = seeded_db().await;
        let c = db.clients().insert(&client("Ana", "ana@example.com")).await.unwrap();
        let p = db.products().insert(&product("Mouse", 1500, 5)).await.unwrap();
        (CartService::new(db.clone()), db, c.id, p)
    }

    #[tokio::test]
    async fn test_add_merges_quantities() {
        let (cart, _db, client_id, p) = setup().await;

        cart.add_item(&client_id, &p.id, 2).await.unwrap();
        let lines = cart.add_item(&client_id, &p.id, 1).await.unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);

        let summary = cart.summary(&client_id).await.unwrap();
        assert_eq!(summary.total_items, 1);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.total_price_cents, 4500);
    }

    #[tokio::test]
    async fn test_merged_quantity_checked_against_stock() {
        let (cart, _db, client_id, p) = setup().await;
        cart.add_item(&client_id, &p.id, 4).await.unwrap();

        let err = cart.add_item(&client_id, &p.id, 2).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InsufficientStock { available: 5, requested: 6, .. })
        ));
        assert_eq!(cart.lines(&client_id).await.unwrap()[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_inactive_product_refused() {
        let (cart, db, client_id, _) = setup().await;
        let mut off = product("Old", 100, 10);
        off.is_active = false;
        let off = db.products().insert(&off).await.unwrap();

        let err = cart.add_item(&client_id, &off.id, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::ProductInactive(_))));
    }

    #[tokio::test]
    async fn test_update_zero_removes_and_foreign_rows_are_hidden() {
        let (cart, db, client_id, p) = setup().await;
        let other = db.clients().insert(&client("Ben", "ben@example.com")).await.unwrap();

        let lines = cart.add_item(&client_id, &p.id, 1).await.unwrap();
        let item_id = lines[0].item_id.clone();

        let err = cart.update_quantity(&other.id, &item_id, 2).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(DbError::NotFound { .. })));

        let lines = cart.update_quantity(&client_id, &item_id, 0).await.unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_mutations_are_audited() {
        let (cart, db, client_id, p) = setup().await;
        let lines = cart.add_item(&client_id, &p.id, 1).await.unwrap();
        let item_id = lines[0].item_id.clone();
        cart.update_quantity(&client_id, &item_id, 3).await.unwrap();
        cart.remove_item(&client_id, &item_id).await.unwrap();

        let entries = db.audit().list_for_entity(ENTITY, &item_id).await.unwrap();
        let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
        assert_eq!(actions, [AuditAction::Create, AuditAction::Update, AuditAction::Delete]);
    }

    #[tokio::test]
    async fn test_clear() {
        let (cart, db, client_id, p) = setup().await;
        let q = db.products().insert(&product("Pad", 300, 9)).await.unwrap();
        cart.add_item(&client_id, &p.id, 1).await.unwrap();
        cart.add_item(&client_id, &q.id, 2).await.unwrap();

        assert_eq!(cart.clear(&client_id).await.unwrap(), 2);
        assert_eq!(cart.clear(&client_id).await.unwrap(), 0);
        assert!(cart.lines(&client_id).await.unwrap().is_empty());
    }
}
