//! # Sale Service
//!
//! Administrative sales: recorded directly, outside the cart/payment flow.
//! Unlike cart checkout, a direct sale takes units out of stock.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, ServiceResult};
use crate::pool::Database;
use crate::repository::{AuditRepository, ClientRepository, ProductRepository, SaleRepository};
use smartsales_core::validation::validate_quantity;
use smartsales_core::{AuditAction, CoreError, Sale, SaleStatus, SalesStats};

#[derive(Debug, Clone)]
pub struct SaleService {
    db: Database,
}

impl SaleService {
    pub fn new(db: Database) -> Self {
        SaleService { db }
    }

    /// Records a completed sale at the product's current price and takes
    /// the units out of stock.
    ///
    /// ## Errors
    /// * `InsufficientStock` - the compare-and-swap decrement matched no row
    /// * `ProductInactive` - product cannot be sold
    pub async fn create_direct_sale(
        &self,
        user_id: Option<&str>,
        client_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> ServiceResult<Sale> {
        validate_quantity(quantity)?;

        let mut tx = self.db.pool().begin().await?;

        if ClientRepository::fetch(&mut tx, client_id).await?.is_none() {
            return Err(DbError::not_found("Client", client_id).into());
        }
        let product = ProductRepository::fetch(&mut tx, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;
        if !product.is_active {
            return Err(CoreError::ProductInactive(product.name).into());
        }

        let now = Utc::now();
        let mut sale = Sale {
            id: Uuid::new_v4().to_string(),
            client_id: client_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents: product.price_cents,
            total_cents: 0,
            status: SaleStatus::Completed,
            sold_at: now,
            updated_at: now,
        };
        sale.recompute_total();

        SaleRepository::insert(&mut tx, &sale).await?;

        if !ProductRepository::decrement_stock_checked(&mut tx, product_id, quantity).await? {
            return Err(CoreError::InsufficientStock {
                product: product.name,
                available: product.stock,
                requested: quantity,
            }
            .into());
        }

        AuditRepository::record(
            &mut tx,
            user_id,
            AuditAction::Create,
            "sale",
            Some(&sale.id),
            &format!("Direct sale: {} x{}", product.name, quantity),
        )
        .await?;

        tx.commit().await?;
        info!(sale_id = %sale.id, product_id = %product_id, quantity, "Direct sale recorded");

        Ok(sale)
    }

    /// Deletes a sale and returns its units to stock.
    pub async fn delete_sale(&self, user_id: Option<&str>, sale_id: &str) -> ServiceResult<()> {
        let mut tx = self.db.pool().begin().await?;

        let sale = SaleRepository::fetch(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))?;

        ProductRepository::restore_stock(&mut tx, &sale.product_id, sale.quantity).await?;
        AuditRepository::record(
            &mut tx,
            user_id,
            AuditAction::Delete,
            "sale",
            Some(sale_id),
            &format!("Deleted sale, {} units returned to stock", sale.quantity),
        )
        .await?;
        SaleRepository::delete(&mut tx, sale_id).await?;

        tx.commit().await?;
        info!(sale_id = %sale_id, "Sale deleted");
        Ok(())
    }

    pub async fn stats(&self) -> ServiceResult<SalesStats> {
        Ok(self.db.sales().stats(Utc::now()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::test_support::{client, product, seeded_db};

    async fn setup() -> (SaleService, Database, String, String) {
        let db = seeded_db().await;
        let c = db.clients().insert(&client("Ana", "ana@example.com")).await.unwrap();
        let p = db.products().insert(&product("Mouse", 1500, 5)).await.unwrap();
        (SaleService::new(db.clone()), db, c.id, p.id)
    }

    async fn stock(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_direct_sale_decrements_stock() {
        let (svc, db, client_id, product_id) = setup().await;

        let sale = svc.create_direct_sale(Some("admin"), &client_id, &product_id, 2).await.unwrap();
        assert_eq!(sale.total_cents, 3000);
        assert_eq!(stock(&db, &product_id).await, 3);

        let entries = db.audit().list_for_entity("sale", &sale.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].user_id.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_oversell_rolls_back() {
        let (svc, db, client_id, product_id) = setup().await;

        let err = svc.create_direct_sale(None, &client_id, &product_id, 6).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::InsufficientStock { .. })));
        assert_eq!(stock(&db, &product_id).await, 5);
        assert!(db.sales().list_for_client(&client_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_restores_stock() {
        let (svc, db, client_id, product_id) = setup().await;
        let sale = svc.create_direct_sale(None, &client_id, &product_id, 4).await.unwrap();
        assert_eq!(stock(&db, &product_id).await, 1);

        svc.delete_sale(None, &sale.id).await.unwrap();
        assert_eq!(stock(&db, &product_id).await, 5);
        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_none());

        let err = svc.delete_sale(None, &sale.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_stats() {
        let (svc, _db, client_id, product_id) = setup().await;
        svc.create_direct_sale(None, &client_id, &product_id, 1).await.unwrap();
        svc.create_direct_sale(None, &client_id, &product_id, 2).await.unwrap();

        let stats = svc.stats().await.unwrap();
        assert_eq!(stats.total_sales, 2);
        assert_eq!(stats.total_revenue_cents, 4500);
        assert_eq!(stats.best_selling_units, 3);
    }
}
