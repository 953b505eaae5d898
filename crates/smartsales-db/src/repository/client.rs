//! # Client Repository
//!
//! Clients are created by the account system upstream; this crate only needs
//! to read them (and insert them from the seed binary and tests).

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use smartsales_core::Client;

const CLIENT_COLUMNS: &str = "id, name, email, phone, address, is_active, created_at";

#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Inserts a client.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - email already registered
    pub async fn insert(&self, client: &Client) -> DbResult<Client> {
        debug!(email = %client.email, "Inserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (id, name, email, phone, address, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(client.is_active)
        .bind(client.created_at)
        .execute(&self.pool)
        .await?;

        Ok(client.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Client>> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch(&mut conn, id).await
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Client>> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE email = ?1");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    /// Reads a client on an existing connection or transaction.
    pub async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Client>> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(client)
    }
}
