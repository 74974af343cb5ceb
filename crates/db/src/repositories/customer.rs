use async_trait::async_trait;
use sqlx::Row;

use customers_core::customers::CustomerStore;
use customers_core::domain::customer::{Customer, CustomerId, Gender, NewCustomer, Role};
use customers_core::errors::StoreError;

use super::RepositoryError;
use crate::DbPool;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn db_error(error: sqlx::Error) -> StoreError {
    RepositoryError::Database(error).into()
}

fn decode<T>(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn row_to_customer(row: &sqlx::sqlite::SqliteRow) -> Result<Customer, RepositoryError> {
    let id: i64 = decode(row, "id")?;
    let name: String = decode(row, "name")?;
    let email: String = decode(row, "email")?;
    let age: i32 = decode(row, "age")?;
    let gender_str: String = decode(row, "gender")?;
    let role_str: String = decode(row, "role")?;

    let gender = gender_str
        .parse::<Gender>()
        .map_err(|e| RepositoryError::Decode(format!("customer {id}: {e}")))?;
    let role = role_str
        .parse::<Role>()
        .map_err(|e| RepositoryError::Decode(format!("customer {id}: {e}")))?;

    Ok(Customer { id: CustomerId(id), name, gender, email, age, role })
}

#[async_trait]
impl CustomerStore for SqlCustomerRepository {
    async fn list_all(&self) -> Result<Vec<Customer>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, email, age, gender, role
             FROM customer ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.iter().map(row_to_customer).collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, email, age, gender, role
             FROM customer WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(ref r) => Ok(Some(row_to_customer(r)?)),
            None => Ok(None),
        }
    }

    async fn exists_by_id(&self, id: CustomerId) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer WHERE id = ?")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(count > 0)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(count > 0)
    }

    async fn insert(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let result = sqlx::query(
            "INSERT INTO customer (name, email, age, gender, role) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(customer.age)
        .bind(customer.gender.as_str())
        .bind(customer.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(customer.with_id(CustomerId(result.last_insert_rowid())))
    }

    async fn update(&self, customer: Customer) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE customer
             SET name = ?, email = ?, age = ?, gender = ?, role = ?
             WHERE id = ?",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(customer.age)
        .bind(customer.gender.as_str())
        .bind(customer.role.as_str())
        .bind(customer.id.0)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn delete_by_id(&self, id: CustomerId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM customer WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(())
    }
}
