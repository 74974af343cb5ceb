//! Customer management: the persistence seam and the service that enforces
//! customer invariants on top of it.

use async_trait::async_trait;

use crate::domain::customer::{Customer, CustomerId, NewCustomer};
use crate::errors::StoreError;

pub mod service;

pub use service::{CustomerService, EMAIL_ALREADY_EXISTS, EMAIL_ALREADY_TAKEN, NO_DATA_CHANGES};

/// Persistence boundary for customer records.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// All customers ordered by id.
    async fn list_all(&self) -> Result<Vec<Customer>, StoreError>;

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;

    async fn exists_by_id(&self, id: CustomerId) -> Result<bool, StoreError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    /// Persists a new customer and returns it with its store-assigned id.
    async fn insert(&self, customer: NewCustomer) -> Result<Customer, StoreError>;

    /// Overwrites every column of the record identified by `customer.id`.
    async fn update(&self, customer: Customer) -> Result<(), StoreError>;

    async fn delete_by_id(&self, id: CustomerId) -> Result<(), StoreError>;
}
