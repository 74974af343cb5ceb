use thiserror::Error;

use customers_core::errors::StoreError;

pub mod customer;
pub mod memory;

pub use customer::SqlCustomerRepository;
pub use memory::InMemoryCustomerRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(sqlx::Error::Database(ref db_error))
                if db_error.is_unique_violation() =>
            {
                Self::UniqueEmail
            }
            RepositoryError::Database(source) => Self::Persistence(source.to_string()),
            RepositoryError::Decode(message) => Self::Decode(message),
        }
    }
}
