pub mod config;
pub mod customers;
pub mod domain;
pub mod errors;

pub use customers::{CustomerService, CustomerStore};
pub use domain::customer::{
    Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest, Gender, NewCustomer,
    Role,
};
pub use errors::{CustomerError, DomainError, InterfaceError, StoreError};
