use std::collections::BTreeMap;

use tokio::sync::RwLock;

use customers_core::customers::CustomerStore;
use customers_core::domain::customer::{Customer, CustomerId, NewCustomer};
use customers_core::errors::StoreError;

#[derive(Default)]
struct CustomerTable {
    last_id: i64,
    rows: BTreeMap<CustomerId, Customer>,
}

impl CustomerTable {
    fn email_in_use(&self, email: &str, except: Option<CustomerId>) -> bool {
        self.rows.values().any(|row| row.email == email && Some(row.id) != except)
    }
}

/// Process-local store with the same id and email-uniqueness behavior as the
/// `customer` table.
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    table: RwLock<CustomerTable>,
}


#[async_trait::async_trait]
impl CustomerStore for InMemoryCustomerRepository {
    async fn list_all(&self) -> Result<Vec<Customer>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: CustomerId) -> Result<bool, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.contains_key(&id))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let table = self.table.read().await;
        Ok(table.email_in_use(email, None))
    }

    async fn insert(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let mut table = self.table.write().await;
        if table.email_in_use(&customer.email, None) {
            return Err(StoreError::UniqueEmail);
        }

        table.last_id += 1;
        let stored = customer.with_id(CustomerId(table.last_id));
        table.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, customer: Customer) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        if table.email_in_use(&customer.email, Some(customer.id)) {
            return Err(StoreError::UniqueEmail);
        }

        if let Some(row) = table.rows.get_mut(&customer.id) {
            *row = customer;
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: CustomerId) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table.rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use customers_core::customers::{CustomerService, CustomerStore};
    use customers_core::domain::customer::{
        CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest, Gender, NewCustomer, Role,
    };
    use customers_core::errors::{CustomerError, StoreError};

    use crate::repositories::InMemoryCustomerRepository;

    fn new_customer(email: &str) -> NewCustomer {
        NewCustomer {
            name: "John".to_string(),
            gender: Gender::Male,
            email: email.to_string(),
            age: 22,
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially_and_never_reused() {
        let repo = InMemoryCustomerRepository::default();

        let first = repo.insert(new_customer("a@mailservice.com")).await.expect("insert a");
        repo.delete_by_id(first.id).await.expect("delete a");
        let second = repo.insert(new_customer("b@mailservice.com")).await.expect("insert b");

        assert_eq!(first.id, CustomerId(1));
        assert_eq!(second.id, CustomerId(2));
        assert_eq!(repo.list_all().await.expect("list"), vec![second]);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let repo = InMemoryCustomerRepository::default();
        repo.insert(new_customer("a@mailservice.com")).await.expect("insert");

        let error = repo.insert(new_customer("a@mailservice.com")).await.expect_err("duplicate");

        assert_eq!(error, StoreError::UniqueEmail);
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_row() {
        let repo = InMemoryCustomerRepository::default();
        repo.insert(new_customer("a@mailservice.com")).await.expect("insert a");
        let mut second = repo.insert(new_customer("b@mailservice.com")).await.expect("insert b");

        second.email = "a@mailservice.com".to_string();
        let error = repo.update(second).await.expect_err("email belongs to the first row");

        assert_eq!(error, StoreError::UniqueEmail);
    }

    #[tokio::test]
    async fn update_allows_keeping_own_email() {
        let repo = InMemoryCustomerRepository::default();
        let mut stored = repo.insert(new_customer("a@mailservice.com")).await.expect("insert");

        stored.age = 23;
        repo.update(stored.clone()).await.expect("update");

        assert_eq!(repo.find_by_id(stored.id).await.expect("find"), Some(stored));
    }

    #[tokio::test]
    async fn service_lifecycle_over_in_memory_store() {
        let service = CustomerService::new(InMemoryCustomerRepository::default());

        let created = service
            .add_customer(CustomerRegistrationRequest {
                name: "Ada".to_string(),
                email: "ada@mailservice.com".to_string(),
                age: 36,
                gender: Gender::Female,
            })
            .await
            .expect("add");
        let duplicate = service
            .add_customer(CustomerRegistrationRequest {
                name: "Ada Again".to_string(),
                email: "ada@mailservice.com".to_string(),
                age: 37,
                gender: Gender::Female,
            })
            .await
            .expect_err("duplicate email");
        assert_eq!(duplicate, CustomerError::duplicate("email already exists"));

        let updated = service
            .update_customer(
                created.id,
                CustomerUpdateRequest { age: Some(37), ..Default::default() },
            )
            .await
            .expect("update");
        assert_eq!(updated.age, 37);
        assert_eq!(updated.name, "Ada");

        service.remove_customer_by_id(created.id).await.expect("remove");
        assert_eq!(
            service.get_customer(created.id).await.expect_err("gone"),
            CustomerError::not_found(created.id)
        );
        assert!(service.list_customers().await.expect("list").is_empty());
    }
}
