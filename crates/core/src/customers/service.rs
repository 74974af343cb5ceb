use crate::customers::CustomerStore;
use crate::domain::customer::{
    Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest, NewCustomer,
};
use crate::errors::{CustomerError, StoreError};

pub const EMAIL_ALREADY_EXISTS: &str = "email already exists";
pub const EMAIL_ALREADY_TAKEN: &str = "email already taken";
pub const NO_DATA_CHANGES: &str = "No data changes found";

pub struct CustomerService<S> {
    store: S,
}

/// Field values from an update request that differ from the stored record.
#[derive(Debug, Default)]
struct StagedChanges {
    name: Option<String>,
    email: Option<String>,
    age: Option<i32>,
}

impl StagedChanges {
    fn diff(current: &Customer, request: CustomerUpdateRequest) -> Self {
        Self {
            name: request.name.filter(|name| *name != current.name),
            email: request.email.filter(|email| *email != current.email),
            age: request.age.filter(|age| *age != current.age),
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }

    fn apply_to(self, customer: &mut Customer) {
        if let Some(name) = self.name {
            customer.name = name;
        }
        if let Some(email) = self.email {
            customer.email = email;
        }
        if let Some(age) = self.age {
            customer.age = age;
        }
    }
}

// A concurrent writer can claim the email between the existence check and the write.
fn duplicate_on_unique_email(error: StoreError, message: &str) -> CustomerError {
    match error {
        StoreError::UniqueEmail => CustomerError::duplicate(message),
        other => other.into(),
    }
}

impl<S: CustomerStore> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, CustomerError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, CustomerError> {
        self.store.find_by_id(id).await?.ok_or(CustomerError::not_found(id))
    }

    pub async fn add_customer(
        &self,
        request: CustomerRegistrationRequest,
    ) -> Result<Customer, CustomerError> {
        if self.store.exists_by_email(&request.email).await? {
            return Err(CustomerError::duplicate(EMAIL_ALREADY_EXISTS));
        }

        self.store
            .insert(NewCustomer::from(request))
            .await
            .map_err(|error| duplicate_on_unique_email(error, EMAIL_ALREADY_EXISTS))
    }

    pub async fn remove_customer_by_id(&self, id: CustomerId) -> Result<(), CustomerError> {
        if !self.store.exists_by_id(id).await? {
            return Err(CustomerError::not_found(id));
        }

        Ok(self.store.delete_by_id(id).await?)
    }

    /// Applies the non-empty fields of `request` that differ from the stored
    /// record. Fails without writing when nothing would change.
    pub async fn update_customer(
        &self,
        id: CustomerId,
        request: CustomerUpdateRequest,
    ) -> Result<Customer, CustomerError> {
        let mut customer = self.get_customer(id).await?;
        let staged = StagedChanges::diff(&customer, request);

        if let Some(email) = staged.email.as_deref() {
            if self.store.exists_by_email(email).await? {
                return Err(CustomerError::duplicate(EMAIL_ALREADY_TAKEN));
            }
        }

        if staged.is_empty() {
            return Err(CustomerError::validation(NO_DATA_CHANGES));
        }

        staged.apply_to(&mut customer);
        self.store
            .update(customer.clone())
            .await
            .map_err(|error| duplicate_on_unique_email(error, EMAIL_ALREADY_TAKEN))?;
        Ok(customer)
    }
}
