use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

/// Access role persisted alongside each customer. Not consulted by any
/// customer operation yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
    Manager,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            other => Err(DomainError::UnknownGender(other.to_string())),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "MANAGER" => Ok(Self::Manager),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub gender: Gender,
    pub email: String,
    pub age: i32,
    #[serde(default)]
    pub role: Role,
}

/// A customer that has not been persisted yet. The store assigns the id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub gender: Gender,
    pub email: String,
    pub age: i32,
    pub role: Role,
}

impl NewCustomer {
    pub fn with_id(self, id: CustomerId) -> Customer {
        Customer {
            id,
            name: self.name,
            gender: self.gender,
            email: self.email,
            age: self.age,
            role: self.role,
        }
    }
}

impl From<CustomerRegistrationRequest> for NewCustomer {
    fn from(request: CustomerRegistrationRequest) -> Self {
        Self {
            name: request.name,
            gender: request.gender,
            email: request.email,
            age: request.age,
            role: Role::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRegistrationRequest {
    pub name: String,
    pub email: String,
    pub age: i32,
    pub gender: Gender,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::{
        Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest, Gender,
        NewCustomer, Role,
    };

    #[test]
    fn registration_builds_user_role_customer_without_id() {
        let request = CustomerRegistrationRequest {
            name: "John".to_string(),
            email: "john@mailservice.com".to_string(),
            age: 21,
            gender: Gender::Male,
        };

        let new_customer = NewCustomer::from(request.clone());

        assert_eq!(new_customer.name, request.name);
        assert_eq!(new_customer.email, request.email);
        assert_eq!(new_customer.age, request.age);
        assert_eq!(new_customer.gender, Gender::Male);
        assert_eq!(new_customer.role, Role::User);
    }

    #[test]
    fn enums_use_upper_case_wire_names() {
        let customer = Customer {
            id: CustomerId(7),
            name: "Jane".to_string(),
            gender: Gender::Female,
            email: "jane@mailservice.com".to_string(),
            age: 30,
            role: Role::Manager,
        };

        let json = serde_json::to_value(&customer).expect("serialize customer");

        assert_eq!(json["id"], 7);
        assert_eq!(json["gender"], "FEMALE");
        assert_eq!(json["role"], "MANAGER");
    }

    #[test]
    fn update_request_treats_missing_fields_as_absent() {
        let request: CustomerUpdateRequest =
            serde_json::from_str(r#"{"name":"John Bolt","email":null}"#).expect("parse request");

        assert_eq!(request.name.as_deref(), Some("John Bolt"));
        assert_eq!(request.email, None);
        assert_eq!(request.age, None);
    }

    #[test]
    fn parses_stored_enum_values() {
        assert_eq!("MALE".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("OTHER".parse::<Gender>().is_err());
        assert!("ROOT".parse::<Role>().is_err());
    }
}
