use thiserror::Error;

use crate::domain::customer::CustomerId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown gender `{0}`")]
    UnknownGender(String),
    #[error("unknown role `{0}`")]
    UnknownRole(String),
}

/// Failure raised by a `CustomerStore` implementation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("persistence failure: {0}")]
    Persistence(String),
    /// The store refused a write because another record already holds the email.
    #[error("email is already stored for another customer")]
    UniqueEmail,
    #[error("stored record could not be decoded: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CustomerError {
    #[error("customer with id [{id}] not found")]
    NotFound { id: CustomerId },
    #[error("{message}")]
    Duplicate { message: String },
    #[error("{message}")]
    Validation { message: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CustomerError {
    pub fn not_found(id: CustomerId) -> Self {
        Self::NotFound { id }
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate { message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
}

impl InterfaceError {
    /// Message safe to return to the caller. Client errors already carry a
    /// user-facing message; store failures do not.
    pub fn user_message(&self) -> &str {
        match self {
            Self::NotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::BadRequest { message, .. } => message,
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::NotFound { correlation_id, .. }
            | Self::Conflict { correlation_id, .. }
            | Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. } => correlation_id,
        }
    }
}

impl CustomerError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<CustomerError> for InterfaceError {
    fn from(value: CustomerError) -> Self {
        let message = value.to_string();
        let correlation_id = "unassigned".to_owned();
        match value {
            CustomerError::NotFound { .. } => Self::NotFound { message, correlation_id },
            CustomerError::Duplicate { .. } => Self::Conflict { message, correlation_id },
            CustomerError::Validation { .. } => Self::BadRequest { message, correlation_id },
            CustomerError::Store(_) => Self::ServiceUnavailable { message, correlation_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::customer::CustomerId;
    use crate::errors::{CustomerError, InterfaceError, StoreError};

    #[test]
    fn not_found_message_includes_bracketed_id() {
        let error = CustomerError::not_found(CustomerId(10));

        assert_eq!(error.to_string(), "customer with id [10] not found");
    }

    #[test]
    fn not_found_maps_to_not_found_interface_error() {
        let interface = CustomerError::not_found(CustomerId(3)).into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::NotFound { ref correlation_id, .. } if correlation_id == "req-1"
        ));
        assert_eq!(interface.user_message(), "customer with id [3] not found");
    }

    #[test]
    fn duplicate_maps_to_conflict() {
        let interface = CustomerError::duplicate("email already exists").into_interface("req-2");

        assert!(matches!(interface, InterfaceError::Conflict { .. }));
        assert_eq!(interface.user_message(), "email already exists");
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let interface = CustomerError::validation("No data changes found").into_interface("req-3");

        assert!(matches!(interface, InterfaceError::BadRequest { .. }));
        assert_eq!(interface.correlation_id(), "req-3");
    }

    #[test]
    fn store_failure_hides_detail_from_user_message() {
        let interface = CustomerError::from(StoreError::Persistence("database is locked".into()))
            .into_interface("req-4");

        assert!(matches!(
            interface,
            InterfaceError::ServiceUnavailable { ref message, .. } if message.contains("locked")
        ));
        assert_eq!(
            interface.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }
}
