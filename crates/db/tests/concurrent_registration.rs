//! Two registrations racing for one email over a file-backed pool.

use std::sync::Arc;

use customers_core::customers::{CustomerService, EMAIL_ALREADY_EXISTS};
use customers_core::domain::customer::{CustomerRegistrationRequest, Gender};
use customers_core::errors::CustomerError;
use customers_db::{connect_with_settings, migrations, SqlCustomerRepository};

fn registration(name: &str, email: &str) -> CustomerRegistrationRequest {
    CustomerRegistrationRequest {
        name: name.to_string(),
        email: email.to_string(),
        age: 30,
        gender: Gender::Female,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn racing_registrations_for_one_email_yield_one_customer_and_one_duplicate() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("customers.db").display());
    let pool = connect_with_settings(&url, 5, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");
    let service = Arc::new(CustomerService::new(SqlCustomerRepository::new(pool.clone())));

    let duplicate = CustomerError::duplicate(EMAIL_ALREADY_EXISTS);
    for round in 0..20 {
        let email = format!("race-{round}@mailservice.com");
        let first = tokio::spawn({
            let service = Arc::clone(&service);
            let email = email.clone();
            async move { service.add_customer(registration("First", &email)).await }
        });
        let second = tokio::spawn({
            let service = Arc::clone(&service);
            let email = email.clone();
            async move { service.add_customer(registration("Second", &email)).await }
        });

        let outcomes = [first.await.expect("join first"), second.await.expect("join second")];
        let created = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        let duplicates =
            outcomes.iter().filter(|outcome| outcome.as_ref().err() == Some(&duplicate)).count();

        assert_eq!((created, duplicates), (1, 1), "round {round}: {outcomes:?}");
    }

    pool.close().await;
}
