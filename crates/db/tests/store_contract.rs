//! Behavior every `CustomerStore` implementation must share.

use customers_core::customers::CustomerStore;
use customers_core::domain::customer::{CustomerId, Gender, NewCustomer, Role};
use customers_core::errors::StoreError;
use customers_db::{
    connect_with_settings, migrations, InMemoryCustomerRepository, SqlCustomerRepository,
};

fn registration(name: &str, email: &str) -> NewCustomer {
    NewCustomer {
        name: name.to_string(),
        gender: Gender::Female,
        email: email.to_string(),
        age: 30,
        role: Role::User,
    }
}

async fn exercise_store(store: &dyn CustomerStore) {
    assert!(store.list_all().await.expect("empty list").is_empty());

    let jane =
        store.insert(registration("Jane", "jane@mailservice.com")).await.expect("insert jane");
    let joan =
        store.insert(registration("Joan", "joan@mailservice.com")).await.expect("insert joan");
    assert!(jane.id < joan.id, "ids should increase with insertion order");

    assert!(store.exists_by_id(jane.id).await.expect("exists jane"));
    assert!(!store.exists_by_id(CustomerId(joan.id.0 + 100)).await.expect("unknown id"));
    assert!(store.exists_by_email("joan@mailservice.com").await.expect("exists email"));

    let mut renamed = jane.clone();
    renamed.name = "Jane Bolt".to_string();
    store.update(renamed.clone()).await.expect("update jane");
    assert_eq!(store.find_by_id(jane.id).await.expect("find jane"), Some(renamed.clone()));

    let taken = store.insert(registration("Copy", "joan@mailservice.com")).await;
    assert_eq!(taken, Err(StoreError::UniqueEmail));

    let mut stolen = jane.clone();
    stolen.email = "joan@mailservice.com".to_string();
    assert_eq!(store.update(stolen).await, Err(StoreError::UniqueEmail));

    store.delete_by_id(joan.id).await.expect("delete joan");
    assert_eq!(store.list_all().await.expect("list"), vec![renamed]);
    assert_eq!(store.find_by_id(joan.id).await.expect("find joan"), None);
}

#[tokio::test]
async fn sqlite_store_honors_contract() {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");

    exercise_store(&SqlCustomerRepository::new(pool)).await;
}

#[tokio::test]
async fn in_memory_store_honors_contract() {
    exercise_store(&InMemoryCustomerRepository::default()).await;
}
