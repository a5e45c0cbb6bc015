//! `PgStore` against a real `PostgreSQL` database.
//!
//! These tests require:
//! - A database with `crates/api/sql/schema.sql` applied
//! - `DELIVERIES_TEST_DATABASE_URL` pointing at it
//!
//! Each test uses its own CPFs and cleans up after itself.

use secrecy::SecretString;
use sqlx::PgPool;

use deliveries_api::db::{PgStore, Store, create_pool};
use deliveries_api::models::{DeliveryDetails, NewClient};
use deliveries_core::{ClientId, Cpf};
use deliveries_integration_tests::test_database_url;

async fn pool() -> PgPool {
    let url = test_database_url().expect("DELIVERIES_TEST_DATABASE_URL must be set");
    create_pool(&SecretString::from(url), 5)
        .await
        .expect("Failed to connect to test database")
}

fn candidate(name: &str, cpf: &str) -> NewClient {
    NewClient {
        name: name.to_string(),
        cpf: Cpf::parse(cpf).expect("valid CPF"),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: String::new(),
    }
}

fn details(city: &str) -> DeliveryDetails {
    DeliveryDetails {
        weight: 2.0,
        address: "Rua do Teste, 1".to_string(),
        street: "Rua do Teste".to_string(),
        number: "1".to_string(),
        neighborhood: String::new(),
        complement: String::new(),
        city: city.to_string(),
        state: "PE".to_string(),
        country: "Brasil".to_string(),
        latitude: None,
        longitude: Some(-34.9),
    }
}

async fn remove_client(pool: &PgPool, cpf: &str) {
    let cpf = Cpf::parse(cpf).expect("valid CPF");
    let id: Option<ClientId> = sqlx::query_scalar("SELECT id FROM cliente WHERE cpf = $1")
        .bind(&cpf)
        .fetch_optional(pool)
        .await
        .expect("lookup");
    if let Some(id) = id {
        PgStore::new(pool.clone())
            .delete_client(id)
            .await
            .expect("cleanup");
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DELIVERIES_TEST_DATABASE_URL)"]
async fn test_resolve_is_idempotent_and_keeps_first_fields() {
    let pool = pool().await;
    let store = PgStore::new(pool.clone());
    remove_client(&pool, "111.444.777-35").await;

    let first = store
        .resolve_client(&candidate("Primeiro", "111.444.777-35"))
        .await
        .expect("first resolve");
    let second = store
        .resolve_client(&candidate("Segundo", "11144477735"))
        .await
        .expect("second resolve");

    assert_eq!(first, second);
    let stored = store.get_client(first).await.expect("get").expect("exists");
    assert_eq!(stored.name, "Primeiro");
    assert_eq!(stored.email, "primeiro@example.com");

    remove_client(&pool, "111.444.777-35").await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DELIVERIES_TEST_DATABASE_URL)"]
async fn test_concurrent_resolves_create_one_client() {
    let pool = pool().await;
    let store = PgStore::new(pool.clone());
    remove_client(&pool, "529.982.247-25").await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .resolve_client(&candidate(&format!("Cliente{i}"), "52998224725"))
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.expect("join").expect("resolve"));
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);

    remove_client(&pool, "529.982.247-25").await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DELIVERIES_TEST_DATABASE_URL)"]
async fn test_delivery_lifecycle_and_cascade() {
    let pool = pool().await;
    let store = PgStore::new(pool.clone());
    remove_client(&pool, "123.456.789-09").await;

    let owner = candidate("Dona", "123.456.789-09");
    let first = store
        .create_delivery(&owner, &details("Caruaru"))
        .await
        .expect("create");
    let second = store
        .create_delivery(&owner, &details("Caruaru"))
        .await
        .expect("create");
    assert_eq!(first.client_id, second.client_id);

    let fetched = store.get_delivery(first.id).await.expect("get");
    assert_eq!(fetched, Some(first.clone()));

    let in_city = store
        .list_deliveries_by_city("Caruaru")
        .await
        .expect("by city");
    assert!(in_city.iter().any(|d| d.id == second.id));

    let moved = store
        .update_delivery(second.id, second.client_id, &details("Gravatá"))
        .await
        .expect("update");
    assert_eq!(moved.details.city, "Gravatá");

    let removed = store.delete_client(first.client_id).await.expect("delete");
    assert_eq!(removed, 2);
    assert_eq!(store.get_delivery(first.id).await.expect("get"), None);
    assert_eq!(store.get_client(first.client_id).await.expect("get"), None);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DELIVERIES_TEST_DATABASE_URL)"]
async fn test_constraint_violations_are_conflicts() {
    use deliveries_api::db::RepositoryError;

    let pool = pool().await;
    let store = PgStore::new(pool.clone());
    remove_client(&pool, "111.444.777-35").await;

    let client = store
        .create_client(&candidate("Unica", "111.444.777-35"))
        .await
        .expect("create");
    let duplicate = store
        .create_client(&candidate("Copia", "11144477735"))
        .await;
    assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

    let delivery = store
        .create_delivery(&candidate("Unica", "11144477735"), &details("Recife"))
        .await
        .expect("create delivery");
    let orphan = store
        .update_delivery(delivery.id, ClientId::new(i32::MAX), &details("Recife"))
        .await;
    assert!(matches!(orphan, Err(RepositoryError::Conflict(_))));

    store.delete_client(client.id).await.expect("cleanup");
}
