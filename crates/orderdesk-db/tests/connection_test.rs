//! Integration tests for `DbManager` using in-memory SurrealDB.

use orderdesk_core::models::order::{CreateOrder, OrderStatus};
use orderdesk_core::models::user::CreateUser;
use orderdesk_core::repository::{OrderRepository, UserRepository};
use orderdesk_db::{DbConfig, DbManager};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use surrealdb_types::SurrealValue;

async fn manager() -> DbManager<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    DbManager::from_client(db).await.unwrap()
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

#[tokio::test]
async fn manager_is_handed_out_migrated() {
    let db = manager().await;

    let mut result = db
        .client()
        .query("SELECT count() AS total FROM _migration GROUP ALL")
        .await
        .unwrap();
    let rows: Vec<CountRow> = result.take(0).unwrap();
    assert_eq!(rows.first().map(|r| r.total), Some(1));
}

#[tokio::test]
async fn wrapping_a_migrated_client_again_is_a_no_op() {
    let db = manager().await;
    let again = DbManager::from_client(db.client().clone()).await.unwrap();

    let mut result = again
        .client()
        .query("SELECT count() AS total FROM _migration GROUP ALL")
        .await
        .unwrap();
    let rows: Vec<CountRow> = result.take(0).unwrap();
    assert_eq!(rows.first().map(|r| r.total), Some(1));
}

#[tokio::test]
async fn repositories_share_the_managed_store() {
    let db = manager().await;

    let user = db
        .users()
        .create(CreateUser {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            password_hash: "$argon2id$not-a-real-hash".into(),
        })
        .await
        .unwrap();
    let order = db
        .orders()
        .create(CreateOrder {
            user_id: user.id,
            product_name: "Widget".into(),
            amount: 9.5,
        })
        .await
        .unwrap();

    let pending = db.orders().list_by_status(OrderStatus::Pending).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, order.id);
    let found = db.users().get_by_email("ann@x.com").await.unwrap();
    assert_eq!(found.id, user.id);
}

#[test]
fn default_config_points_at_local_store() {
    let config = DbConfig::default();
    assert_eq!(config.url, "127.0.0.1:8000");
    assert_eq!(config.namespace, "orderdesk");
}
