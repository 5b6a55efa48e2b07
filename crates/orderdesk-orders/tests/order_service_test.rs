//! Integration tests for order placement, listing and cancellation.

use orderdesk_core::error::{CancelRejection, ErrorCode, OrderDeskError};
use orderdesk_core::models::order::{OrderFilter, OrderStatus};
use orderdesk_core::models::user::{CreateUser, User};
use orderdesk_core::repository::{OrderRepository, UserRepository};
use orderdesk_db::{SurrealOrderRepository, SurrealUserRepository};
use orderdesk_orders::{CreateOrderInput, OrderService};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

struct Fixture {
    service: OrderService<SurrealOrderRepository<Db>>,
    orders: SurrealOrderRepository<Db>,
    ann: User,
    bob: User,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    orderdesk_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let mut created = Vec::new();
    for (name, email) in [("Ann", "ann@x.com"), ("Bob", "bob@x.com")] {
        created.push(
            users
                .create(CreateUser {
                    name: name.into(),
                    email: email.into(),
                    password_hash: "$argon2id$placeholder".into(),
                })
                .await
                .unwrap(),
        );
    }
    let bob = created.pop().unwrap();
    let ann = created.pop().unwrap();

    let orders = SurrealOrderRepository::new(db);
    Fixture {
        service: OrderService::new(orders.clone()),
        orders,
        ann,
        bob,
    }
}

fn widget(amount: f64) -> CreateOrderInput {
    CreateOrderInput {
        product_name: "Widget".into(),
        amount,
    }
}

#[tokio::test]
async fn create_then_list_pending() {
    let fx = setup().await;

    let order = fx.service.create_order(&fx.ann, widget(10.0)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.user_id, fx.ann.id);

    let pending = fx
        .service
        .list_orders(&fx.ann, OrderFilter::with_status(OrderStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, order.id);

    let bobs = fx
        .service
        .list_orders(&fx.bob, OrderFilter::default())
        .await
        .unwrap();
    assert!(bobs.is_empty());
}

#[tokio::test]
async fn invalid_input_is_rejected_before_the_store() {
    let fx = setup().await;

    for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let err = fx.service.create_order(&fx.ann, widget(amount)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Validation, "amount {amount}");
    }

    let err = fx
        .service
        .create_order(
            &fx.ann,
            CreateOrderInput {
                product_name: "   ".into(),
                amount: 3.0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, OrderDeskError::Validation { .. }));

    let all = fx
        .service
        .list_orders(&fx.ann, OrderFilter::default())
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn get_order_hides_other_users_orders() {
    let fx = setup().await;
    let order = fx.service.create_order(&fx.ann, widget(10.0)).await.unwrap();

    assert!(fx.service.get_order(&fx.ann, order.id).await.unwrap().is_some());
    assert!(fx.service.get_order(&fx.bob, order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn cancel_pending_order_once() {
    let fx = setup().await;
    let order = fx.service.create_order(&fx.ann, widget(10.0)).await.unwrap();

    let cancelled = fx.service.cancel_order(&fx.ann, order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(cancelled.updated_at >= order.updated_at);

    let err = fx.service.cancel_order(&fx.ann, order.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotCancellable);
    assert_eq!(
        err.cancel_rejection(),
        Some(CancelRejection::NotPending(OrderStatus::Cancelled))
    );
}

#[tokio::test]
async fn cancel_refused_past_pending() {
    let fx = setup().await;

    let processing = fx.service.create_order(&fx.ann, widget(10.0)).await.unwrap();
    let processing = fx
        .orders
        .set_status(&processing, OrderStatus::Processing)
        .await
        .unwrap();

    let completed = fx.service.create_order(&fx.ann, widget(12.0)).await.unwrap();
    let completed = fx
        .orders
        .set_status(&completed, OrderStatus::Processing)
        .await
        .unwrap();
    let completed = fx
        .orders
        .set_status(&completed, OrderStatus::Completed)
        .await
        .unwrap();

    for (order, status) in [
        (&processing, OrderStatus::Processing),
        (&completed, OrderStatus::Completed),
    ] {
        let err = fx.service.cancel_order(&fx.ann, order.id).await.unwrap_err();
        assert_eq!(
            err.cancel_rejection(),
            Some(CancelRejection::NotPending(status))
        );

        let stored = fx.service.get_order(&fx.ann, order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, status);
    }
}

#[tokio::test]
async fn cancel_of_foreign_or_missing_order_looks_the_same() {
    let fx = setup().await;
    let order = fx.service.create_order(&fx.ann, widget(10.0)).await.unwrap();

    let foreign = fx.service.cancel_order(&fx.bob, order.id).await.unwrap_err();
    let missing = fx
        .service
        .cancel_order(&fx.bob, Uuid::new_v4())
        .await
        .unwrap_err();

    assert_eq!(foreign.cancel_rejection(), Some(CancelRejection::NotFound));
    assert_eq!(missing.cancel_rejection(), Some(CancelRejection::NotFound));
    assert_eq!(foreign.to_string(), missing.to_string());

    let untouched = fx.service.get_order(&fx.ann, order.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, OrderStatus::Pending);
}

#[tokio::test]
async fn deleting_user_removes_their_orders() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    orderdesk_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let orders = SurrealOrderRepository::new(db);
    let service = OrderService::new(orders.clone());

    let ann = users
        .create(CreateUser {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            password_hash: "$argon2id$placeholder".into(),
        })
        .await
        .unwrap();
    service.create_order(&ann, widget(10.0)).await.unwrap();
    service.create_order(&ann, widget(20.0)).await.unwrap();

    users.delete(ann.id).await.unwrap();

    let pending = orders.list_by_status(OrderStatus::Pending).await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn product_name_is_stored_as_given() {
    let fx = setup().await;

    let order = fx
        .service
        .create_order(
            &fx.ann,
            CreateOrderInput {
                product_name: "  Deluxe Widget ".into(),
                amount: 4.5,
            },
        )
        .await
        .unwrap();
    assert_eq!(order.product_name, "  Deluxe Widget ");

    let stored = fx.service.get_order(&fx.ann, order.id).await.unwrap().unwrap();
    assert_eq!(stored.product_name, "  Deluxe Widget ");
}
