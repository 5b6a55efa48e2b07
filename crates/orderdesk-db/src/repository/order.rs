//! SurrealDB implementation of [`OrderRepository`].
//!
//! Status changes are compare-and-set on the status the caller last read,
//! so two writers racing on the same order cannot both succeed.

use chrono::{DateTime, Utc};
use orderdesk_core::error::{OrderDeskError, OrderDeskResult};
use orderdesk_core::models::order::{CreateOrder, Order, OrderFilter, OrderStatus};
use orderdesk_core::repository::OrderRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OrderRow {
    user_id: String,
    product_name: String,
    amount: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct OrderRowWithId {
    record_id: String,
    user_id: String,
    product_name: String,
    amount: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<OrderStatus, DbError> {
    s.parse::<OrderStatus>()
        .map_err(|e| DbError::Decode(e.to_string()))
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

impl OrderRow {
    fn into_order(self, id: Uuid) -> Result<Order, DbError> {
        Ok(Order {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            product_name: self.product_name,
            amount: self.amount,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl OrderRowWithId {
    fn try_into_order(self) -> Result<Order, DbError> {
        Ok(Order {
            id: parse_uuid(&self.record_id, "order")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            product_name: self.product_name,
            amount: self.amount,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn collect_orders(rows: Vec<OrderRowWithId>) -> Result<Vec<Order>, DbError> {
    rows.into_iter().map(OrderRowWithId::try_into_order).collect()
}

/// SurrealDB implementation of the Order repository.
#[derive(Clone)]
pub struct SurrealOrderRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrderRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrderRepository for SurrealOrderRepository<C> {
    async fn create(&self, input: CreateOrder) -> OrderDeskResult<Order> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('orders', $id) SET \
                 user_id = $user_id, \
                 product_name = $product_name, \
                 amount = $amount, \
                 status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("product_name", input.product_name))
            .bind(("amount", input.amount))
            .bind(("status", OrderStatus::Pending.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("order", e))?;

        let rows: Vec<OrderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "order".into(),
            id: id_str,
        })?;

        Ok(row.into_order(id)?)
    }

    async fn get_by_id(&self, user_id: Uuid, id: Uuid) -> OrderDeskResult<Option<Order>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('orders', $id) \
                 WHERE user_id = $user_id",
            )
            .bind(("id", id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrderRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_order(id)?)),
            None => Ok(None),
        }
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        filter: OrderFilter,
    ) -> OrderDeskResult<Vec<Order>> {
        let mut conditions = vec!["user_id = $user_id"];
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.start_date.is_some() {
            conditions.push("created_at >= $start_date");
        }
        if filter.end_date.is_some() {
            conditions.push("created_at <= $end_date");
        }

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM orders \
             WHERE {} \
             ORDER BY created_at DESC",
            conditions.join(" AND ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("user_id", user_id.to_string()));

        if let Some(status) = filter.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(start_date) = filter.start_date {
            builder = builder.bind(("start_date", start_date));
        }
        if let Some(end_date) = filter.end_date {
            builder = builder.bind(("end_date", end_date));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<OrderRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(collect_orders(rows)?)
    }

    async fn list_by_status(&self, status: OrderStatus) -> OrderDeskResult<Vec<Order>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM orders \
                 WHERE status = $status \
                 ORDER BY created_at ASC",
            )
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrderRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(collect_orders(rows)?)
    }

    async fn set_status(&self, order: &Order, status: OrderStatus) -> OrderDeskResult<Order> {
        if !order.status.can_transition_to(status) {
            return Err(OrderDeskError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }

        let result = self
            .db
            .query(
                "UPDATE type::record('orders', $id) SET \
                 status = $status, updated_at = time::now() \
                 WHERE status = $expected",
            )
            .bind(("id", order.id.to_string()))
            .bind(("status", status.as_str().to_string()))
            .bind(("expected", order.status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("order", e))?;

        let rows: Vec<OrderRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(row.into_order(order.id)?),
            None => Err(OrderDeskError::StatusConflict {
                id: order.id,
                expected: order.status,
            }),
        }
    }
}
