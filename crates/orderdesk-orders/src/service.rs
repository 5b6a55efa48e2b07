//! Order operations performed on behalf of an authenticated user.

use orderdesk_core::error::{CancelRejection, OrderDeskError, OrderDeskResult};
use orderdesk_core::models::order::{CreateOrder, Order, OrderFilter, OrderStatus};
use orderdesk_core::models::user::User;
use orderdesk_core::repository::OrderRepository;
use tracing::{debug, info};
use uuid::Uuid;

/// Input for placing an order.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub product_name: String,
    pub amount: f64,
}

/// Create, list and cancel orders.
///
/// Every operation is scoped to the calling user: another user's order
/// behaves exactly like one that does not exist.
pub struct OrderService<O: OrderRepository> {
    order_repo: O,
}

impl<O: OrderRepository> OrderService<O> {
    pub fn new(order_repo: O) -> Self {
        Self { order_repo }
    }

    /// Place a new order in `pending`.
    pub async fn create_order(&self, user: &User, input: CreateOrderInput) -> OrderDeskResult<Order> {
        if input.product_name.trim().is_empty() {
            return Err(OrderDeskError::validation("product name must not be empty"));
        }
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(OrderDeskError::validation("amount must be greater than zero"));
        }

        let order = self
            .order_repo
            .create(CreateOrder {
                user_id: user.id,
                product_name: input.product_name,
                amount: input.amount,
            })
            .await?;

        info!(order_id = %order.id, user_id = %user.id, amount = order.amount, "order created");
        Ok(order)
    }

    /// The user's orders matching `filter`, most recent first.
    pub async fn list_orders(&self, user: &User, filter: OrderFilter) -> OrderDeskResult<Vec<Order>> {
        self.order_repo.list_for_user(user.id, filter).await
    }

    pub async fn get_order(&self, user: &User, order_id: Uuid) -> OrderDeskResult<Option<Order>> {
        self.order_repo.get_by_id(user.id, order_id).await
    }

    /// Cancel a pending order.
    ///
    /// A missing order, another user's order and an order that is past
    /// `pending` are all refused with the same `NotCancellable` error.
    pub async fn cancel_order(&self, user: &User, order_id: Uuid) -> OrderDeskResult<Order> {
        let order = self
            .order_repo
            .get_by_id(user.id, order_id)
            .await?
            .ok_or(OrderDeskError::NotCancellable(CancelRejection::NotFound))?;

        if order.status != OrderStatus::Pending {
            debug!(order_id = %order.id, status = %order.status, "cancel refused");
            return Err(OrderDeskError::NotCancellable(CancelRejection::NotPending(
                order.status,
            )));
        }

        match self.order_repo.set_status(&order, OrderStatus::Cancelled).await {
            Ok(cancelled) => {
                info!(order_id = %cancelled.id, user_id = %user.id, "order cancelled");
                Ok(cancelled)
            }
            // The sweeper picked the order up between our read and write.
            Err(OrderDeskError::StatusConflict { .. }) => {
                let rejection = match self.order_repo.get_by_id(user.id, order_id).await? {
                    Some(current) => CancelRejection::NotPending(current.status),
                    None => CancelRejection::NotFound,
                };
                debug!(order_id = %order_id, ?rejection, "cancel lost race");
                Err(OrderDeskError::NotCancellable(rejection))
            }
            Err(e) => Err(e),
        }
    }
}
