//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Order lookups that act on behalf
//! of a user take the owner's `user_id` so one account can never read or
//! mutate another account's orders.

use uuid::Uuid;

use crate::error::OrderDeskResult;
use crate::models::{
    order::{CreateOrder, Order, OrderFilter, OrderStatus},
    user::{CreateUser, User},
};

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the email is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = OrderDeskResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = OrderDeskResult<User>> + Send;
    /// Exact, case-sensitive match.
    fn get_by_email(&self, email: &str) -> impl Future<Output = OrderDeskResult<User>> + Send;
    /// Hard delete; the user's orders are removed with it.
    fn delete(&self, id: Uuid) -> impl Future<Output = OrderDeskResult<()>> + Send;
}

pub trait OrderRepository: Send + Sync {
    /// Inserts a new order in `pending` with both timestamps set to now.
    fn create(&self, input: CreateOrder) -> impl Future<Output = OrderDeskResult<Order>> + Send;

    /// Returns `None` both when the order does not exist and when it
    /// belongs to a different user.
    fn get_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = OrderDeskResult<Option<Order>>> + Send;

    /// A user's orders matching `filter`, most recent first.
    fn list_for_user(
        &self,
        user_id: Uuid,
        filter: OrderFilter,
    ) -> impl Future<Output = OrderDeskResult<Vec<Order>>> + Send;

    /// Every order currently in `status`, across all users, oldest first.
    fn list_by_status(
        &self,
        status: OrderStatus,
    ) -> impl Future<Output = OrderDeskResult<Vec<Order>>> + Send;

    /// Move `order` to `status` and bump `updated_at`.
    ///
    /// Fails with `InvalidTransition` if the lifecycle forbids the move,
    /// and with `StatusConflict` if the stored status no longer matches
    /// `order.status` (someone else transitioned it first).
    fn set_status(
        &self,
        order: &Order,
        status: OrderStatus,
    ) -> impl Future<Output = OrderDeskResult<Order>> + Send;
}
