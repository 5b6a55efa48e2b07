//! SurrealDB repository implementations.

mod order;
mod user;

pub use order::SurrealOrderRepository;
pub use user::SurrealUserRepository;
