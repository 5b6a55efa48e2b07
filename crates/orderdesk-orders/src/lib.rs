//! OrderDesk Orders — user-facing order operations and the background
//! sweeper that drives pending orders through the lifecycle.

pub mod processor;
pub mod service;
pub mod sweeper;

pub use processor::{OrderProcessor, SimulatedProcessor};
pub use service::{CreateOrderInput, OrderService};
pub use sweeper::{SweepOutcome, SweepReport, Sweeper, SweeperConfig, SweeperHandle};
