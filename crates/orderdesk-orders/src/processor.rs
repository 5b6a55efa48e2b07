//! The work performed on an order between `processing` and `completed`.

use std::time::Duration;

use orderdesk_core::error::OrderDeskResult;
use orderdesk_core::models::order::Order;

/// Performs the processing step for a single order.
///
/// An error leaves the order in `processing`; the sweeper logs it and
/// moves on to the next order in the batch.
pub trait OrderProcessor: Send + Sync + 'static {
    fn process(&self, order: &Order) -> impl Future<Output = OrderDeskResult<()>> + Send;
}

/// Stand-in for real fulfilment: waits a fixed delay and succeeds.
#[derive(Debug, Clone)]
pub struct SimulatedProcessor {
    delay: Duration,
}

impl SimulatedProcessor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl OrderProcessor for SimulatedProcessor {
    async fn process(&self, order: &Order) -> OrderDeskResult<()> {
        tracing::debug!(order_id = %order.id, delay_ms = self.delay.as_millis() as u64, "processing order");
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}
