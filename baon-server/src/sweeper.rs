//! Payment timeout sweeper
//!
//! Recurring background task that cancels cash orders whose payment
//! window elapsed. Each tick queries the awaiting-payment index and runs
//! the engine's conditional expiry per order, so a sweep racing a
//! payment confirmation (or another sweep) simply finds nothing to do.
//! Individual order failures are logged and retried on the next tick;
//! one stuck order never blocks the rest of the sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::engine::OrderEngine;

pub struct PaymentSweeper {
    engine: Arc<OrderEngine>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl PaymentSweeper {
    pub fn new(engine: Arc<OrderEngine>, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            engine,
            interval,
            shutdown,
        }
    }

    /// Main loop: sweep every `interval` until shutdown.
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Payment sweeper started");
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Payment sweeper received shutdown signal");
                    return;
                }
            }
            self.sweep();
        }
    }

    /// One sweep pass. Returns how many orders were cancelled.
    pub fn sweep(&self) -> usize {
        let expired = match self.engine.expired_awaiting() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, "Failed to query awaiting-payment index");
                return 0;
            }
        };

        let mut swept = 0;
        for order_id in expired {
            match self.engine.expire_payment(&order_id) {
                Ok(Some(_)) => {
                    swept += 1;
                }
                Ok(None) => {
                    // resolved between the index read and the expiry; fine
                    tracing::debug!(order_id, "Order already resolved, skipping");
                }
                Err(e) => {
                    tracing::warn!(order_id, error = %e, "Expiry failed, retrying next sweep");
                }
            }
        }

        if swept > 0 {
            tracing::info!(swept, "Payment sweep cancelled expired orders");
        }
        swept
    }
}
