//! Layered order flow used to exercise tracing across boundaries.
//!
//! Handler, service, and repository each wrap their own operation through
//! an interceptor handle; none of the layers knows whether it runs inside
//! an enclosing frame.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use weft::{Interceptor, Tracer};

/// Failure raised by the simulated data-access layer.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// The repository refused the item.
    #[error("item rejected: {0}")]
    Rejected(String),
}

/// Simulated data-access layer.
pub struct OrderRepository {
    intercept: Interceptor,
    latency: Duration,
    fail_item: String,
}

impl OrderRepository {
    pub fn new(intercept: Interceptor, latency: Duration, fail_item: impl Into<String>) -> Self {
        Self {
            intercept,
            latency,
            fail_item: fail_item.into(),
        }
    }

    /// Persist the order, taking the configured latency to do so.
    pub async fn save(&self, item_id: &str) -> Result<(), OrderError> {
        self.intercept
            .wrap_future("OrderRepository::save", async {
                tokio::time::sleep(self.latency).await;
                if item_id == self.fail_item {
                    return Err(OrderError::Rejected(item_id.to_string()));
                }
                Ok(())
            })
            .await
    }
}

/// Business layer.
pub struct OrderService {
    repository: OrderRepository,
    intercept: Interceptor,
}

impl OrderService {
    pub fn new(repository: OrderRepository, intercept: Interceptor) -> Self {
        Self {
            repository,
            intercept,
        }
    }

    pub async fn order_item(&self, item_id: &str) -> Result<(), OrderError> {
        self.intercept
            .wrap_future("OrderService::order_item", self.repository.save(item_id))
            .await
    }
}

/// Inbound boundary layer.
pub struct OrderHandler {
    service: OrderService,
    intercept: Interceptor,
}

impl OrderHandler {
    pub fn new(service: OrderService, intercept: Interceptor) -> Self {
        Self { service, intercept }
    }

    pub async fn request(&self, item_id: &str) -> Result<String, OrderError> {
        self.intercept
            .wrap_future("OrderHandler::request", async {
                self.service.order_item(item_id).await?;
                Ok(format!("ordered {}", item_id))
            })
            .await
    }
}

/// Wire the three layers around one tracer.
pub fn build_handler(tracer: Arc<Tracer>, latency: Duration, fail_item: &str) -> OrderHandler {
    let intercept = Interceptor::new(tracer);
    let repository = OrderRepository::new(intercept.clone(), latency, fail_item);
    let service = OrderService::new(repository, intercept.clone());
    OrderHandler::new(service, intercept)
}
