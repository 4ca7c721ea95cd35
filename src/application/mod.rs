pub mod order_service;
pub mod promotion_service;

use std::sync::Arc;

use crate::domain::ports::{CatalogLookup, OrderRepository, PromotionRepository};

pub use order_service::OrderService;
pub use promotion_service::PromotionService;

/// Services over trait objects, as shared with the HTTP handlers.
pub type DynOrderService = OrderService<Arc<dyn OrderRepository>, Arc<dyn CatalogLookup>>;
pub type DynPromotionService =
    PromotionService<Arc<dyn PromotionRepository>, Arc<dyn OrderRepository>>;
