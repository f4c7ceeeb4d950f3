use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderStatus};

/// One requested line item. Only the food id and count come from the
/// client; the unit price is resolved from the catalog at order time.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub food_id: i32,
    pub count: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order_id: i32,
}

/// Result of a cancel attempt. `canceled` is false for the no-op cases
/// (already terminal, outside the window); `status` is the row's status
/// after the attempt, which callers check instead of assuming success.
#[derive(Debug, Serialize, ToSchema)]
pub struct CancelOutcome {
    pub canceled: bool,
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
