use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub is_logged_in: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Food {
    pub id: i32,
    pub name: String,
    pub category_id: Option<i32>,
    pub img_url: Option<String>,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub count_food: i32,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderDetail {
    pub id: i32,
    pub order_id: i32,
    pub food_id: i32,
    pub count: i32,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ConfirmationCode {
    pub id: i32,
    pub user_id: i32,
    pub code: i32,
    pub is_passed: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Order lifecycle vocabulary. `Completed` and `Canceled` are terminal;
/// the only defined transitions are `active -> completed` (sweeper) and
/// `active -> canceled` (owner, inside the cancel window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Active,
    Completed,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Active => "active",
            OrderStatus::Completed => "completed",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OrderStatus::Active),
            "completed" => Ok(OrderStatus::Completed),
            "canceled" => Ok(OrderStatus::Canceled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Listing filter: the two visible statuses plus `All`, which also
/// includes canceled orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatusFilter {
    Active,
    Completed,
    All,
}
