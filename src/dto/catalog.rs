use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Category, Food};

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FoodList {
    pub items: Vec<Food>,
}
