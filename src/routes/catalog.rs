use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::catalog::{CategoryList, FoodList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{id}", get(get_category))
        .route("/{id}/foods", get(list_foods))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "All categories", body = ApiResponse<CategoryList>)),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let items = catalog_service::list_categories(&state.pool).await?;
    Ok(Json(ApiResponse::success("Categories", CategoryList { items })))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = ApiResponse<Category>),
        (status = 404, description = "No such category")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn get_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let category = catalog_service::get_category(&state.pool, id).await?;
    Ok(Json(ApiResponse::success("Category", category)))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/foods",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Foods in the category", body = ApiResponse<FoodList>),
        (status = 404, description = "No such category")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_foods(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<FoodList>>> {
    let items = catalog_service::list_foods_by_category(&state.pool, id).await?;
    Ok(Json(ApiResponse::success("Foods", FoodList { items })))
}
