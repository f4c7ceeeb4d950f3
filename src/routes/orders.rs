use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};

use crate::{
    dto::orders::{CancelOutcome, CreateOrderRequest, CreateOrderResponse, OrderList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::OrderStatusFilter,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/active", get(list_active))
        .route("/completed", get(list_completed))
        .route("/all", get(list_all))
        .route("/{order_id}", put(cancel_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = ApiResponse<CreateOrderResponse>),
        (status = 400, description = "Empty item list or non-positive count"),
        (status = 404, description = "Unknown food item")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<CreateOrderResponse>>> {
    let order_id = order_service::create_order(&state.pool, user.user_id, &payload.items).await?;
    Ok(Json(ApiResponse::success(
        "Order created",
        CreateOrderResponse { order_id },
    )))
}

#[utoipa::path(
    get,
    path = "/api/orders/active",
    responses((status = 200, description = "Active orders", body = ApiResponse<OrderList>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_active(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    list_by_filter(&state, &user, OrderStatusFilter::Active).await
}

#[utoipa::path(
    get,
    path = "/api/orders/completed",
    responses((status = 200, description = "Completed orders", body = ApiResponse<OrderList>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_completed(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    list_by_filter(&state, &user, OrderStatusFilter::Completed).await
}

#[utoipa::path(
    get,
    path = "/api/orders/all",
    responses((status = 200, description = "All orders, canceled included", body = ApiResponse<OrderList>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    list_by_filter(&state, &user, OrderStatusFilter::All).await
}

async fn list_by_filter(
    state: &AppState,
    user: &AuthUser,
    filter: OrderStatusFilter,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let items = order_service::list_orders_by_status(&state.pool, user.user_id, filter).await?;
    Ok(Json(ApiResponse::success("Ok", OrderList { items })))
}

#[utoipa::path(
    put,
    path = "/api/orders/{order_id}",
    params(("order_id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Cancel outcome; check `canceled` and `status`", body = ApiResponse<CancelOutcome>),
        (status = 401, description = "Order belongs to another user"),
        (status = 404, description = "No such order")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<i32>,
) -> AppResult<Json<ApiResponse<CancelOutcome>>> {
    let outcome = order_service::cancel_order(
        &state.pool,
        user.user_id,
        order_id,
        state.config.cancel_window_mins,
    )
    .await?;

    let message = if outcome.canceled {
        "Order canceled"
    } else {
        "Order not canceled"
    };
    Ok(Json(ApiResponse::success(message, outcome)))
}
