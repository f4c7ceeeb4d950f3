use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            ConfirmRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
            ResendCodeRequest, ResetPasswordRequest,
        },
        catalog::{CategoryList, FoodList},
        orders::{CancelOutcome, CreateOrderRequest, CreateOrderResponse, OrderItemInput, OrderList},
    },
    models::{Category, Food, Order, OrderDetail, OrderStatus},
    response::ApiResponse,
    routes::{auth, catalog, health, orders},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::resend_code,
        auth::confirm,
        auth::login,
        auth::logout,
        auth::forgot_password,
        auth::reset_password,
        catalog::list_categories,
        catalog::get_category,
        catalog::list_foods,
        orders::create_order,
        orders::list_active,
        orders::list_completed,
        orders::list_all,
        orders::cancel_order
    ),
    components(
        schemas(
            Category,
            Food,
            Order,
            OrderDetail,
            OrderStatus,
            RegisterRequest,
            ResendCodeRequest,
            ConfirmRequest,
            LoginRequest,
            LoginResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            OrderItemInput,
            CreateOrderRequest,
            CreateOrderResponse,
            CancelOutcome,
            OrderList,
            CategoryList,
            FoodList,
            ApiResponse<String>,
            ApiResponse<LoginResponse>,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<FoodList>,
            ApiResponse<OrderList>,
            ApiResponse<CreateOrderResponse>,
            ApiResponse<CancelOutcome>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, confirmation and session endpoints"),
        (name = "Catalog", description = "Category and food endpoints"),
        (name = "Orders", description = "Order placement and lifecycle endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
