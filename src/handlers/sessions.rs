use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::shop_service::CartView;
use crate::domain::cart::{LineItem, ProductKey};
use crate::domain::settlement::OrderReceipt;
use crate::errors::AppError;
use crate::AppState;

use super::format_money;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub farm_id: String,
    pub product_id: String,
    /// Units to add. Defaults to 1, must be positive.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LineItemResponse {
    pub farm_id: String,
    pub product_id: String,
    pub display_name: String,
    pub unit_price: String,
    pub quantity: i32,
    pub line_total: String,
}

impl From<LineItem> for LineItemResponse {
    fn from(item: LineItem) -> Self {
        Self {
            line_total: format_money(&item.line_total()),
            unit_price: format_money(&item.unit_price),
            farm_id: item.key.farm_id.as_str().to_string(),
            product_id: item.key.product_id.as_str().to_string(),
            display_name: item.display_name,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub lines: Vec<LineItemResponse>,
    pub total: String,
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        Self {
            total: format_money(&view.total),
            lines: view.lines.into_iter().map(LineItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderReceiptResponse {
    pub order_id: Uuid,
    pub lines: Vec<LineItemResponse>,
    pub total: String,
    pub placed_at: String,
}

impl From<OrderReceipt> for OrderReceiptResponse {
    fn from(receipt: OrderReceipt) -> Self {
        Self {
            order_id: receipt.order_id,
            total: format_money(&receipt.total),
            placed_at: receipt.placed_at.to_rfc3339(),
            lines: receipt
                .lines
                .into_iter()
                .map(LineItemResponse::from)
                .collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /sessions
///
/// Opens a shopping session with an empty cart.
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session opened", body = SessionResponse),
    ),
    tag = "sessions"
)]
pub async fn open_session(state: web::Data<AppState>) -> HttpResponse {
    let id = state.shop.open_session();
    HttpResponse::Created().json(SessionResponse { id })
}

/// DELETE /sessions/{session_id}
#[utoipa::path(
    delete,
    path = "/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Session not found"),
    ),
    tag = "sessions"
)]
pub async fn close_session(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.shop.close_session(path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /sessions/{session_id}/cart
#[utoipa::path(
    get,
    path = "/sessions/{session_id}/cart",
    params(
        ("session_id" = Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 200, description = "Current cart", body = CartResponse),
        (status = 404, description = "Session not found"),
    ),
    tag = "sessions"
)]
pub async fn get_cart(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let view = state.shop.cart(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CartResponse::from(view)))
}

/// POST /sessions/{session_id}/cart/items
///
/// Adds a product to the cart. Adding a product already in the cart
/// increases its quantity instead of creating a second line.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/cart/items",
    params(
        ("session_id" = Uuid, Path, description = "Session UUID"),
    ),
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Quantity is not positive"),
        (status = 404, description = "Session or product not found"),
    ),
    tag = "sessions"
)]
pub async fn add_cart_item(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let key = ProductKey::new(body.farm_id, body.product_id);
    let view = state
        .shop
        .add_to_cart(path.into_inner(), key, body.quantity)
        .await?;
    Ok(HttpResponse::Ok().json(CartResponse::from(view)))
}

/// DELETE /sessions/{session_id}/cart
#[utoipa::path(
    delete,
    path = "/sessions/{session_id}/cart",
    params(
        ("session_id" = Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 204, description = "Cart emptied"),
        (status = 404, description = "Session not found"),
    ),
    tag = "sessions"
)]
pub async fn clear_cart(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.shop.clear_cart(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /sessions/{session_id}/checkout
///
/// Decrements stock for every cart line in order and empties the cart once
/// all of them succeed. On failure the cart is kept; retrying only settles
/// what the previous attempt did not.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/checkout",
    params(
        ("session_id" = Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 201, description = "Order placed", body = OrderReceiptResponse),
        (status = 400, description = "Cart is empty"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "A product is out of stock or no longer listed"),
        (status = 502, description = "Catalog backend failed"),
        (status = 504, description = "Catalog backend did not answer in time"),
    ),
    tag = "sessions"
)]
pub async fn checkout(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let receipt = state.shop.checkout(path.into_inner()).await?;
    Ok(HttpResponse::Created().json(OrderReceiptResponse::from(receipt)))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::{test, App};
    use async_trait::async_trait;
    use bigdecimal::BigDecimal;
    use serde_json::{json, Value};

    use super::*;
    use crate::application::catalog_service::CatalogService;
    use crate::application::sessions::SessionStore;
    use crate::application::shop_service::ShopService;
    use crate::application::venue_service::VenueService;
    use crate::domain::catalog::{Farm, NewFarm, NewProduct};
    use crate::domain::errors::StockError;
    use crate::domain::ports::StockDecrementer;
    use crate::handlers::configure;
    use crate::infrastructure::memory_catalog::InMemoryCatalog;

    fn seed(catalog: &CatalogService) -> Farm {
        let product = |name: &str, price: &str, amount: i32| NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            amount,
        };
        catalog
            .register_farm(NewFarm {
                name: "Sunny Acres".to_string(),
                description: String::new(),
                zip: "53140".to_string(),
                owner_id: "owner-1".to_string(),
                products: vec![
                    product("Eggs", "2.50", 10),
                    product("Honey", "1.00", 10),
                    product("Kale", "3.00", 10),
                ],
            })
            .expect("seed farm")
    }

    fn item(farm: &Farm, index: usize, quantity: i32) -> Value {
        json!({
            "farm_id": farm.id.as_str(),
            "product_id": farm.products[index].id.as_str(),
            "quantity": quantity,
        })
    }

    /// Accepts every decrement except those for one product.
    struct RejectingStock {
        inner: Arc<InMemoryCatalog>,
        rejected: String,
    }

    #[async_trait]
    impl StockDecrementer for RejectingStock {
        async fn decrement_stock(&self, key: &ProductKey, quantity: i32) -> Result<(), StockError> {
            if key.product_id.as_str() == self.rejected {
                return Err(StockError::Backend("write rejected".to_string()));
            }
            self.inner.decrement_stock(key, quantity).await
        }
    }

    #[actix_web::test]
    async fn add_merge_and_checkout() {
        let state = AppState::in_memory(Duration::from_secs(5));
        let farm = seed(&state.catalog);
        let catalog = state.catalog.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/sessions").to_request();
        let session: Value = test::call_and_read_body_json(&app, req).await;
        let session_id = session["id"].as_str().expect("id").to_string();

        for body in [item(&farm, 0, 1), item(&farm, 0, 1), item(&farm, 1, 3)] {
            let req = test::TestRequest::post()
                .uri(&format!("/sessions/{}/cart/items", session_id))
                .set_json(body)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 200);
        }

        let req = test::TestRequest::get()
            .uri(&format!("/sessions/{}/cart", session_id))
            .to_request();
        let cart: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(cart["lines"].as_array().map(Vec::len), Some(2));
        assert_eq!(cart["lines"][0]["quantity"], 2);
        assert_eq!(cart["lines"][0]["line_total"], "5.00");
        assert_eq!(cart["total"], "8.00");

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/checkout", session_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let receipt: Value = test::read_body_json(resp).await;
        assert_eq!(receipt["total"], "8.00");

        let req = test::TestRequest::get()
            .uri(&format!("/sessions/{}/cart", session_id))
            .to_request();
        let cart: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(cart["lines"], json!([]));
        assert_eq!(cart["total"], "0.00");

        let stock = catalog.get_farm(&farm.id).expect("farm");
        assert_eq!(stock.products[0].amount, 8);
        assert_eq!(stock.products[1].amount, 7);

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/checkout", session_id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn failed_checkout_reports_product_and_keeps_cart() {
        let repo = Arc::new(InMemoryCatalog::default());
        let catalog = CatalogService::new(repo.clone());
        let farm = seed(&catalog);

        // The stock collaborator rejects the second product.
        let failing_state = AppState {
            catalog: catalog.clone(),
            venues: VenueService::new(repo.clone()),
            shop: ShopService::new(
                repo.clone(),
                Arc::new(RejectingStock {
                    inner: repo.clone(),
                    rejected: farm.products[1].id.as_str().to_string(),
                }),
                SessionStore::default(),
                Duration::from_secs(5),
            ),
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(failing_state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/sessions").to_request();
        let session: Value = test::call_and_read_body_json(&app, req).await;
        let session_id = session["id"].as_str().expect("id").to_string();
        for body in [item(&farm, 0, 1), item(&farm, 1, 1), item(&farm, 2, 1)] {
            let req = test::TestRequest::post()
                .uri(&format!("/sessions/{}/cart/items", session_id))
                .set_json(body)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 200);
        }

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/checkout", session_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 502);
        let body: Value = test::read_body_json(resp).await;
        let message = body["error"].as_str().expect("error message");
        assert!(message.contains(farm.products[1].id.as_str()));

        let stock = catalog.get_farm(&farm.id).expect("farm");
        assert_eq!(stock.products[0].amount, 9);
        assert_eq!(stock.products[1].amount, 10);
        assert_eq!(stock.products[2].amount, 10);

        let req = test::TestRequest::get()
            .uri(&format!("/sessions/{}/cart", session_id))
            .to_request();
        let cart: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(cart["lines"].as_array().map(Vec::len), Some(3));
    }

    #[actix_web::test]
    async fn invalid_requests() {
        let state = AppState::in_memory(Duration::from_secs(5));
        let farm = seed(&state.catalog);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post().uri("/sessions").to_request();
        let session: Value = test::call_and_read_body_json(&app, req).await;
        let session_id = session["id"].as_str().expect("id").to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/cart/items", session_id))
            .set_json(item(&farm, 0, 0))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/cart/items", session_id))
            .set_json(json!({ "farm_id": "other-farm", "product_id": farm.products[0].id.as_str() }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);

        let req = test::TestRequest::get()
            .uri(&format!("/sessions/{}/cart", Uuid::new_v4()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);

        let req = test::TestRequest::delete()
            .uri(&format!("/sessions/{}", session_id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 204);
    }
}
