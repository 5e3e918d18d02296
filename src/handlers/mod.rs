pub mod farms;
pub mod sessions;
pub mod venues;

use actix_web::web;
use bigdecimal::{BigDecimal, RoundingMode};
use std::str::FromStr;
use utoipa::OpenApi;

use crate::errors::AppError;

#[derive(OpenApi)]
#[openapi(
    paths(
        farms::create_farm,
        farms::list_farms_by_zip,
        farms::get_farm,
        farms::update_farm,
        farms::list_owner_farms,
        farms::add_product,
        farms::update_product,
        farms::delete_product,
        sessions::open_session,
        sessions::close_session,
        sessions::get_cart,
        sessions::add_cart_item,
        sessions::clear_cart,
        sessions::checkout,
        venues::create_venue,
        venues::list_venues,
        venues::get_venue,
        venues::list_owner_venues,
    ),
    tags(
        (name = "farms", description = "Farm and product listings"),
        (name = "sessions", description = "Shopping sessions, carts and checkout"),
        (name = "venues", description = "Markets where farms sell"),
    )
)]
pub struct ApiDoc;

/// Register every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/farms")
            .service(
                web::resource("")
                    .route(web::post().to(farms::create_farm))
                    .route(web::get().to(farms::list_farms_by_zip)),
            )
            .service(
                web::resource("/{farm_id}")
                    .route(web::get().to(farms::get_farm))
                    .route(web::put().to(farms::update_farm)),
            )
            .route("/{farm_id}/products", web::post().to(farms::add_product))
            .service(
                web::resource("/{farm_id}/products/{product_id}")
                    .route(web::put().to(farms::update_product))
                    .route(web::delete().to(farms::delete_product)),
            ),
    )
    .route(
        "/owners/{owner_id}/farms",
        web::get().to(farms::list_owner_farms),
    )
    .service(
        web::scope("/venues")
            .service(
                web::resource("")
                    .route(web::post().to(venues::create_venue))
                    .route(web::get().to(venues::list_venues)),
            )
            .route("/{venue_id}", web::get().to(venues::get_venue)),
    )
    .route(
        "/owners/{owner_id}/venues",
        web::get().to(venues::list_owner_venues),
    )
    .service(
        web::scope("/sessions")
            .route("", web::post().to(sessions::open_session))
            .route("/{session_id}", web::delete().to(sessions::close_session))
            .service(
                web::resource("/{session_id}/cart")
                    .route(web::get().to(sessions::get_cart))
                    .route(web::delete().to(sessions::clear_cart)),
            )
            .route(
                "/{session_id}/cart/items",
                web::post().to(sessions::add_cart_item),
            )
            .route("/{session_id}/checkout", web::post().to(sessions::checkout)),
    );
}

/// Prices travel as decimal strings to avoid floating-point issues.
fn parse_price(value: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(value.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid price '{}': {}", value, e)))
}

/// Render an amount of money with two decimal places, half-cents rounded up.
fn format_money(value: &BigDecimal) -> String {
    value.with_scale_round(2, RoundingMode::HalfUp).to_string()
}
