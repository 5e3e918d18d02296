use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::cart::{FarmId, ProductId};
use crate::domain::catalog::{Farm, FarmUpdate, NewFarm, NewProduct, Product};
use crate::errors::AppError;
use crate::AppState;

use super::{format_money, parse_price};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal price as a string, e.g. "2.50"
    pub price: String,
    /// Units in stock
    pub amount: i32,
}

impl ProductRequest {
    fn into_new_product(self) -> Result<NewProduct, AppError> {
        Ok(NewProduct {
            price: parse_price(&self.price)?,
            name: self.name,
            description: self.description,
            amount: self.amount,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFarmRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub zip: String,
    /// Identity of the registering owner, as issued by the identity provider
    pub owner_id: String,
    #[serde(default)]
    pub products: Vec<ProductRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFarmRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub zip: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub amount: i32,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id.as_str().to_string(),
            price: format_money(&p.price),
            name: p.name,
            description: p.description,
            amount: p.amount,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FarmResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub zip: String,
    pub owner_id: String,
    pub products: Vec<ProductResponse>,
}

impl From<Farm> for FarmResponse {
    fn from(f: Farm) -> Self {
        Self {
            id: f.id.as_str().to_string(),
            name: f.name,
            description: f.description,
            zip: f.zip,
            owner_id: f.owner_id,
            products: f.products.into_iter().map(ProductResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FarmsByZipParams {
    pub zip: String,
}

fn farm_list(farms: Vec<Farm>) -> Vec<FarmResponse> {
    farms.into_iter().map(FarmResponse::from).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /farms
///
/// Registers a farm together with its initial products.
#[utoipa::path(
    post,
    path = "/farms",
    request_body = CreateFarmRequest,
    responses(
        (status = 201, description = "Farm registered", body = FarmResponse),
        (status = 400, description = "Invalid farm or product data"),
    ),
    tag = "farms"
)]
pub async fn create_farm(
    state: web::Data<AppState>,
    body: web::Json<CreateFarmRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let farm = NewFarm {
        name: body.name,
        description: body.description,
        zip: body.zip,
        owner_id: body.owner_id,
        products: body
            .products
            .into_iter()
            .map(ProductRequest::into_new_product)
            .collect::<Result<_, _>>()?,
    };

    let catalog = state.catalog.clone();
    let farm = web::block(move || catalog.register_farm(farm))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(FarmResponse::from(farm)))
}

/// GET /farms?zip=
///
/// Lists the farms registered under a ZIP code, without their products.
#[utoipa::path(
    get,
    path = "/farms",
    params(
        ("zip" = String, Query, description = "ZIP code to search"),
    ),
    responses(
        (status = 200, description = "Farms in the ZIP code", body = [FarmResponse]),
    ),
    tag = "farms"
)]
pub async fn list_farms_by_zip(
    state: web::Data<AppState>,
    query: web::Query<FarmsByZipParams>,
) -> Result<HttpResponse, AppError> {
    let zip = query.into_inner().zip;
    let catalog = state.catalog.clone();
    let farms = web::block(move || catalog.farms_by_zip(&zip))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(farm_list(farms)))
}

/// GET /farms/{farm_id}
///
/// Returns the farm together with all of its products.
#[utoipa::path(
    get,
    path = "/farms/{farm_id}",
    params(
        ("farm_id" = String, Path, description = "Farm id"),
    ),
    responses(
        (status = 200, description = "Farm found", body = FarmResponse),
        (status = 404, description = "Farm not found"),
    ),
    tag = "farms"
)]
pub async fn get_farm(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let farm_id = FarmId::new(path.into_inner());
    let catalog = state.catalog.clone();
    let farm = web::block(move || catalog.get_farm(&farm_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(FarmResponse::from(farm)))
}

/// PUT /farms/{farm_id}
#[utoipa::path(
    put,
    path = "/farms/{farm_id}",
    params(
        ("farm_id" = String, Path, description = "Farm id"),
    ),
    request_body = UpdateFarmRequest,
    responses(
        (status = 204, description = "Farm updated"),
        (status = 400, description = "Invalid farm data"),
        (status = 404, description = "Farm not found"),
    ),
    tag = "farms"
)]
pub async fn update_farm(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateFarmRequest>,
) -> Result<HttpResponse, AppError> {
    let farm_id = FarmId::new(path.into_inner());
    let body = body.into_inner();
    let update = FarmUpdate {
        name: body.name,
        description: body.description,
        zip: body.zip,
    };

    let catalog = state.catalog.clone();
    web::block(move || catalog.update_farm(&farm_id, update))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /owners/{owner_id}/farms
///
/// Lists the farms an owner manages, without their products.
#[utoipa::path(
    get,
    path = "/owners/{owner_id}/farms",
    params(
        ("owner_id" = String, Path, description = "Owner identity"),
    ),
    responses(
        (status = 200, description = "Farms of the owner", body = [FarmResponse]),
    ),
    tag = "farms"
)]
pub async fn list_owner_farms(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let owner_id = path.into_inner();
    let catalog = state.catalog.clone();
    let farms = web::block(move || catalog.farms_for_owner(&owner_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(farm_list(farms)))
}

/// POST /farms/{farm_id}/products
#[utoipa::path(
    post,
    path = "/farms/{farm_id}/products",
    params(
        ("farm_id" = String, Path, description = "Farm id"),
    ),
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product listed", body = ProductResponse),
        (status = 400, description = "Invalid product data"),
        (status = 404, description = "Farm not found"),
    ),
    tag = "farms"
)]
pub async fn add_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let farm_id = FarmId::new(path.into_inner());
    let product = body.into_inner().into_new_product()?;

    let catalog = state.catalog.clone();
    let product = web::block(move || catalog.add_product(&farm_id, product))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// PUT /farms/{farm_id}/products/{product_id}
#[utoipa::path(
    put,
    path = "/farms/{farm_id}/products/{product_id}",
    params(
        ("farm_id" = String, Path, description = "Farm id"),
        ("product_id" = String, Path, description = "Product id"),
    ),
    request_body = ProductRequest,
    responses(
        (status = 204, description = "Product updated"),
        (status = 400, description = "Invalid product data"),
        (status = 404, description = "Product not found"),
    ),
    tag = "farms"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let (farm_id, product_id) = path.into_inner();
    let (farm_id, product_id) = (FarmId::new(farm_id), ProductId::new(product_id));
    let product = body.into_inner().into_new_product()?;

    let catalog = state.catalog.clone();
    web::block(move || catalog.update_product(&farm_id, &product_id, product))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /farms/{farm_id}/products/{product_id}
#[utoipa::path(
    delete,
    path = "/farms/{farm_id}/products/{product_id}",
    params(
        ("farm_id" = String, Path, description = "Farm id"),
        ("product_id" = String, Path, description = "Product id"),
    ),
    responses(
        (status = 204, description = "Product removed"),
        (status = 404, description = "Product not found"),
    ),
    tag = "farms"
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (farm_id, product_id) = path.into_inner();
    let (farm_id, product_id) = (FarmId::new(farm_id), ProductId::new(product_id));

    let catalog = state.catalog.clone();
    web::block(move || catalog.delete_product(&farm_id, &product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
