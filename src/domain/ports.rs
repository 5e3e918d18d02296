use async_trait::async_trait;

use super::cart::{FarmId, ProductId, ProductKey, ProductRef};
use super::catalog::{Farm, FarmUpdate, NewFarm, NewProduct, Product};
use super::errors::{DomainError, StockError};
use super::venue::{NewVenue, Venue, VenueId};

/// Farm and product listings, as maintained by farm owners.
pub trait FarmRepository: Send + Sync + 'static {
    fn create_farm(&self, farm: NewFarm) -> Result<Farm, DomainError>;
    fn farms_for_owner(&self, owner_id: &str) -> Result<Vec<Farm>, DomainError>;
    fn farms_by_zip(&self, zip: &str) -> Result<Vec<Farm>, DomainError>;
    fn farm_with_products(&self, farm_id: &FarmId) -> Result<Option<Farm>, DomainError>;
    fn update_farm(&self, farm_id: &FarmId, update: FarmUpdate) -> Result<(), DomainError>;
    fn add_product(&self, farm_id: &FarmId, product: NewProduct) -> Result<Product, DomainError>;
    fn update_product(
        &self,
        farm_id: &FarmId,
        product_id: &ProductId,
        product: NewProduct,
    ) -> Result<(), DomainError>;
    fn delete_product(&self, farm_id: &FarmId, product_id: &ProductId) -> Result<(), DomainError>;
    fn find_product(&self, key: &ProductKey) -> Result<Option<ProductRef>, DomainError>;
}

/// Market venues farms sell at.
pub trait VenueRepository: Send + Sync + 'static {
    fn create_venue(&self, venue: NewVenue) -> Result<Venue, DomainError>;
    fn venues_for_owner(&self, owner_id: &str) -> Result<Vec<Venue>, DomainError>;
    /// Every venue, ordered by name.
    fn venues(&self) -> Result<Vec<Venue>, DomainError>;
    fn venue_by_id(&self, venue_id: &VenueId) -> Result<Option<Venue>, DomainError>;
}

/// Reduces the recorded stock of a product after a purchase.
#[async_trait]
pub trait StockDecrementer: Send + Sync + 'static {
    async fn decrement_stock(&self, key: &ProductKey, quantity: i32) -> Result<(), StockError>;
}
