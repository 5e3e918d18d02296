use std::sync::Arc;

use crate::domain::cart::{FarmId, ProductId};
use crate::domain::catalog::{Farm, FarmUpdate, NewFarm, NewProduct, Product};
use crate::domain::errors::DomainError;
use crate::domain::ports::FarmRepository;

/// Listing management for farm owners. Inputs are normalized before they
/// reach the repository.
#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn FarmRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn FarmRepository>) -> Self {
        Self { repo }
    }

    pub fn register_farm(&self, farm: NewFarm) -> Result<Farm, DomainError> {
        let farm = self.repo.create_farm(farm.normalized()?)?;
        log::info!(
            "farm {} registered by {} with {} product(s)",
            farm.id,
            farm.owner_id,
            farm.products.len()
        );
        Ok(farm)
    }

    pub fn farms_for_owner(&self, owner_id: &str) -> Result<Vec<Farm>, DomainError> {
        self.repo.farms_for_owner(owner_id.trim())
    }

    pub fn farms_by_zip(&self, zip: &str) -> Result<Vec<Farm>, DomainError> {
        self.repo.farms_by_zip(zip.trim())
    }

    pub fn get_farm(&self, farm_id: &FarmId) -> Result<Farm, DomainError> {
        self.repo
            .farm_with_products(farm_id)?
            .ok_or_else(|| DomainError::NotFound(format!("farm '{farm_id}'")))
    }

    pub fn update_farm(&self, farm_id: &FarmId, update: FarmUpdate) -> Result<(), DomainError> {
        self.repo.update_farm(farm_id, update.normalized()?)
    }

    pub fn add_product(
        &self,
        farm_id: &FarmId,
        product: NewProduct,
    ) -> Result<Product, DomainError> {
        self.repo.add_product(farm_id, product.normalized()?)
    }

    pub fn update_product(
        &self,
        farm_id: &FarmId,
        product_id: &ProductId,
        product: NewProduct,
    ) -> Result<(), DomainError> {
        self.repo
            .update_product(farm_id, product_id, product.normalized()?)
    }

    pub fn delete_product(
        &self,
        farm_id: &FarmId,
        product_id: &ProductId,
    ) -> Result<(), DomainError> {
        self.repo.delete_product(farm_id, product_id)
    }
}
