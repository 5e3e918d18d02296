use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{FarmId, ProductId, ProductKey, ProductRef};
use crate::domain::catalog::{Farm, FarmUpdate, NewFarm, NewProduct, Product};
use crate::domain::errors::{DomainError, StockError};
use crate::domain::ports::{FarmRepository, StockDecrementer, VenueRepository};
use crate::domain::venue::{NewVenue, Venue, VenueId};
use crate::schema::{farms, products, venues};

use super::models::{
    FarmRow, NewFarmRow, NewProductRow, NewVenueRow, ProductChangeset, ProductRow, VenueRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<diesel::result::Error> for StockError {
    fn from(e: diesel::result::Error) -> Self {
        StockError::Backend(e.to_string())
    }
}

impl From<r2d2::Error> for StockError {
    fn from(e: r2d2::Error) -> Self {
        StockError::Backend(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselFarmRepository {
    pool: DbPool,
}

impl DieselFarmRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn product_row(farm_id: &FarmId, product: NewProduct) -> NewProductRow {
    NewProductRow {
        id: new_id(),
        farm_id: farm_id.as_str().to_string(),
        name: product.name,
        description: product.description,
        price: product.price,
        amount: product.amount,
    }
}

fn farm_not_found(farm_id: &FarmId) -> DomainError {
    DomainError::NotFound(format!("farm '{farm_id}'"))
}

fn product_not_found(farm_id: &FarmId, product_id: &ProductId) -> DomainError {
    DomainError::NotFound(format!("product '{farm_id}/{product_id}'"))
}

impl FarmRepository for DieselFarmRepository {
    fn create_farm(&self, farm: NewFarm) -> Result<Farm, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let farm_id = FarmId::new(new_id());
            let row: FarmRow = diesel::insert_into(farms::table)
                .values(&NewFarmRow {
                    id: farm_id.as_str().to_string(),
                    name: farm.name,
                    description: farm.description,
                    zip: farm.zip,
                    owner_id: farm.owner_id,
                })
                .returning(FarmRow::as_returning())
                .get_result(conn)?;

            let new_products: Vec<NewProductRow> = farm
                .products
                .into_iter()
                .map(|p| product_row(&farm_id, p))
                .collect();
            let inserted: Vec<ProductRow> = if new_products.is_empty() {
                vec![]
            } else {
                diesel::insert_into(products::table)
                    .values(&new_products)
                    .returning(ProductRow::as_returning())
                    .get_results(conn)?
            };

            Ok(row.into_farm(inserted.into_iter().map(Product::from).collect()))
        })
    }

    fn farms_for_owner(&self, owner_id: &str) -> Result<Vec<Farm>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = farms::table
            .filter(farms::owner_id.eq(owner_id))
            .select(FarmRow::as_select())
            .order(farms::created_at.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(|r| r.into_farm(vec![])).collect())
    }

    fn farms_by_zip(&self, zip: &str) -> Result<Vec<Farm>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = farms::table
            .filter(farms::zip.eq(zip))
            .select(FarmRow::as_select())
            .order(farms::name.asc())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(|r| r.into_farm(vec![])).collect())
    }

    fn farm_with_products(&self, farm_id: &FarmId) -> Result<Option<Farm>, DomainError> {
        let mut conn = self.pool.get()?;

        let farm = farms::table
            .find(farm_id.as_str())
            .select(FarmRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(farm) = farm else {
            return Ok(None);
        };

        let products = ProductRow::belonging_to(&farm)
            .select(ProductRow::as_select())
            .order(products::position.asc())
            .load(&mut conn)?;

        Ok(Some(
            farm.into_farm(products.into_iter().map(Product::from).collect()),
        ))
    }

    fn update_farm(&self, farm_id: &FarmId, update: FarmUpdate) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(farms::table.find(farm_id.as_str()))
            .set((
                farms::name.eq(update.name),
                farms::description.eq(update.description),
                farms::zip.eq(update.zip),
                farms::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(farm_not_found(farm_id));
        }
        Ok(())
    }

    fn add_product(&self, farm_id: &FarmId, product: NewProduct) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let farm_exists: i64 = farms::table
                .filter(farms::id.eq(farm_id.as_str()))
                .count()
                .get_result(conn)?;
            if farm_exists == 0 {
                return Err(farm_not_found(farm_id));
            }

            let row: ProductRow = diesel::insert_into(products::table)
                .values(&product_row(farm_id, product))
                .returning(ProductRow::as_returning())
                .get_result(conn)?;
            Ok(Product::from(row))
        })
    }

    fn update_product(
        &self,
        farm_id: &FarmId,
        product_id: &ProductId,
        product: NewProduct,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            products::table
                .filter(products::id.eq(product_id.as_str()))
                .filter(products::farm_id.eq(farm_id.as_str())),
        )
        .set(&ProductChangeset {
            name: product.name,
            description: product.description,
            price: product.price,
            amount: product.amount,
        })
        .execute(&mut conn)?;

        if updated == 0 {
            return Err(product_not_found(farm_id, product_id));
        }
        Ok(())
    }

    fn delete_product(&self, farm_id: &FarmId, product_id: &ProductId) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(
            products::table
                .filter(products::id.eq(product_id.as_str()))
                .filter(products::farm_id.eq(farm_id.as_str())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(product_not_found(farm_id, product_id));
        }
        Ok(())
    }

    fn find_product(&self, key: &ProductKey) -> Result<Option<ProductRef>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .filter(products::id.eq(key.product_id.as_str()))
            .filter(products::farm_id.eq(key.farm_id.as_str()))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(|r| Product::from(r).to_product_ref(&key.farm_id))
            .transpose()
    }
}

// ── Venues ────────────────────────────────────────────────────────────────────

impl VenueRepository for DieselFarmRepository {
    fn create_venue(&self, venue: NewVenue) -> Result<Venue, DomainError> {
        let mut conn = self.pool.get()?;

        let row: VenueRow = diesel::insert_into(venues::table)
            .values(&NewVenueRow {
                id: new_id(),
                name: venue.name,
                latitude: venue.latitude,
                longitude: venue.longitude,
                owner_id: venue.owner_id,
            })
            .returning(VenueRow::as_returning())
            .get_result(&mut conn)?;

        Ok(Venue::from(row))
    }

    fn venues_for_owner(&self, owner_id: &str) -> Result<Vec<Venue>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = venues::table
            .filter(venues::owner_id.eq(owner_id))
            .select(VenueRow::as_select())
            .order((venues::created_at.asc(), venues::id.asc()))
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Venue::from).collect())
    }

    fn venues(&self) -> Result<Vec<Venue>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = venues::table
            .select(VenueRow::as_select())
            .order((venues::name.asc(), venues::id.asc()))
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Venue::from).collect())
    }

    fn venue_by_id(&self, venue_id: &VenueId) -> Result<Option<Venue>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = venues::table
            .find(venue_id.as_str())
            .select(VenueRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Venue::from))
    }
}

// ── Stock ─────────────────────────────────────────────────────────────────────

impl DieselFarmRepository {
    /// Single guarded UPDATE so concurrent checkouts can never drive the
    /// amount below zero.
    fn take_stock(&self, key: &ProductKey, quantity: i32) -> Result<(), StockError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, StockError, _>(|conn| {
            let target = products::table
                .filter(products::id.eq(key.product_id.as_str()))
                .filter(products::farm_id.eq(key.farm_id.as_str()));

            let updated = diesel::update(target.clone().filter(products::amount.ge(quantity)))
                .set(products::amount.eq(products::amount - quantity))
                .execute(conn)?;
            if updated == 1 {
                return Ok(());
            }

            let available: Option<i32> = target
                .select(products::amount)
                .first(conn)
                .optional()?;
            Err(match available {
                Some(available) => StockError::Insufficient {
                    available,
                    requested: quantity,
                },
                None => StockError::UnknownProduct,
            })
        })
    }
}

#[async_trait]
impl StockDecrementer for DieselFarmRepository {
    async fn decrement_stock(&self, key: &ProductKey, quantity: i32) -> Result<(), StockError> {
        let repo = self.clone();
        let key = key.clone();
        tokio::task::spawn_blocking(move || repo.take_stock(&key, quantity))
            .await
            .map_err(|e| StockError::Backend(e.to_string()))?
    }
}
