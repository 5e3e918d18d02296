use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::cart::{FarmId, ProductId};
use crate::domain::catalog::{Farm, Product};
use crate::domain::venue::{Venue, VenueId};
use crate::schema::{farms, products, venues};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = farms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FarmRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub zip: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FarmRow {
    pub fn into_farm(self, products: Vec<Product>) -> Farm {
        Farm {
            id: FarmId::new(self.id),
            name: self.name,
            description: self.description,
            zip: self.zip,
            owner_id: self.owner_id,
            products,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = farms)]
pub struct NewFarmRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub zip: String,
    pub owner_id: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = products)]
#[diesel(belongs_to(FarmRow, foreign_key = farm_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: String,
    pub farm_id: String,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub amount: i32,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            amount: row.amount,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: String,
    pub farm_id: String,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub amount: i32,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub amount: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = venues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VenueRow {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<VenueRow> for Venue {
    fn from(row: VenueRow) -> Self {
        Venue {
            id: VenueId::new(row.id),
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            owner_id: row.owner_id,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = venues)]
pub struct NewVenueRow {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: String,
}
