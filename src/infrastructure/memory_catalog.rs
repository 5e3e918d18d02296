use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::cart::{FarmId, ProductId, ProductKey, ProductRef};
use crate::domain::catalog::{Farm, FarmUpdate, NewFarm, NewProduct, Product};
use crate::domain::errors::{DomainError, StockError};
use crate::domain::ports::{FarmRepository, StockDecrementer, VenueRepository};
use crate::domain::venue::{NewVenue, Venue, VenueId};

/// Process-local catalog. Serves deployments without a database and tests.
/// Farms and venues are kept in registration order.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    farms: RwLock<Vec<Farm>>,
    venues: RwLock<Vec<Venue>>,
}

fn product_from(product: NewProduct) -> Product {
    Product {
        id: ProductId::new(Uuid::new_v4().to_string()),
        name: product.name,
        description: product.description,
        price: product.price,
        amount: product.amount,
    }
}

fn listing(farm: &Farm) -> Farm {
    Farm {
        products: vec![],
        ..farm.clone()
    }
}

fn farm_not_found(farm_id: &FarmId) -> DomainError {
    DomainError::NotFound(format!("farm '{farm_id}'"))
}

fn product_not_found(farm_id: &FarmId, product_id: &ProductId) -> DomainError {
    DomainError::NotFound(format!("product '{farm_id}/{product_id}'"))
}

impl InMemoryCatalog {
    fn with_farm<T>(
        &self,
        farm_id: &FarmId,
        f: impl FnOnce(&mut Farm) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut farms = self.farms.write();
        let farm = farms
            .iter_mut()
            .find(|farm| &farm.id == farm_id)
            .ok_or_else(|| farm_not_found(farm_id))?;
        f(farm)
    }

    fn take_stock(&self, key: &ProductKey, quantity: i32) -> Result<(), StockError> {
        let mut farms = self.farms.write();
        let product = farms
            .iter_mut()
            .find(|farm| farm.id == key.farm_id)
            .and_then(|farm| farm.products.iter_mut().find(|p| p.id == key.product_id))
            .ok_or(StockError::UnknownProduct)?;

        if product.amount < quantity {
            return Err(StockError::Insufficient {
                available: product.amount,
                requested: quantity,
            });
        }
        product.amount -= quantity;
        Ok(())
    }
}

impl FarmRepository for InMemoryCatalog {
    fn create_farm(&self, farm: NewFarm) -> Result<Farm, DomainError> {
        let farm = Farm {
            id: FarmId::new(Uuid::new_v4().to_string()),
            name: farm.name,
            description: farm.description,
            zip: farm.zip,
            owner_id: farm.owner_id,
            products: farm.products.into_iter().map(product_from).collect(),
        };
        self.farms.write().push(farm.clone());
        Ok(farm)
    }

    fn farms_for_owner(&self, owner_id: &str) -> Result<Vec<Farm>, DomainError> {
        Ok(self
            .farms
            .read()
            .iter()
            .filter(|farm| farm.owner_id == owner_id)
            .map(listing)
            .collect())
    }

    fn farms_by_zip(&self, zip: &str) -> Result<Vec<Farm>, DomainError> {
        let mut farms: Vec<Farm> = self
            .farms
            .read()
            .iter()
            .filter(|farm| farm.zip == zip)
            .map(listing)
            .collect();
        farms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(farms)
    }

    fn farm_with_products(&self, farm_id: &FarmId) -> Result<Option<Farm>, DomainError> {
        Ok(self
            .farms
            .read()
            .iter()
            .find(|farm| &farm.id == farm_id)
            .cloned())
    }

    fn update_farm(&self, farm_id: &FarmId, update: FarmUpdate) -> Result<(), DomainError> {
        self.with_farm(farm_id, |farm| {
            farm.name = update.name;
            farm.description = update.description;
            farm.zip = update.zip;
            Ok(())
        })
    }

    fn add_product(&self, farm_id: &FarmId, product: NewProduct) -> Result<Product, DomainError> {
        self.with_farm(farm_id, |farm| {
            let product = product_from(product);
            farm.products.push(product.clone());
            Ok(product)
        })
    }

    fn update_product(
        &self,
        farm_id: &FarmId,
        product_id: &ProductId,
        product: NewProduct,
    ) -> Result<(), DomainError> {
        self.with_farm(farm_id, |farm| {
            let existing = farm
                .products
                .iter_mut()
                .find(|p| &p.id == product_id)
                .ok_or_else(|| product_not_found(farm_id, product_id))?;
            existing.name = product.name;
            existing.description = product.description;
            existing.price = product.price;
            existing.amount = product.amount;
            Ok(())
        })
        .map_err(|e| match e {
            DomainError::NotFound(_) => product_not_found(farm_id, product_id),
            other => other,
        })
    }

    fn delete_product(&self, farm_id: &FarmId, product_id: &ProductId) -> Result<(), DomainError> {
        self.with_farm(farm_id, |farm| {
            let before = farm.products.len();
            farm.products.retain(|p| &p.id != product_id);
            if farm.products.len() == before {
                return Err(product_not_found(farm_id, product_id));
            }
            Ok(())
        })
        .map_err(|e| match e {
            DomainError::NotFound(_) => product_not_found(farm_id, product_id),
            other => other,
        })
    }

    fn find_product(&self, key: &ProductKey) -> Result<Option<ProductRef>, DomainError> {
        let farms = self.farms.read();
        farms
            .iter()
            .find(|farm| farm.id == key.farm_id)
            .and_then(|farm| farm.products.iter().find(|p| p.id == key.product_id))
            .map(|product| product.to_product_ref(&key.farm_id))
            .transpose()
    }
}

impl VenueRepository for InMemoryCatalog {
    fn create_venue(&self, venue: NewVenue) -> Result<Venue, DomainError> {
        let venue = Venue {
            id: VenueId::new(Uuid::new_v4().to_string()),
            name: venue.name,
            latitude: venue.latitude,
            longitude: venue.longitude,
            owner_id: venue.owner_id,
        };
        self.venues.write().push(venue.clone());
        Ok(venue)
    }

    fn venues_for_owner(&self, owner_id: &str) -> Result<Vec<Venue>, DomainError> {
        Ok(self
            .venues
            .read()
            .iter()
            .filter(|venue| venue.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn venues(&self) -> Result<Vec<Venue>, DomainError> {
        let mut venues = self.venues.read().clone();
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }

    fn venue_by_id(&self, venue_id: &VenueId) -> Result<Option<Venue>, DomainError> {
        Ok(self
            .venues
            .read()
            .iter()
            .find(|venue| &venue.id == venue_id)
            .cloned())
    }
}

#[async_trait]
impl StockDecrementer for InMemoryCatalog {
    async fn decrement_stock(&self, key: &ProductKey, quantity: i32) -> Result<(), StockError> {
        self.take_stock(key, quantity)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;

    fn product(name: &str, amount: i32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: BigDecimal::from_str("1.00").expect("valid decimal"),
            amount,
        }
    }

    fn seeded() -> (InMemoryCatalog, Farm) {
        let catalog = InMemoryCatalog::default();
        let farm = catalog
            .create_farm(NewFarm {
                name: "Sunny Acres".to_string(),
                description: String::new(),
                zip: "53140".to_string(),
                owner_id: "owner-1".to_string(),
                products: vec![product("Eggs", 3)],
            })
            .expect("create");
        (catalog, farm)
    }

    #[test]
    fn listings_omit_products() {
        let (catalog, _) = seeded();

        let by_zip = catalog.farms_by_zip("53140").expect("list");
        assert_eq!(by_zip.len(), 1);
        assert!(by_zip[0].products.is_empty());
        assert_eq!(catalog.farms_for_owner("owner-1").expect("list").len(), 1);
        assert!(catalog.farms_for_owner("owner-2").expect("list").is_empty());
    }

    #[test]
    fn product_crud() {
        let (catalog, farm) = seeded();
        let kale = catalog.add_product(&farm.id, product("Kale", 8)).expect("add");

        catalog
            .update_product(&farm.id, &kale.id, product("Curly Kale", 6))
            .expect("update");
        catalog
            .delete_product(&farm.id, &farm.products[0].id)
            .expect("delete");

        let loaded = catalog
            .farm_with_products(&farm.id)
            .expect("load")
            .expect("exists");
        assert_eq!(loaded.products.len(), 1);
        assert_eq!(loaded.products[0].name, "Curly Kale");
        assert_eq!(loaded.products[0].amount, 6);
    }

    #[test]
    fn missing_product_is_not_found() {
        let (catalog, farm) = seeded();
        let missing = ProductId::new("missing");

        let err = catalog
            .delete_product(&farm.id, &missing)
            .expect_err("missing");
        assert_eq!(err.to_string(), format!("product '{}/missing' not found", farm.id));
        assert!(catalog
            .update_farm(&FarmId::new("missing"), FarmUpdate {
                name: "x".to_string(),
                description: String::new(),
                zip: "1".to_string(),
            })
            .is_err());
    }

    #[tokio::test]
    async fn stock_never_goes_negative() {
        let (catalog, farm) = seeded();
        let eggs = ProductKey {
            farm_id: farm.id.clone(),
            product_id: farm.products[0].id.clone(),
        };

        catalog.decrement_stock(&eggs, 2).await.expect("decrement");
        assert!(matches!(
            catalog.decrement_stock(&eggs, 2).await,
            Err(StockError::Insufficient {
                available: 1,
                requested: 2
            })
        ));
        assert!(matches!(
            catalog
                .decrement_stock(&ProductKey::new(farm.id.as_str(), "missing"), 1)
                .await,
            Err(StockError::UnknownProduct)
        ));
    }

    #[test]
    fn venues_by_name_owner_and_id() {
        let catalog = InMemoryCatalog::default();
        let venue = |name: &str, owner_id: &str| NewVenue {
            name: name.to_string(),
            latitude: 43.0,
            longitude: -89.0,
            owner_id: owner_id.to_string(),
        };
        let west = catalog
            .create_venue(venue("West Allis Market", "owner-1"))
            .expect("create");
        catalog
            .create_venue(venue("Brookfield Market", "owner-2"))
            .expect("create");

        let all = catalog.venues().expect("list");
        assert_eq!(all[0].name, "Brookfield Market");
        assert_eq!(all[1].name, "West Allis Market");
        assert_eq!(catalog.venues_for_owner("owner-1").expect("list"), vec![west.clone()]);
        assert_eq!(catalog.venue_by_id(&west.id).expect("load"), Some(west));
        assert!(catalog
            .venue_by_id(&VenueId::new("missing"))
            .expect("load")
            .is_none());
    }
}
