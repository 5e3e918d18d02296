use bigdecimal::{BigDecimal, Signed};

use super::cart::{FarmId, ProductId, ProductKey, ProductRef};
use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    /// Units currently in stock.
    pub amount: i32,
}

impl Product {
    pub fn to_product_ref(&self, farm_id: &FarmId) -> Result<ProductRef, DomainError> {
        ProductRef::new(
            ProductKey {
                farm_id: farm_id.clone(),
                product_id: self.id.clone(),
            },
            self.name.clone(),
            self.price.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
    pub description: String,
    pub zip: String,
    pub owner_id: String,
    /// Empty in listing queries; filled when a single farm is loaded.
    pub products: Vec<Product>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub amount: i32,
}

impl NewProduct {
    pub fn normalized(self) -> Result<Self, DomainError> {
        let name = required("product name", &self.name)?;
        let price = checked_price(&name, &self.price)?;
        if self.amount < 0 {
            return Err(DomainError::InvalidInput(format!(
                "stock amount of '{name}' must not be negative"
            )));
        }
        Ok(Self {
            name,
            description: self.description.trim().to_string(),
            price,
            amount: self.amount,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewFarm {
    pub name: String,
    pub description: String,
    pub zip: String,
    pub owner_id: String,
    pub products: Vec<NewProduct>,
}

impl NewFarm {
    pub fn normalized(self) -> Result<Self, DomainError> {
        Ok(Self {
            name: required("farm name", &self.name)?,
            description: self.description.trim().to_string(),
            zip: required("zip", &self.zip)?,
            owner_id: required("owner id", &self.owner_id)?,
            products: self
                .products
                .into_iter()
                .map(NewProduct::normalized)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FarmUpdate {
    pub name: String,
    pub description: String,
    pub zip: String,
}

impl FarmUpdate {
    pub fn normalized(self) -> Result<Self, DomainError> {
        Ok(Self {
            name: required("farm name", &self.name)?,
            description: self.description.trim().to_string(),
            zip: required("zip", &self.zip)?,
        })
    }
}

/// Prices are whole cents below ten billion, which is what the
/// `NUMERIC(12, 2)` price column holds.
const PRICE_SCALE: i64 = 2;
const PRICE_INTEGER_DIGITS: u32 = 10;

fn checked_price(name: &str, price: &BigDecimal) -> Result<BigDecimal, DomainError> {
    if price.is_negative() {
        return Err(DomainError::InvalidInput(format!(
            "price of '{name}' must not be negative"
        )));
    }
    let (_, scale) = price.normalized().as_bigint_and_exponent();
    if scale > PRICE_SCALE {
        return Err(DomainError::InvalidInput(format!(
            "price of '{name}' must not have more than {PRICE_SCALE} decimal places"
        )));
    }
    if *price >= BigDecimal::from(10u64.pow(PRICE_INTEGER_DIGITS)) {
        return Err(DomainError::InvalidInput(format!(
            "price of '{name}' must have at most {PRICE_INTEGER_DIGITS} integer digits"
        )));
    }
    Ok(price.with_scale(PRICE_SCALE))
}

fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
