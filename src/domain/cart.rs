use std::fmt;

use bigdecimal::{BigDecimal, Signed, Zero};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FarmId(String);

impl FarmId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a product within its farm. Not unique across farms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identity used to merge cart additions: the same product id under two
/// different farms is two different products.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductKey {
    pub farm_id: FarmId,
    pub product_id: ProductId,
}

impl ProductKey {
    pub fn new(farm_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            farm_id: FarmId::new(farm_id),
            product_id: ProductId::new(product_id),
        }
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.farm_id, self.product_id)
    }
}

/// What the catalog hands over when a shopper picks a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRef {
    pub key: ProductKey,
    pub display_name: String,
    pub unit_price: BigDecimal,
}

impl ProductRef {
    pub fn new(
        key: ProductKey,
        display_name: impl Into<String>,
        unit_price: BigDecimal,
    ) -> Result<Self, DomainError> {
        if unit_price.is_negative() {
            return Err(DomainError::InvalidInput(format!(
                "unit price of {key} must not be negative, got {unit_price}"
            )));
        }
        Ok(Self {
            key,
            display_name: display_name.into(),
            unit_price,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub key: ProductKey,
    pub display_name: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

impl LineItem {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

/// The shopping cart of one session.
///
/// Holds at most one [`LineItem`] per [`ProductKey`]; repeated additions of
/// the same product accumulate into its quantity. Lines keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity_delta` units of `product`, merging into an existing line
    /// when the product is already in the cart.
    ///
    /// A non-positive delta, or one that would overflow the line quantity, is
    /// rejected and leaves the cart untouched.
    pub fn add_item(
        &mut self,
        product: ProductRef,
        quantity_delta: i32,
    ) -> Result<&LineItem, DomainError> {
        if quantity_delta <= 0 {
            return Err(DomainError::InvalidInput(format!(
                "quantity must be positive, got {quantity_delta}"
            )));
        }

        let index = match self.items.iter().position(|item| item.key == product.key) {
            Some(index) => {
                let item = &mut self.items[index];
                item.quantity = item.quantity.checked_add(quantity_delta).ok_or_else(|| {
                    DomainError::InvalidInput(format!(
                        "quantity of {} would exceed {}",
                        item.key,
                        i32::MAX
                    ))
                })?;
                index
            }
            None => {
                self.items.push(LineItem {
                    key: product.key,
                    display_name: product.display_name,
                    unit_price: product.unit_price,
                    quantity: quantity_delta,
                });
                self.items.len() - 1
            }
        };

        Ok(&self.items[index])
    }

    /// Sum of `unit_price * quantity` over every line.
    pub fn compute_total(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::zero(), |total, item| total + item.line_total())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.items
    }

    pub fn quantity_of(&self, key: &ProductKey) -> Option<i32> {
        self.items
            .iter()
            .find(|item| &item.key == key)
            .map(|item| item.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
