use std::time::Duration;

use thiserror::Error;

use super::cart::ProductKey;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure reported by the stock collaborator for a single product.
#[derive(Debug, Error)]
pub enum StockError {
    #[error("only {available} left in stock, {requested} requested")]
    Insufficient { available: i32, requested: i32 },
    #[error("product is no longer listed")]
    UnknownProduct,
    #[error("catalog backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("cannot place an order for an empty cart")]
    EmptyCart,
    #[error("could not update stock for {key}: {source}")]
    Stock {
        key: ProductKey,
        #[source]
        source: StockError,
    },
    #[error("stock update for {key} did not complete within {timeout:?}")]
    Timeout { key: ProductKey, timeout: Duration },
}
