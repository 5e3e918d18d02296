use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::cart::{Cart, LineItem, ProductKey};
use crate::domain::errors::{DomainError, SettlementError};
use crate::domain::ports::{FarmRepository, StockDecrementer};
use crate::domain::settlement::{place_order, OrderReceipt};

use super::sessions::{SessionHandle, SessionStore};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
}

/// Read-only view of a cart for display.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<LineItem>,
    pub total: BigDecimal,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().to_vec(),
            total: cart.compute_total(),
        }
    }
}

/// Shopper-facing operations: session lifecycle, cart mutation and checkout.
#[derive(Clone)]
pub struct ShopService {
    catalog: Arc<dyn FarmRepository>,
    stock: Arc<dyn StockDecrementer>,
    sessions: SessionStore,
    decrement_timeout: Duration,
}

impl ShopService {
    pub fn new(
        catalog: Arc<dyn FarmRepository>,
        stock: Arc<dyn StockDecrementer>,
        sessions: SessionStore,
        decrement_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            stock,
            sessions,
            decrement_timeout,
        }
    }

    /// Replace the session store with an empty one that expires sessions
    /// after `idle_timeout`.
    pub fn with_session_idle_timeout(self, idle_timeout: Duration) -> Self {
        Self {
            sessions: SessionStore::new(idle_timeout),
            ..self
        }
    }

    pub fn open_session(&self) -> Uuid {
        let id = self.sessions.create();
        log::debug!("session {} opened", id);
        id
    }

    pub fn close_session(&self, session_id: Uuid) -> Result<(), DomainError> {
        if !self.sessions.remove(session_id) {
            return Err(session_not_found(session_id));
        }
        log::debug!("session {} closed", session_id);
        Ok(())
    }

    /// Look `key` up in the catalog and add `quantity` units of it to the
    /// session's cart.
    pub async fn add_to_cart(
        &self,
        session_id: Uuid,
        key: ProductKey,
        quantity: i32,
    ) -> Result<CartView, DomainError> {
        let session = self.session(session_id)?;

        let catalog = Arc::clone(&self.catalog);
        let lookup_key = key.clone();
        let product = tokio::task::spawn_blocking(move || catalog.find_product(&lookup_key))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))??
            .ok_or_else(|| DomainError::NotFound(format!("product '{key}'")))?;

        let mut session = session.lock().await;
        session.cart.add_item(product, quantity)?;
        Ok(CartView::from(&session.cart))
    }

    pub async fn cart(&self, session_id: Uuid) -> Result<CartView, DomainError> {
        let session = self.session(session_id)?;
        let session = session.lock().await;
        Ok(CartView::from(&session.cart))
    }

    /// Empty the cart and abandon any partially settled checkout. Stock
    /// already decremented by that checkout is not restored.
    pub async fn clear_cart(&self, session_id: Uuid) -> Result<(), DomainError> {
        let session = self.session(session_id)?;
        let mut session = session.lock().await;
        if session.ledger.is_in_progress() {
            log::warn!(
                "session {}: abandoning partially settled order {:?}",
                session_id,
                session.ledger.order_id()
            );
        }
        session.cart.clear();
        session.ledger.reset();
        Ok(())
    }

    pub async fn checkout(&self, session_id: Uuid) -> Result<OrderReceipt, CheckoutError> {
        let session = self.session(session_id)?;
        let mut session = session.lock().await;
        let session = &mut *session;
        let receipt = place_order(
            &mut session.cart,
            &mut session.ledger,
            self.stock.as_ref(),
            self.decrement_timeout,
        )
        .await?;
        Ok(receipt)
    }

    fn session(&self, session_id: Uuid) -> Result<SessionHandle, DomainError> {
        self.sessions
            .get(session_id)
            .ok_or_else(|| session_not_found(session_id))
    }
}

fn session_not_found(session_id: Uuid) -> DomainError {
    DomainError::NotFound(format!("session '{session_id}'"))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::domain::catalog::{NewFarm, NewProduct};
    use crate::infrastructure::memory_catalog::InMemoryCatalog;

    fn product(name: &str, price: &str, amount: i32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            amount,
        }
    }

    /// A service over a catalog holding one farm with "Eggs" (2.50, 5 in
    /// stock) and "Honey" (1.00, 10 in stock).
    fn setup() -> (ShopService, Arc<InMemoryCatalog>, ProductKey, ProductKey) {
        let catalog = Arc::new(InMemoryCatalog::default());
        let farm = catalog
            .create_farm(NewFarm {
                name: "Sunny Acres".to_string(),
                description: String::new(),
                zip: "53140".to_string(),
                owner_id: "owner-1".to_string(),
                products: vec![product("Eggs", "2.50", 5), product("Honey", "1.00", 10)],
            })
            .expect("create farm");
        let eggs = ProductKey {
            farm_id: farm.id.clone(),
            product_id: farm.products[0].id.clone(),
        };
        let honey = ProductKey {
            farm_id: farm.id.clone(),
            product_id: farm.products[1].id.clone(),
        };
        let service = ShopService::new(
            catalog.clone(),
            catalog.clone(),
            SessionStore::default(),
            Duration::from_secs(5),
        );
        (service, catalog, eggs, honey)
    }

    fn stock_of(catalog: &InMemoryCatalog, key: &ProductKey) -> i32 {
        catalog
            .farm_with_products(&key.farm_id)
            .expect("load")
            .expect("farm exists")
            .products
            .into_iter()
            .find(|p| p.id == key.product_id)
            .expect("product exists")
            .amount
    }

    #[tokio::test]
    async fn add_to_cart_merges_and_totals() {
        let (service, _, eggs, honey) = setup();
        let session = service.open_session();

        service.add_to_cart(session, eggs.clone(), 1).await.expect("add");
        service.add_to_cart(session, eggs.clone(), 1).await.expect("add");
        let view = service.add_to_cart(session, honey, 3).await.expect("add");

        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[0].quantity, 2);
        assert_eq!(view.lines[0].display_name, "Eggs");
        assert_eq!(view.total, BigDecimal::from_str("8.00").expect("decimal"));
    }

    #[tokio::test]
    async fn unknown_product_or_session_is_not_found() {
        let (service, _, eggs, _) = setup();
        let session = service.open_session();

        let missing = ProductKey::new(eggs.farm_id.as_str(), "nope");
        assert!(matches!(
            service.add_to_cart(session, missing, 1).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            service.add_to_cart(Uuid::new_v4(), eggs, 1).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn checkout_decrements_stock_and_clears_cart() {
        let (service, catalog, eggs, honey) = setup();
        let session = service.open_session();
        service.add_to_cart(session, eggs.clone(), 2).await.expect("add");
        service.add_to_cart(session, honey.clone(), 3).await.expect("add");

        let receipt = service.checkout(session).await.expect("checkout");

        assert_eq!(receipt.total, BigDecimal::from_str("8.00").expect("decimal"));
        assert_eq!(stock_of(&catalog, &eggs), 3);
        assert_eq!(stock_of(&catalog, &honey), 7);
        assert!(service.cart(session).await.expect("cart").lines.is_empty());
    }

    #[tokio::test]
    async fn insufficient_stock_keeps_cart_and_reports_product() {
        let (service, catalog, eggs, honey) = setup();
        let session = service.open_session();
        service.add_to_cart(session, honey.clone(), 1).await.expect("add");
        service.add_to_cart(session, eggs.clone(), 6).await.expect("add");

        let err = service.checkout(session).await.expect_err("not enough eggs");

        assert!(matches!(err, CheckoutError::Settlement(SettlementError::Stock { .. })));
        assert_eq!(stock_of(&catalog, &honey), 9);
        assert_eq!(stock_of(&catalog, &eggs), 5);
        assert_eq!(service.cart(session).await.expect("cart").lines.len(), 2);
    }

    #[tokio::test]
    async fn checkout_of_empty_cart_fails() {
        let (service, _, _, _) = setup();
        let session = service.open_session();

        assert!(matches!(
            service.checkout(session).await,
            Err(CheckoutError::Settlement(SettlementError::EmptyCart))
        ));
    }

    #[tokio::test]
    async fn clear_and_close_session() {
        let (service, _, eggs, _) = setup();
        let session = service.open_session();
        service.add_to_cart(session, eggs, 1).await.expect("add");

        service.clear_cart(session).await.expect("clear");
        let view = service.cart(session).await.expect("cart");
        assert!(view.lines.is_empty());
        assert_eq!(view.total, BigDecimal::from(0));

        service.close_session(session).expect("close");
        assert!(matches!(
            service.close_session(session),
            Err(DomainError::NotFound(_))
        ));
    }
}
