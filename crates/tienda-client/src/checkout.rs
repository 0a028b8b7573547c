//! # Checkout
//!
//! Turns the cart into a submitted order.
//!
//! ## Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         place_order                                     │
//! │                                                                         │
//! │  cart empty? ──yes──► Err(EmptyCart)                                   │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  validate_contact ──invalid──► Err(InvalidContact[every bad field])    │
//! │       │ ok                                                              │
//! │       ▼                                                                 │
//! │  OrderRequest::from_lines ──► POST /api/pedidos (with retries)         │
//! │       │                              │                                  │
//! │       │ ok                           └─ failure ──► Err(kind), cart    │
//! │       ▼                                             left untouched     │
//! │  cart.clear()  ──►  OrderReceipt                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{info, warn};

use tienda_core::validation::validate_contact;
use tienda_core::{CartStore, CoreError, CustomerContact, OrderReceipt, OrderRequest, Storage};

use crate::api::StorefrontApi;
use crate::error::ClientResult;
use crate::transport::HttpTransport;

/// Validates, submits and, on success, empties the cart.
pub async fn place_order<T, S>(
    api: &StorefrontApi<T>,
    cart: &mut CartStore<S>,
    contact: &CustomerContact,
) -> ClientResult<OrderReceipt>
where
    T: HttpTransport,
    S: Storage,
{
    if cart.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let contact = validate_contact(contact)?;
    let order = OrderRequest::from_lines(cart.lines(), &contact);

    let receipt = api.submit_order(&order).await?;
    cart.clear();

    if receipt.email_sent == Some(false) {
        warn!(order_id = receipt.id, "Order placed but the confirmation email was not sent");
    }
    info!(order_id = receipt.id, total = %order.total, "Checkout complete");

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, FetchError};
    use crate::fetcher::{ResilientFetcher, RetryPolicy};
    use crate::testing::{ScriptedTransport, Step};
    use std::sync::Arc;
    use std::time::Duration;
    use tienda_core::{MemoryStorage, Money, Product, CART_STORAGE_KEY};

    fn api(steps: Vec<Step>) -> StorefrontApi<Arc<ScriptedTransport>> {
        let policy =
            RetryPolicy::new(1, Duration::from_millis(10), Duration::from_millis(500)).unwrap();
        let fetcher = ResilientFetcher::new(Arc::new(ScriptedTransport::new(steps)), policy);
        StorefrontApi::new("http://shop.test", fetcher).unwrap()
    }

    fn contact() -> CustomerContact {
        CustomerContact::new(
            "Ana García",
            "ana@example.com",
            "600 111 222",
            "Calle Mayor 1, Madrid",
        )
    }

    fn filled_cart() -> (Arc<MemoryStorage>, CartStore<Arc<MemoryStorage>>) {
        let storage = Arc::new(MemoryStorage::new());
        let mut cart = CartStore::load(storage.clone());
        cart.add(
            &Product::new(1, "Tomate", Money::from_cents(250), "kg", "verdura"),
            2,
        );
        (storage, cart)
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_order_clears_cart() {
        let api = api(vec![Step::respond(200, r#"{"id": 9, "email_enviado": false}"#)]);
        let (storage, mut cart) = filled_cart();

        let receipt = place_order(&api, &mut cart, &contact()).await.unwrap();

        assert_eq!(receipt.id, 9);
        assert!(cart.is_empty());
        assert_eq!(storage.get(CART_STORAGE_KEY).as_deref(), Some("[]"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_cart_is_rejected_without_request() {
        let api = api(vec![Step::respond(200, r#"{"id": 1}"#)]);
        let storage = MemoryStorage::new();
        let mut cart = CartStore::load(&storage);

        let err = place_order(&api, &mut cart, &contact()).await.unwrap_err();

        assert!(matches!(err, ClientError::Core(CoreError::EmptyCart)));
        assert_eq!(api.fetcher().transport().attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_contact_is_rejected_without_request() {
        let api = api(vec![Step::respond(200, r#"{"id": 1}"#)]);
        let (_, mut cart) = filled_cart();
        let mut bad = contact();
        bad.email = "ana".to_string();

        let err = place_order(&api, &mut cart, &bad).await.unwrap_err();

        assert!(matches!(err, ClientError::Core(CoreError::InvalidContact(_))));
        assert_eq!(api.fetcher().transport().attempts(), 0);
        assert_eq!(cart.item_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_submission_keeps_cart() {
        let api = api(vec![Step::respond(400, r#"{"error": "datos"}"#)]);
        let (_, mut cart) = filled_cart();

        let err = place_order(&api, &mut cart, &contact()).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Fetch(FetchError::Http { status: 400, .. })
        ));
        assert!(err.user_message().contains("not valid"));
        assert_eq!(cart.item_count(), 2);
        assert_eq!(api.fetcher().transport().attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submitted_contact_is_trimmed() {
        let api = api(vec![Step::respond(200, r#"{"id": 3}"#)]);
        let (_, mut cart) = filled_cart();
        let mut padded = contact();
        padded.name = "  Ana García  ".to_string();

        place_order(&api, &mut cart, &padded).await.unwrap();

        let sent = api.fetcher().transport().requests();
        let body: serde_json::Value =
            serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["cliente_nombre"], "Ana García");
        assert_eq!(body["items"][0]["cantidad"], 2);
    }
}
