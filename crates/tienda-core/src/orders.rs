//! # Order Book
//!
//! The admin page's order listing: newest first, filterable by status and
//! by a free-text search over order number, customer name and email.

use crate::types::{AdminOrder, OrderId, OrderStatus};

/// Filter applied to the admin listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Only orders in this status; `None` shows all.
    pub status: Option<OrderStatus>,
    /// Matches the order id, customer name or email. Empty matches all.
    pub query: String,
}

impl OrderFilter {
    fn matches(&self, order: &AdminOrder, needle: &str) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }

        needle.is_empty()
            || order.id.to_string().contains(needle)
            || order.customer_name.to_lowercase().contains(needle)
            || order.customer_email.to_lowercase().contains(needle)
    }
}

/// Orders held by the admin page, sorted newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBook {
    orders: Vec<AdminOrder>,
}

impl OrderBook {
    /// Takes ownership of the API listing and sorts it by id, descending.
    pub fn new(mut orders: Vec<AdminOrder>) -> Self {
        orders.sort_by(|a, b| b.id.cmp(&a.id));
        OrderBook { orders }
    }

    pub fn orders(&self) -> &[AdminOrder] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn find(&self, id: OrderId) -> Option<&AdminOrder> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn filter(&self, filter: &OrderFilter) -> Vec<&AdminOrder> {
        let needle = filter.query.trim().to_lowercase();
        self.orders
            .iter()
            .filter(|o| filter.matches(o, &needle))
            .collect()
    }

    /// Records a status change confirmed by the API.
    ///
    /// Returns `false` when the order is not in the book.
    pub fn set_status(&mut self, id: OrderId, status: OrderStatus) -> bool {
        match self.orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.status = status;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn order(id: OrderId, name: &str, email: &str, status: OrderStatus) -> AdminOrder {
        AdminOrder {
            id,
            customer_name: name.to_string(),
            customer_email: email.to_string(),
            customer_phone: "600111222".to_string(),
            delivery_address: "Calle Mayor 1, Madrid".to_string(),
            date: "2024-05-01".to_string(),
            total: Money::from_cents(1000),
            status,
            items: Vec::new(),
        }
    }

    fn book() -> OrderBook {
        OrderBook::new(vec![
            order(3, "Ana García", "ana@example.com", OrderStatus::Pendiente),
            order(12, "Luis Pérez", "luis@correo.es", OrderStatus::Enviado),
            order(7, "Marta Ruiz", "marta@example.com", OrderStatus::Pendiente),
        ])
    }

    fn ids(view: &[&AdminOrder]) -> Vec<OrderId> {
        view.iter().map(|o| o.id).collect()
    }

    #[test]
    fn test_newest_first() {
        let book = book();
        let all: Vec<OrderId> = book.orders().iter().map(|o| o.id).collect();
        assert_eq!(all, vec![12, 7, 3]);
    }

    #[test]
    fn test_filter_by_status() {
        let filter = OrderFilter {
            status: Some(OrderStatus::Pendiente),
            ..Default::default()
        };
        assert_eq!(ids(&book().filter(&filter)), vec![7, 3]);
    }

    #[test]
    fn test_search_matches_id_name_and_email() {
        let book = book();
        let search = |q: &str| {
            ids(&book.filter(&OrderFilter {
                query: q.to_string(),
                ..Default::default()
            }))
        };

        assert_eq!(search("12"), vec![12]);
        assert_eq!(search("MARTA"), vec![7]);
        assert_eq!(search("example.com"), vec![7, 3]);
        assert!(search("nadie").is_empty());
    }

    #[test]
    fn test_set_status() {
        let mut book = book();
        assert!(book.set_status(3, OrderStatus::Entregado));
        assert_eq!(book.find(3).unwrap().status, OrderStatus::Entregado);
        assert!(!book.set_status(99, OrderStatus::Cancelado));
    }
}
