//! # Product Catalog
//!
//! The product listing as fetched from `GET /productos`, with the filter,
//! search and sort controls of the shop page.
//!
//! ```text
//! products ──► category filter ──► name search ──► sort ──► view
//!              ("todos" = all)     (contains,       (stable)
//!                                   any case)
//! ```

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::{Product, ProductId};
use crate::ALL_CATEGORIES;

/// Sort order offered by the shop page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Order the API returned.
    #[default]
    Default,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Alphabetical, ignoring case.
    Name,
    /// Most stock first.
    Stock,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Default => "default",
            SortOrder::PriceAsc => "precio-asc",
            SortOrder::PriceDesc => "precio-desc",
            SortOrder::Name => "nombre",
            SortOrder::Stock => "stock",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "default" => Ok(SortOrder::Default),
            "precio-asc" => Ok(SortOrder::PriceAsc),
            "precio-desc" => Ok(SortOrder::PriceDesc),
            "nombre" => Ok(SortOrder::Name),
            "stock" => Ok(SortOrder::Stock),
            other => Err(CoreError::Validation(
                crate::error::ValidationError::InvalidFormat {
                    field: "sort".to_string(),
                    reason: format!(
                        "unknown sort '{}', expected default, precio-asc, precio-desc, nombre or stock",
                        other
                    ),
                },
            )),
        }
    }
}

/// What the shop page is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Category to show; `None` or `"todos"` shows every category.
    pub category: Option<String>,
    /// Case-insensitive substring of the product name. Empty matches all.
    pub search: String,
    pub sort: SortOrder,
}

impl CatalogQuery {
    fn matches(&self, product: &Product, needle: &str) -> bool {
        let in_category = match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) => true,
            Some(category) => product.category == category,
        };
        in_category && (needle.is_empty() || product.name.to_lowercase().contains(needle))
    }
}

/// An owned product listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        ProductCatalog { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Applies filter, search and sort. Ties keep the API's order.
    pub fn query(&self, query: &CatalogQuery) -> Vec<&Product> {
        let needle = query.search.trim().to_lowercase();
        let mut view: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| query.matches(p, &needle))
            .collect();

        match query.sort {
            SortOrder::Default => {}
            SortOrder::PriceAsc => view.sort_by_key(|p| p.price),
            SortOrder::PriceDesc => view.sort_by_key(|p| Reverse(p.price)),
            SortOrder::Name => view.sort_by_cached_key(|p| p.name.to_lowercase()),
            SortOrder::Stock => view.sort_by_key(|p| Reverse(p.stock)),
        }

        view
    }
}

impl From<Vec<Product>> for ProductCatalog {
    fn from(products: Vec<Product>) -> Self {
        ProductCatalog::new(products)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn catalog() -> ProductCatalog {
        ProductCatalog::new(vec![
            Product::new(1, "Tomate", Money::from_cents(250), "kg", "verdura").with_stock(10),
            Product::new(2, "manzana", Money::from_cents(180), "kg", "fruta").with_stock(50),
            Product::new(3, "Pera", Money::from_cents(250), "kg", "fruta").with_stock(5),
            Product::new(4, "Tomate cherry", Money::from_cents(390), "bandeja", "verdura")
                .with_stock(50),
        ])
    }

    fn ids(view: &[&Product]) -> Vec<ProductId> {
        view.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_default_query_keeps_source_order() {
        let catalog = catalog();
        assert_eq!(ids(&catalog.query(&CatalogQuery::default())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_category_filter() {
        let catalog = catalog();
        let mut query = CatalogQuery {
            category: Some("fruta".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&catalog.query(&query)), vec![2, 3]);

        query.category = Some(ALL_CATEGORIES.to_string());
        assert_eq!(catalog.query(&query).len(), 4);
    }

    #[test]
    fn test_search_ignores_case() {
        let catalog = catalog();
        let query = CatalogQuery {
            search: "  TOMATE ".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&catalog.query(&query)), vec![1, 4]);
    }

    #[test]
    fn test_sorts_are_stable() {
        let catalog = catalog();
        let by = |sort| ids(&catalog.query(&CatalogQuery { sort, ..Default::default() }));

        assert_eq!(by(SortOrder::PriceAsc), vec![2, 1, 3, 4]);
        assert_eq!(by(SortOrder::PriceDesc), vec![4, 1, 3, 2]);
        assert_eq!(by(SortOrder::Name), vec![2, 3, 1, 4]);
        assert_eq!(by(SortOrder::Stock), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_categories_and_find() {
        let catalog = catalog();
        assert_eq!(catalog.categories(), vec!["fruta", "verdura"]);
        assert_eq!(catalog.find(3).map(|p| p.name.as_str()), Some("Pera"));
        assert!(catalog.find(99).is_none());
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("precio-desc".parse::<SortOrder>().unwrap(), SortOrder::PriceDesc);
        assert_eq!("".parse::<SortOrder>().unwrap(), SortOrder::Default);
        assert!("precio".parse::<SortOrder>().is_err());
    }
}
