//! Catalog domain types.

use serde::{Deserialize, Serialize};

use tg_store_core::{CategoryId, Price, ProductId};

/// Number of products shown per page on the products screen.
pub const PRODUCTS_PER_PAGE: usize = 10;

/// A catalog product. Read-only from the client's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: Vec<String>,
    /// Units in stock.
    pub quantity: u32,
    pub description: Option<String>,
    pub category: Option<CategoryId>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// One screen's worth of products after search filtering and paging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListView {
    pub items: Vec<Product>,
    /// 1-based page actually shown.
    pub page: usize,
    pub total_pages: usize,
    /// Products matching the search term, across all pages.
    pub total_matches: usize,
}

impl ProductListView {
    /// Filter `products` by a case-insensitive name search and cut out one page.
    ///
    /// `page` is clamped into `1..=total_pages`.
    #[must_use]
    pub fn build(products: &[Product], search: &str, page: usize) -> Self {
        let needle = search.trim().to_lowercase();
        let matches: Vec<&Product> = products
            .iter()
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .collect();

        let total_pages = matches.len().div_ceil(PRODUCTS_PER_PAGE);
        let page = page.clamp(1, total_pages.max(1));
        let items = matches
            .iter()
            .skip((page - 1) * PRODUCTS_PER_PAGE)
            .take(PRODUCTS_PER_PAGE)
            .map(|p| (*p).clone())
            .collect();

        Self {
            items,
            page,
            total_pages,
            total_matches: matches.len(),
        }
    }
}
