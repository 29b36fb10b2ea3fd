//! Admin product catalogue endpoints.

use reqwest::Method;
use serde_json::Value;
use storefront_api_models::ApiResult;

use crate::client::ApiClient;

/// `/admin/products` operations.
#[derive(Clone, Copy, Debug)]
pub struct Products<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// Product catalogue operations.
    #[must_use]
    pub const fn products(&self) -> Products<'_> {
        Products { client: self }
    }
}

impl Products<'_> {
    /// List products, forwarding `query` as URL parameters.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to fetch products`).
    pub async fn list(&self, query: &[(String, String)]) -> ApiResult<Value> {
        self.client
            .get_with_query(&["admin", "products"], query, "Failed to fetch products")
            .await
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to fetch product`).
    pub async fn get(&self, product_id: &str) -> ApiResult<Value> {
        self.client
            .get(&["admin", "products", product_id], "Failed to fetch product")
            .await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to create product`).
    pub async fn create(&self, product: &Value) -> ApiResult<Value> {
        self.client
            .send_json(
                Method::POST,
                &["admin", "products"],
                product,
                "Failed to create product",
            )
            .await
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to update product`).
    pub async fn update(&self, product_id: &str, changes: &Value) -> ApiResult<Value> {
        self.client
            .send_json(
                Method::PUT,
                &["admin", "products", product_id],
                changes,
                "Failed to update product",
            )
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to delete product`).
    pub async fn delete(&self, product_id: &str) -> ApiResult<Value> {
        self.client
            .delete(&["admin", "products", product_id], "Failed to delete product")
            .await
    }
}
