use harvest_common::product::{EnvironmentalCondition, Product, ProductPage, ProductPageQuery, ProductType};

use crate::error::Result;
use crate::http::ApiClient;

#[derive(Debug, Clone)]
pub struct ProductService {
    api: ApiClient,
}

impl ProductService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn create(&self, product: &Product) -> Result<Product> {
        self.api.post("/products", product).await
    }

    pub async fn get(&self, id: i64) -> Result<Product> {
        self.api.get(&format!("/products/{id}")).await
    }

    pub async fn by_batch_code(&self, code: &str) -> Result<Product> {
        self.api.get(&format!("/products/batch/{code}")).await
    }

    /// Products owned by the signed-in user.
    pub async fn mine(&self) -> Result<Vec<Product>> {
        self.api.get("/products").await
    }

    pub async fn paged(&self, query: &ProductPageQuery) -> Result<ProductPage> {
        self.api.get_query("/products/paged", query).await
    }

    pub async fn update(&self, id: i64, product: &Product) -> Result<Product> {
        self.api.put(&format!("/products/{id}"), product).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.api.delete(&format!("/products/{id}")).await
    }

    pub async fn add_environmental_condition(
        &self,
        product_id: i64,
        condition: &EnvironmentalCondition,
    ) -> Result<EnvironmentalCondition> {
        self.api
            .post(&format!("/products/{product_id}/environmental-conditions"), condition)
            .await
    }

    pub async fn environmental_conditions(&self, product_id: i64) -> Result<Vec<EnvironmentalCondition>> {
        self.api
            .get(&format!("/products/{product_id}/environmental-conditions"))
            .await
    }

    pub async fn search(&self, keyword: &str) -> Result<Vec<Product>> {
        self.api.get_query("/products/search", &[("keyword", keyword)]).await
    }

    pub async fn by_type(&self, product_type: ProductType) -> Result<Vec<Product>> {
        self.api
            .get(&format!("/products/type/{}", product_type.as_str()))
            .await
    }

    pub async fn organic(&self) -> Result<Vec<Product>> {
        self.api.get("/products/organic").await
    }

    pub async fn expiring(&self, days: u32) -> Result<Vec<Product>> {
        self.api.get_query("/products/expiring", &[("days", days)]).await
    }
}
