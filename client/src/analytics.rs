//! Dashboard figures joined from several list endpoints.
//!
//! These never fail: a failed fetch is logged and shows as zero or empty.

use harvest_common::analytics::{
    environmental_series, event_type_summary, monthly_production, product_type_distribution,
    status_distribution, AnalyticsSummary, Count, EnvironmentalPoint, EXPIRING_WINDOW_DAYS,
};
use harvest_common::batch::Batch;
use harvest_common::product::Product;
use tracing::warn;

use crate::batches::BatchService;
use crate::error::Result;
use crate::http::ApiClient;
use crate::products::ProductService;

#[derive(Debug, Clone)]
pub struct AnalyticsService {
    batches: BatchService,
    products: ProductService,
}

fn or_empty<T>(what: &str, res: Result<Vec<T>>) -> Vec<T> {
    res.unwrap_or_else(|e| {
        warn!("failed to fetch {what}: {e}");
        Vec::new()
    })
}

impl AnalyticsService {
    pub fn new(api: ApiClient) -> Self {
        Self {
            batches: BatchService::new(api.clone()),
            products: ProductService::new(api),
        }
    }

    /// Fetches products, batches and batches expiring within
    /// [`EXPIRING_WINDOW_DAYS`] concurrently. Any failure zeroes the summary.
    pub async fn summary(&self) -> AnalyticsSummary {
        let (products, batches, expiring) = futures::join!(
            self.products.mine(),
            self.batches.mine(),
            self.batches.expiring(EXPIRING_WINDOW_DAYS),
        );
        match (products, batches, expiring) {
            (Ok(p), Ok(b), Ok(e)) => AnalyticsSummary::from_lists(&p, &b, &e),
            (p, b, e) => {
                let err = [p.err(), b.err(), e.err()].into_iter().flatten().next();
                if let Some(err) = err {
                    warn!("failed to fetch analytics summary: {err}");
                }
                AnalyticsSummary::default()
            }
        }
    }

    pub async fn batch_status_distribution(&self) -> Vec<Count> {
        status_distribution(&self.my_batches().await)
    }

    pub async fn product_type_distribution(&self) -> Vec<Count> {
        product_type_distribution(&self.my_products().await)
    }

    pub async fn monthly_production(&self) -> Vec<Count> {
        monthly_production(&self.my_batches().await)
    }

    pub async fn event_type_summary(&self) -> Vec<Count> {
        event_type_summary(&self.my_batches().await)
    }

    pub async fn environmental_data(&self, product_id: i64) -> Vec<EnvironmentalPoint> {
        let conditions = or_empty(
            "environmental conditions",
            self.products.environmental_conditions(product_id).await,
        );
        environmental_series(&conditions)
    }

    async fn my_batches(&self) -> Vec<Batch> {
        or_empty("batches", self.batches.mine().await)
    }

    async fn my_products(&self) -> Vec<Product> {
        or_empty("products", self.products.mine().await)
    }
}
