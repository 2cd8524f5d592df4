pub mod error;
pub mod http;

use crate::domain::analysis::CostAnalysis;
use crate::domain::cost::CostRecord;

pub use error::ApiError;
pub use http::HttpCostApi;

/// The two reads the dashboard needs from the cost backend.
#[async_trait::async_trait]
pub trait CostApi: Send + Sync {
    async fn fetch_costs(&self) -> Result<Vec<CostRecord>, ApiError>;

    async fn fetch_cost_analysis(&self) -> Result<CostAnalysis, ApiError>;
}

#[async_trait::async_trait]
impl<T: CostApi + ?Sized> CostApi for std::sync::Arc<T> {
    async fn fetch_costs(&self) -> Result<Vec<CostRecord>, ApiError> {
        (**self).fetch_costs().await
    }

    async fn fetch_cost_analysis(&self) -> Result<CostAnalysis, ApiError> {
        (**self).fetch_cost_analysis().await
    }
}
