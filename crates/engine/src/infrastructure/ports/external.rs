//! External service port traits (playable locations provider).

use async_trait::async_trait;
use zoinkies_domain::{CellId, LocationCriteria, RawLocation};

use super::error::ProviderError;

/// Cell-scoped lookup of playable locations.
///
/// Fewer results than `criteria.max_location_count`, including none at all,
/// is a valid answer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationProviderPort: Send + Sync {
    async fn query(
        &self,
        cell: CellId,
        criteria: &LocationCriteria,
    ) -> Result<Vec<RawLocation>, ProviderError>;
}
