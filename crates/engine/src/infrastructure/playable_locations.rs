//! Playable Locations API client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use zoinkies_domain::{CellId, LatLng, LocationCriteria, RawLocation};

use crate::infrastructure::ports::{LocationProviderPort, ProviderError};

/// Default Playable Locations base URL.
pub const DEFAULT_PLAYABLE_LOCATIONS_BASE_URL: &str = "https://playablelocations.googleapis.com";

const SAMPLE_PATH: &str = "/v3:samplePlayableLocations";

/// Client for the `samplePlayableLocations` endpoint.
#[derive(Clone)]
pub struct PlayableLocationsClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl PlayableLocationsClient {
    /// Fails when the HTTP client cannot be built with the request timeout.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("HTTP client setup: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, SAMPLE_PATH)
    }
}

#[async_trait]
impl LocationProviderPort for PlayableLocationsClient {
    async fn query(
        &self,
        cell: CellId,
        criteria: &LocationCriteria,
    ) -> Result<Vec<RawLocation>, ProviderError> {
        let body = build_request(cell, criteria);

        let mut request = self.client.post(self.endpoint()).json(&body);
        if !self.api_key.is_empty() {
            request = request.query(&[("key", self.api_key.as_str())]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.timeout)
            } else {
                ProviderError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
            return Err(ProviderError::status(status.as_u16(), error_text));
        }

        let api_response: SampleResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let locations = convert_response(api_response, criteria);
        tracing::debug!(
            cell = %cell,
            count = locations.len(),
            "Playable locations received"
        );
        Ok(locations)
    }
}

/// Quadkey cells have no S2 id, so the area is sent as the cell's bounding
/// rectangle. Criteria use the provider's field names unchanged.
fn build_request(cell: CellId, criteria: &LocationCriteria) -> SampleRequest {
    let bounds = cell.bounds();
    SampleRequest {
        area_filter: AreaFilter {
            rectangle: WireRectangle {
                low: WireLatLng::from(bounds.low()),
                high: WireLatLng::from(bounds.high()),
            },
        },
        criteria: vec![WireCriterion {
            game_object_type: criteria.game_object_type,
            filter: WireFilter {
                max_location_count: criteria.max_location_count,
            },
            fields_to_return: WireFieldMask {
                paths: criteria.fields_to_return.clone(),
            },
        }],
    }
}

/// A missing type key means the provider found nothing for that criterion.
fn convert_response(mut response: SampleResponse, criteria: &LocationCriteria) -> Vec<RawLocation> {
    let Some(list) = response
        .locations_per_game_object_type
        .remove(&criteria.response_key())
    else {
        return Vec::new();
    };

    list.locations.into_iter().map(convert_location).collect()
}

fn convert_location(wire: WireLocation) -> RawLocation {
    RawLocation {
        place_id: wire.place_id.unwrap_or_default(),
        name: wire.name,
        snapped_point: wire.snapped_point.and_then(WireLatLng::into_domain),
        center_point: wire.center_point.and_then(WireLatLng::into_domain),
        types: wire.types,
        plus_code: wire.plus_code.and_then(|p| p.global_code),
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct SampleRequest {
    area_filter: AreaFilter,
    criteria: Vec<WireCriterion>,
}

#[derive(Debug, Serialize)]
struct AreaFilter {
    rectangle: WireRectangle,
}

#[derive(Debug, Serialize)]
struct WireRectangle {
    low: WireLatLng,
    high: WireLatLng,
}

#[derive(Debug, Serialize)]
struct WireCriterion {
    game_object_type: i32,
    filter: WireFilter,
    fields_to_return: WireFieldMask,
}

#[derive(Debug, Serialize)]
struct WireFilter {
    max_location_count: u32,
}

#[derive(Debug, Serialize)]
struct WireFieldMask {
    paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct WireLatLng {
    latitude: f64,
    longitude: f64,
}

impl From<LatLng> for WireLatLng {
    fn from(value: LatLng) -> Self {
        Self {
            latitude: value.latitude(),
            longitude: value.longitude(),
        }
    }
}

impl WireLatLng {
    fn into_domain(self) -> Option<LatLng> {
        match LatLng::new(self.latitude, self.longitude) {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding out-of-range provider coordinate");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SampleResponse {
    #[serde(default, alias = "locationsPerGameObjectType")]
    locations_per_game_object_type: HashMap<String, WireLocationList>,
}

#[derive(Debug, Deserialize)]
struct WireLocationList {
    #[serde(default)]
    locations: Vec<WireLocation>,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "placeId")]
    place_id: Option<String>,
    #[serde(default, alias = "plusCode")]
    plus_code: Option<WirePlusCode>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default, alias = "centerPoint")]
    center_point: Option<WireLatLng>,
    #[serde(default, alias = "snappedPoint")]
    snapped_point: Option<WireLatLng>,
}

#[derive(Debug, Deserialize)]
struct WirePlusCode {
    #[serde(default, alias = "globalCode")]
    global_code: Option<String>,
}
