use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::app::ports::{RatingLookupPort, RatingQuery};
use crate::constants::PLACES_FIND_URL;
use crate::types::RatingLookup;

/// Google Places "find place from text" rating lookup
pub struct PlacesRatingLookup {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl PlacesRatingLookup {
    pub fn new(api_key: &str) -> Self {
        Self::with_endpoint(api_key, PLACES_FIND_URL)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn request_url(&self, query: &RatingQuery) -> Result<Url, String> {
        let input = format!("{} {}", query.name, query.address);
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("input", input.trim()),
                ("inputtype", "textquery"),
                ("fields", "name,rating,user_ratings_total"),
                ("key", self.api_key.as_str()),
            ],
        )
        .map_err(|e| e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    status: String,
    #[serde(default)]
    candidates: Vec<PlaceCandidate>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceCandidate {
    #[allow(dead_code)]
    name: Option<String>,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
}

/// Read a find-place response body. `ZERO_RESULTS` and candidates without a rating
/// are "no data"; any other non-OK status is an error.
pub fn parse_find_place(body: &str) -> Result<Option<RatingLookup>, String> {
    let response: FindPlaceResponse = serde_json::from_str(body).map_err(|e| e.to_string())?;
    match response.status.as_str() {
        "OK" => Ok(response.candidates.into_iter().find_map(|c| {
            c.rating.map(|rating| RatingLookup { rating, review_count: c.user_ratings_total })
        })),
        "ZERO_RESULTS" => Ok(None),
        other => Err(match response.error_message {
            Some(message) => format!("{}: {}", other, message),
            None => other.to_string(),
        }),
    }
}

#[async_trait]
impl RatingLookupPort for PlacesRatingLookup {
    async fn lookup(&self, query: &RatingQuery) -> Result<Option<RatingLookup>, String> {
        let url = self.request_url(query)?;
        let resp = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP status {}", status));
        }
        let body = resp.text().await.map_err(|e| e.to_string())?;
        debug!(slug = %query.slug, bytes = body.len(), "Places response");
        parse_find_place(&body)
    }

    fn source_name(&self) -> &str {
        "places"
    }
}
