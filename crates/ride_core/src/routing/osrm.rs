//! OSRM `/route` client.
//!
//! Requests the full GeoJSON overview geometry and converts OSRM's
//! `[lng, lat]` pairs into [`GeoPoint`]s.

use std::time::Duration;

use reqwest::{blocking::Client, Url};
use serde::Deserialize;

use super::{RouteError, RouteProvider};
use crate::geo::GeoPoint;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Routes via an OSRM HTTP endpoint.
#[derive(Debug, Clone)]
pub struct OsrmRouteProvider {
    client: Client,
    endpoint: String,
}

impl OsrmRouteProvider {
    /// Create a client for the given OSRM endpoint (e.g. `http://localhost:5000`).
    pub fn new(endpoint: &str) -> Result<Self, RouteError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RouteError::Http)?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn route_url(&self, from: GeoPoint, to: GeoPoint) -> Result<Url, RouteError> {
        let base = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.endpoint, from.lng, from.lat, to.lng, to.lat
        );
        let mut url = Url::parse(&base)
            .map_err(|err| RouteError::Api(format!("failed to build OSRM URL: {}", err)))?;
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson");
        Ok(url)
    }
}

/// Minimal OSRM JSON response structures.
#[derive(Deserialize)]
pub(crate) struct OsrmRouteResponse {
    code: String,
    routes: Option<Vec<OsrmRoute>>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>, // [lng, lat]
}

pub(crate) fn parse_route_response(resp: OsrmRouteResponse) -> Result<Vec<GeoPoint>, RouteError> {
    if resp.code != "Ok" {
        return Err(RouteError::Api(resp.code));
    }
    let route = resp
        .routes
        .and_then(|routes| routes.into_iter().next())
        .ok_or(RouteError::NoRoute)?;

    let path: Vec<GeoPoint> = route
        .geometry
        .coordinates
        .iter()
        .map(|c| GeoPoint::new(c[1], c[0]))
        .collect();

    if path.is_empty() {
        return Err(RouteError::NoRoute);
    }
    Ok(path)
}

impl RouteProvider for OsrmRouteProvider {
    fn fetch_route(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<GeoPoint>, RouteError> {
        let url = self.route_url(from, to)?;
        let response = self.client.get(url).send().map_err(RouteError::Http)?;
        let parsed: OsrmRouteResponse = response.json().map_err(RouteError::Json)?;
        parse_route_response(parsed)
    }
}
