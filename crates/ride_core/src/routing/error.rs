use thiserror::Error;

/// Errors encountered while fetching a route.
#[derive(Debug, Error)]
pub enum RouteError {
    #[cfg(feature = "osrm")]
    #[error("route request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[cfg(feature = "osrm")]
    #[error("route response was not valid JSON: {0}")]
    Json(#[source] reqwest::Error),

    #[error("routing service returned {0}")]
    Api(String),

    #[error("no route between the requested points")]
    NoRoute,
}
