//! Directions links for vehicle groups

use reqwest::Url;

use seatplan_domain::model::Group;
use seatplan_types::{ConfigError, Result};

use crate::config::{Config, RouteEndpoints};

/// Build `<base>/<origin>/<stop 1>/.../<destination>`.
///
/// Every stop becomes one percent-encoded path segment. Blank endpoints and
/// blank addresses are left out.
pub fn route_url(base: &str, endpoints: &RouteEndpoints, addresses: &[&str]) -> Result<String> {
    let mut url = Url::parse(base)
        .map_err(|e| ConfigError::Invalid(format!("maps_base_url '{}': {}", base, e)))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ConfigError::Invalid(format!("maps_base_url '{}' cannot take a path", base)))?;
        segments.pop_if_empty();

        let stops = std::iter::once(endpoints.origin.as_str())
            .chain(addresses.iter().copied())
            .chain(std::iter::once(endpoints.destination.as_str()))
            .map(str::trim)
            .filter(|stop| !stop.is_empty());
        for stop in stops {
            segments.push(stop);
        }
    }

    Ok(url.to_string())
}

/// Route for a group in its current order; `None` for an empty group.
///
/// Endpoints are picked from the first student's roster file.
pub fn group_route_url(group: &Group, config: &Config) -> Result<Option<String>> {
    let Some(first) = group.students.first() else {
        return Ok(None);
    };
    let endpoints = config.route_for(first.source_index);
    let addresses: Vec<&str> = group.students.iter().map(|s| s.address.as_str()).collect();
    route_url(&config.maps_base_url, endpoints, &addresses).map(Some)
}
