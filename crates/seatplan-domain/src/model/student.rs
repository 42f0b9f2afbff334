//! Student record as loaded from a roster file

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for haversine distances
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Pickup times for each school day, kept as free text ("14:30", "-", ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayPickups {
    #[serde(default)]
    pub monday: String,
    #[serde(default)]
    pub tuesday: String,
    #[serde(default)]
    pub wednesday: String,
    #[serde(default)]
    pub thursday: String,
    #[serde(default)]
    pub friday: String,
}

impl WeekdayPickups {
    /// Day label and value pairs, Monday first
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("Monday", self.monday.as_str()),
            ("Tuesday", self.tuesday.as_str()),
            ("Wednesday", self.wednesday.as_str()),
            ("Thursday", self.thursday.as_str()),
            ("Friday", self.friday.as_str()),
        ]
    }

    /// One-line summary, e.g. "Mon 14:30, Tue 15:00, ..."
    pub fn summary(&self) -> String {
        self.entries()
            .iter()
            .map(|(day, time)| format!("{} {}", &day[..3], if time.is_empty() { "-" } else { *time }))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Geocoded position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance in kilometres
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// A student to be seated in one of the fleet's vehicles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Roster-wide unique id, `<file index>_<row id>`
    pub id: String,
    /// Ingestion index of the roster file this student came from
    #[serde(default)]
    pub source_index: usize,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub pickup: WeekdayPickups,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

impl Student {
    pub fn new(source_index: usize, native_id: &str, name: &str, address: &str) -> Self {
        Self {
            id: Self::scoped_id(source_index, native_id),
            source_index,
            name: name.to_string(),
            address: address.to_string(),
            pickup: WeekdayPickups::default(),
            location: None,
        }
    }

    pub fn with_pickup(mut self, pickup: WeekdayPickups) -> Self {
        self.pickup = pickup;
        self
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Prefix a file-local row id with the file's ingestion index
    pub fn scoped_id(source_index: usize, native_id: &str) -> String {
        format!("{}_{}", source_index, native_id.trim())
    }

    /// Recover the file index from a scoped id ("1_5" -> 1)
    pub fn source_index_of(id: &str) -> Option<usize> {
        id.split_once('_').and_then(|(prefix, _)| prefix.parse().ok())
    }
}
