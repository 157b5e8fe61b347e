use crate::error::ResolveError;
use crate::query::ImageQuery;
use crate::utils::normalize_for_match;
use async_trait::async_trait;

use super::{ImageProvider, ProviderKind};

const OSM_STATIC_MAP_URL: &str = "https://staticmap.openstreetmap.de/staticmap.php";
const DEFAULT_ZOOM: u8 = 10;

/// `(name, longitude, latitude)`
const DESTINATION_COORDINATES: &[(&str, f64, f64)] = &[
    ("Santorini, Greece", 25.4615, 36.3932),
    ("Miami, Florida", -80.1918, 25.7617),
    ("Tokyo, Japan", 139.6917, 35.6895),
    ("Paris, France", 2.3522, 48.8566),
    ("Bali, Indonesia", 115.0920, -8.4095),
    ("New York City", -74.0060, 40.7128),
    ("Iceland Ring Road", -21.8174, 64.1466),
    ("Machu Picchu, Peru", -72.5450, -13.1631),
    ("Thai Islands", 98.3923, 7.8804),
    ("Tuscany, Italy", 11.2558, 43.7696),
    ("Safari Kenya", 37.9062, -0.0236),
    ("Swiss Alps", 8.2275, 46.8182),
    ("Australian Outback", 133.7751, -25.2744),
    ("Northern Norway", 23.6753, 68.8778),
    ("Morocco Atlas Mountains", -7.9811, 31.6295),
    ("Patagonia", -73.2654, -49.2854),
    ("Rajasthan, India", 73.4321, 27.0238),
    ("Vancouver, Canada", -123.1207, 49.2827),
    ("Scottish Highlands", -4.2026, 57.4778),
    ("Maldives", 73.2207, 3.2028),
    ("Vietnam", 108.2772, 14.0583),
    ("Prague, Czech Republic", 14.4378, 50.0755),
    ("Jordan", 36.2384, 30.5852),
    ("Croatian Coast", 15.2000, 45.1000),
    ("Azores, Portugal", -25.7213, 37.7412),
    ("Faroe Islands", -6.9118, 61.8926),
    ("Madagascar", 46.8691, -18.7669),
    ("Slovenia", 14.9955, 46.1512),
    ("Bhutan", 90.4336, 27.5142),
    ("Easter Island, Chile", -109.3497, -27.1127),
    ("Palawan, Philippines", 118.7384, 9.8349),
    ("Tasmania, Australia", 146.3160, -41.4545),
    ("Rwanda", 29.8739, -1.9403),
    ("Lapland, Finland", 25.7284, 67.9222),
    ("Oman", 55.9754, 21.4735),
    ("Albania", 20.1683, 41.1533),
    ("Vanuatu", 166.9592, -15.3767),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl MapSize {
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Small => (200, 150),
            Self::Medium => (400, 300),
            Self::Large => (800, 600),
        }
    }
}

fn short_name(entry: &str) -> String {
    normalize_for_match(entry.split(',').next().unwrap_or(entry))
}

/// `(longitude, latitude)` for a known destination.
///
/// Matches the full name first, then the part before the first comma, so
/// both "Santorini, Greece" and "santorini" resolve.
pub fn destination_coordinates(name: &str) -> Option<(f64, f64)> {
    let wanted = normalize_for_match(name);
    if wanted.is_empty() {
        return None;
    }

    DESTINATION_COORDINATES
        .iter()
        .find(|(entry, _, _)| normalize_for_match(entry) == wanted)
        .or_else(|| {
            DESTINATION_COORDINATES
                .iter()
                .find(|(entry, _, _)| short_name(entry) == wanted)
        })
        .map(|(_, lon, lat)| (*lon, *lat))
}

pub fn static_map_url(longitude: f64, latitude: f64, zoom: u8, size: MapSize) -> String {
    let (width, height) = size.dimensions();
    let center = format!("{latitude},{longitude}");
    let markers = format!("{latitude},{longitude},red-pushpin");
    format!(
        "{OSM_STATIC_MAP_URL}?center={}&zoom={zoom}&size={width}x{height}&maptype=mapnik&markers={}",
        urlencoding::encode(&center),
        urlencoding::encode(&markers),
    )
}

/// OpenStreetMap static map; no key and no request of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticMapProvider {
    pub size: MapSize,
    pub zoom: u8,
}

impl Default for StaticMapProvider {
    fn default() -> Self {
        Self {
            size: MapSize::default(),
            zoom: DEFAULT_ZOOM,
        }
    }
}

#[async_trait(?Send)]
impl ImageProvider for StaticMapProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::StaticMap
    }

    async fn resolve(&self, query: &ImageQuery) -> Result<String, ResolveError> {
        let (longitude, latitude) =
            destination_coordinates(&query.destination).ok_or(ResolveError::EmptyResult)?;
        Ok(static_map_url(longitude, latitude, self.zoom, self.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_and_short_names_resolve() {
        assert_eq!(destination_coordinates("Santorini, Greece"), Some((25.4615, 36.3932)));
        assert_eq!(destination_coordinates("  santorini "), Some((25.4615, 36.3932)));
        assert_eq!(destination_coordinates("Swiss Alps"), Some((8.2275, 46.8182)));
        assert_eq!(destination_coordinates("Atlantis"), None);
        assert_eq!(destination_coordinates(""), None);
    }

    #[test]
    fn url_uses_lat_lon_order_and_size() {
        let url = static_map_url(2.3522, 48.8566, 10, MapSize::Large);
        assert!(url.starts_with(OSM_STATIC_MAP_URL));
        assert!(url.contains("center=48.8566%2C2.3522"));
        assert!(url.contains("size=800x600"));
        assert!(url.contains("markers=48.8566%2C2.3522%2Cred-pushpin"));
    }

    #[tokio::test]
    async fn unknown_destination_is_empty() {
        let provider = StaticMapProvider::default();
        assert_eq!(
            provider.resolve(&ImageQuery::new("Atlantis")).await,
            Err(ResolveError::EmptyResult)
        );
        let url = provider.resolve(&ImageQuery::new("Bhutan")).await.expect("map url");
        assert!(url.contains("zoom=10"));
        assert!(url.contains("size=400x300"));
    }
}
