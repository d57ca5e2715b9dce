//! City descriptors and the compiled-in crawl table

use serde::Serialize;

/// One dashboard page to crawl.
///
/// The slug names the output directory and file, the display name goes into
/// every record and every log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CityDescriptor {
    pub slug: &'static str,
    pub display_name: &'static str,
    pub url: &'static str,
}

impl CityDescriptor {
    #[must_use]
    pub const fn new(slug: &'static str, display_name: &'static str, url: &'static str) -> Self {
        Self {
            slug,
            display_name,
            url,
        }
    }
}

impl std::fmt::Display for CityDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.display_name, self.url)
    }
}

const CITIES: [CityDescriptor; 7] = [
    CityDescriptor::new(
        "hanoi",
        "Hà Nội",
        "https://www.aqi.in/dashboard/vietnam/ha-noi",
    ),
    CityDescriptor::new(
        "ho-chi-minh-city",
        "Hồ Chí Minh",
        "https://www.aqi.in/dashboard/vietnam/ho-chi-minh",
    ),
    CityDescriptor::new(
        "da-nang",
        "Đà Nẵng",
        "https://www.aqi.in/vi/dashboard/vietnam/da-nang",
    ),
    CityDescriptor::new(
        "hai-phong",
        "Hải Phòng",
        "https://www.aqi.in/vi/dashboard/vietnam/hai-phong",
    ),
    CityDescriptor::new(
        "nghe-an",
        "Nghệ An",
        "https://www.aqi.in/vi/dashboard/vietnam/nghe-an",
    ),
    CityDescriptor::new(
        "son-la",
        "Sơn La",
        "https://www.aqi.in/vi/dashboard/vietnam/son-la",
    ),
    CityDescriptor::new(
        "bac-ninh",
        "Bắc Ninh",
        "https://www.aqi.in/vi/dashboard/vietnam/bac-ninh",
    ),
];

/// The cities crawled on every run, in crawl order.
#[must_use]
pub fn default_cities() -> Vec<CityDescriptor> {
    CITIES.to_vec()
}
