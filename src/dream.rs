//! Placeholder image references for the dream feature.
//!
//! No image is synthesized. The description is embedded in a URL pointing at
//! a placeholder image service.

use reqwest::Url;

/// Query parameter carrying the dream description.
pub const DESCRIPTION_PARAM: &str = "text";

pub fn placeholder_image_url(base: &Url, description: &str) -> String {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair(DESCRIPTION_PARAM, description);
    url.to_string()
}
