use serde_json::Value;

use crate::{domain::SearchResult, error::SearchError};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "http://localhost:8000/api/search";
/// Multipart field name the service reads the uploaded image from.
pub const UPLOAD_FIELD: &str = "file";
pub const IMAGE_MIME_PREFIX: &str = "image/";

pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with(IMAGE_MIME_PREFIX)
}

/// Decodes a raw search response body.
///
/// Checks run in order: JSON syntax, array shape, then each element. The
/// server's order is preserved.
pub fn decode_search_response(body: &str) -> Result<Vec<SearchResult>, SearchError> {
    let value: Value = serde_json::from_str(body).map_err(|_| SearchError::MalformedResponse)?;
    let Value::Array(items) = value else {
        return Err(SearchError::UnexpectedShape);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<SearchResult>(item).map_err(|err| {
                SearchError::InvalidMatch {
                    index,
                    reason: err.to_string(),
                }
            })
        })
        .collect()
}
