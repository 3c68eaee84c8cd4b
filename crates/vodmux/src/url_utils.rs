//! URL helpers shared by the resolver and the segment acquirer.

use url::Url;

use crate::error::ConvertError;

/// Parses an absolute URL.
pub fn parse(input: &str) -> Result<Url, ConvertError> {
    Url::parse(input).map_err(|e| ConvertError::invalid_url(input, e.to_string()))
}

/// Resolves a possibly-relative reference against a base URL using
/// standard relative-resolution semantics.
pub fn resolve(reference: &str, base: &Url) -> Result<Url, ConvertError> {
    base.join(reference)
        .map_err(|e| ConvertError::invalid_url(reference, e.to_string()))
}

/// The directory containing `url`: everything up to and including the last
/// path separator.
pub fn directory_of(url: &Url) -> Result<Url, ConvertError> {
    url.join(".")
        .map_err(|e| ConvertError::invalid_url(url.as_str(), e.to_string()))
}
