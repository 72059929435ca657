use url::Url;

use crate::errors::{ScrapeError, ScrapeResult};

/// Resolve `reference` (as found in an href) against `base`.
///
/// References that already carry a scheme come back untouched. Root-relative
/// references keep only the base's scheme and authority; anything else is
/// joined onto the base path.
pub fn resolve(reference: &str, base: &str) -> ScrapeResult<String> {
    let reference = reference.trim();

    if Url::parse(reference).is_ok() {
        return Ok(reference.to_string());
    }

    let base = Url::parse(base).map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", base, e)))?;
    let joined = base
        .join(reference)
        .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", reference, e)))?;

    Ok(joined.to_string())
}
