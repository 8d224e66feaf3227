//! Conversion between stored locators and remote node identifiers.
//!
//! A locator is the URL persisted on folder and file records. Its final path
//! segment after `/fm/` is the provider's node identifier:
//! `https://mega.nz/fm/Ab3dEf`.

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::remote::RemoteNodeId;

const NODE_SEGMENT: &str = "/fm/";

/// Build the locator stored for a remote node.
pub fn format_locator(base: &str, id: &RemoteNodeId) -> String {
    format!("{}{NODE_SEGMENT}{}", base.trim_end_matches('/'), id.as_str())
}

/// Extract the remote node identifier from a stored locator.
///
/// Query strings and fragments are ignored. Fails with a validation error when
/// the locator carries no `/fm/<id>` segment.
pub fn parse_locator(locator: &str) -> AppResult<RemoteNodeId> {
    let without_suffix = locator
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let id = without_suffix
        .rfind(NODE_SEGMENT)
        .map(|idx| &without_suffix[idx + NODE_SEGMENT.len()..])
        .ok_or_else(|| AppError::validation(format!("Locator '{locator}' has no node segment")))?;

    if id.is_empty() || id.contains('/') {
        return Err(AppError::validation(format!(
            "Locator '{locator}' has a malformed node id"
        )));
    }

    Ok(RemoteNodeId::new(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_format_then_parse_returns_same_id() {
        let id = RemoteNodeId::new("Xy7Qa2bC");
        let locator = format_locator("https://mega.nz/", &id);
        assert_eq!(locator, "https://mega.nz/fm/Xy7Qa2bC");
        assert_eq!(parse_locator(&locator).unwrap(), id);
    }

    #[test]
    fn test_parse_ignores_query_and_fragment() {
        let id = parse_locator("https://mega.nz/fm/N1?x=1#key").unwrap();
        assert_eq!(id.as_str(), "N1");
    }

    #[test]
    fn test_parse_uses_last_node_segment() {
        let id = parse_locator("https://host/fm/tenant/fm/N9").unwrap();
        assert_eq!(id.as_str(), "N9");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "https://mega.nz/file/N1",
            "https://mega.nz/fm/",
            "https://mega.nz/fm/N1/extra",
            "",
        ] {
            let err = parse_locator(bad).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{bad}");
        }
    }
}
