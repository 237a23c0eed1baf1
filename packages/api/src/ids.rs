//! Id lists in path segments: `(1,2,3)` or `1,2,3`

use crate::http_error::{HttpError, INVALID_INPUT};

/// Parse a comma-separated id list; empty entries are skipped
///
/// # Errors
///
/// `INVALID_INPUT` when an entry is not an integer or no ids remain.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, HttpError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);

    let ids = inner
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry.parse::<i64>().map_err(|_| {
                HttpError::with_details(
                    "Id list must contain integers separated by commas",
                    INVALID_INPUT,
                    format!("'{}' is not an id", entry),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(HttpError::new("Id list is empty", INVALID_INPUT));
    }

    Ok(ids)
}

/// `(1,2,3)`, the form used in `Location` headers of created sets
pub fn format_id_list(ids: impl IntoIterator<Item = i64>) -> String {
    let joined = ids
        .into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("({})", joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parenthesized_and_bare_lists() {
        assert_eq!(parse_id_list("(1,2,3)").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list("4, 5").unwrap(), vec![4, 5]);
        assert_eq!(parse_id_list("7").unwrap(), vec![7]);
    }

    #[test]
    fn test_empty_entries_are_skipped() {
        assert_eq!(parse_id_list("(1,,2,)").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_bad_lists_are_rejected() {
        assert_eq!(parse_id_list("()").unwrap_err().code, INVALID_INPUT);
        assert_eq!(parse_id_list(" , ").unwrap_err().code, INVALID_INPUT);
        assert_eq!(parse_id_list("(1,x)").unwrap_err().code, INVALID_INPUT);
    }

    #[test]
    fn test_format_round_trips() {
        let text = format_id_list([3, 1, 2]);
        assert_eq!(text, "(3,1,2)");
        assert_eq!(parse_id_list(&text).unwrap(), vec![3, 1, 2]);
    }
}
