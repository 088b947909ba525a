use crate::repo::identifier::RepositoryIdentifier;
use crate::IdentifierError;
use url::Url;

/// Default address prefix for repository pages
pub const DEFAULT_BASE_URL: &str = "https://github.com/";

/// A repository identifier paired with its canonical page address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRepository {
    /// Root page of the repository
    pub address: Url,

    /// The identifier the address was built from
    pub identifier: RepositoryIdentifier,
}

/// Resolves identifiers into page addresses, dropping malformed ones
///
/// The address is `base_url + identifier`. Identifiers without exactly one
/// `/` are filtered out rather than reported as errors; the output keeps
/// input order but may be shorter than the input.
///
/// # Examples
///
/// ```
/// use opeg_crawler::repo::{resolve, DEFAULT_BASE_URL};
///
/// let resolved = resolve(&["a/b/c".to_string(), "x/y".to_string()], DEFAULT_BASE_URL);
/// assert_eq!(resolved.len(), 1);
/// assert_eq!(resolved[0].address.as_str(), "https://github.com/x/y");
/// ```
pub fn resolve(identifiers: &[String], base_url: &str) -> Vec<ResolvedRepository> {
    partition(identifiers, base_url).0
}

/// Resolves identifiers and also returns the ones that were dropped
///
/// # Returns
///
/// A tuple of (resolved repositories, rejected identifiers with the reason),
/// both in input order.
pub fn partition(
    identifiers: &[String],
    base_url: &str,
) -> (Vec<ResolvedRepository>, Vec<(String, IdentifierError)>) {
    let mut resolved = Vec::with_capacity(identifiers.len());
    let mut rejected = Vec::new();

    for raw in identifiers {
        match resolve_one(raw, base_url) {
            Ok(repo) => resolved.push(repo),
            Err(e) => {
                tracing::debug!("Dropping identifier '{}': {}", raw, e);
                rejected.push((raw.clone(), e));
            }
        }
    }

    (resolved, rejected)
}

/// Resolves a single identifier
pub fn resolve_one(raw: &str, base_url: &str) -> Result<ResolvedRepository, IdentifierError> {
    let identifier = RepositoryIdentifier::parse(raw)?;
    let address = Url::parse(&format!("{}{}", base_url, identifier)).map_err(|e| {
        IdentifierError::InvalidAddress {
            identifier: raw.to_string(),
            message: e.to_string(),
        }
    })?;

    Ok(ResolvedRepository {
        address,
        identifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_drops_bad_separator_counts() {
        let resolved = resolve(&ids(&["a/b/c", "x/y"]), DEFAULT_BASE_URL);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].identifier.as_str(), "x/y");
        assert_eq!(resolved[0].address.as_str(), "https://github.com/x/y");
    }

    #[test]
    fn test_resolve_preserves_order() {
        let resolved = resolve(&ids(&["b/two", "nope", "a/one"]), DEFAULT_BASE_URL);
        let names: Vec<&str> = resolved.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(names, vec!["b/two", "a/one"]);
    }

    #[test]
    fn test_partition_reports_rejected() {
        let (resolved, rejected) = partition(&ids(&["ok/repo", "no-slash"]), DEFAULT_BASE_URL);
        assert_eq!(resolved.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, "no-slash");
    }

    #[test]
    fn test_custom_base_url() {
        let resolved = resolve(&ids(&["o/p"]), "http://127.0.0.1:8080/");
        assert_eq!(resolved[0].address.as_str(), "http://127.0.0.1:8080/o/p");
    }
}
