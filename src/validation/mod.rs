/// Resolves a domain to its ordered mail exchangers.
///
/// DNS lookups go through the [`MxLookup`] seam so the resolver can be swapped
/// in tests; [`MxResolver::resolve`] absorbs every failure into an empty list:
/// 1. Queries MX records with a bounded timeout
/// 2. Drops null MX entries and sorts ascending by priority
///
/// # Examples
/// ```no_run
/// # async fn example() {
/// use email_verifier::validation::dnsmx::MxResolver;
/// use std::time::Duration;
///
/// let resolver = MxResolver::from_system_conf(Duration::from_secs(3));
/// let records = resolver.resolve("example.com").await;
/// println!("{} exchangers", records.len());
/// # }
/// ```
///
/// [`MxLookup`]: crate::validation::dnsmx::MxLookup
/// [`MxResolver::resolve`]: crate::validation::dnsmx::MxResolver::resolve
pub mod dnsmx;

/// Cheap syntactic pre-filter and normalization for candidate addresses.
///
/// # Examples
/// ```
/// use email_verifier::validation::syntax::{EmailAddress, is_valid_format};
///
/// let address = EmailAddress::parse(" USER@Example.com ");
/// assert_eq!(address.as_str(), "user@example.com");
/// assert!(is_valid_format(address.as_str()));
/// ```
pub mod syntax;
