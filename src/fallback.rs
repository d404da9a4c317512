//! Ordered fallback over interchangeable sources.

use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

/// Try `operation` against each source in order, once each, and return the
/// first success.
///
/// Failures are logged and swallowed: the caller only learns whether some
/// source answered. There are no retries; a source that failed is not asked
/// again.
///
/// # Arguments
/// * `operation_name` - Name of the operation for logging
/// * `sources` - Candidates in priority order
/// * `operation` - Async closure run against one source
pub async fn first_success<S, T, E, F, Fut>(
    operation_name: &str,
    sources: &[S],
    mut operation: F,
) -> Option<T>
where
    S: Display,
    F: FnMut(&S) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    for (index, source) in sources.iter().enumerate() {
        match operation(source).await {
            Ok(result) => {
                if index > 0 {
                    debug!(
                        "{}: Succeeded with fallback source {}/{} ({})",
                        operation_name,
                        index + 1,
                        sources.len(),
                        source
                    );
                }
                return Some(result);
            }
            Err(e) => {
                let remaining = sources.len() - index - 1;
                if remaining > 0 {
                    debug!(
                        "{}: Source {} failed ({}), {} fallback(s) remaining",
                        operation_name, source, e, remaining
                    );
                } else {
                    warn!(
                        "{}: All {} sources failed. Last error: {}",
                        operation_name,
                        sources.len(),
                        e
                    );
                }
            }
        }
    }

    None
}
