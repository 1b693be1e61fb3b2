//! Utilities for generating deterministic, human-friendly slugs.

use std::future::Future;

use slug::slugify;
use thiserror::Error;

/// Number of `-N` suffixes tried before giving up on a base slug.
pub const MAX_SUFFIX_ATTEMPTS: usize = 32;

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Errors that can occur while generating a slug via an async uniqueness check.
#[derive(Debug, Error)]
pub enum SlugAsyncError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Predicate(E),
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);
    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Produce a slug that does not collide according to the supplied predicate.
///
/// The `is_unique` future must resolve to `true` when the provided slug does
/// not already exist. The helper retries by suffixing a monotonic counter
/// (`-2`, `-3`, …).
pub async fn generate_unique_slug_async<F, Fut, E>(
    input: &str,
    mut is_unique: F,
) -> Result<String, SlugAsyncError<E>>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(input)?;

    if is_unique(&base).await.map_err(SlugAsyncError::Predicate)? {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate)
            .await
            .map_err(SlugAsyncError::Predicate)?
        {
            return Ok(candidate);
        }
    }

    Err(SlugAsyncError::Slug(SlugError::Exhausted { base }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_lowercases_and_hyphenates() {
        assert_eq!(derive_slug("Caching in Practice!").expect("slug"), "caching-in-practice");
    }

    #[test]
    fn derive_slug_rejects_empty_input() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn derive_slug_rejects_symbol_only_input() {
        assert!(matches!(
            derive_slug("!!!"),
            Err(SlugError::Unrepresentable { .. })
        ));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("lookup failed")]
    struct LookupFailed;

    #[tokio::test]
    async fn generate_unique_slug_appends_counter() {
        let existing = ["pattern-library".to_string()];
        let slug = generate_unique_slug_async("Pattern Library", |candidate| {
            let taken = existing.iter().any(|slug| slug == candidate);
            async move { Ok::<_, LookupFailed>(!taken) }
        })
        .await
        .expect("unique slug");

        assert_eq!(slug, "pattern-library-2");
    }

    #[tokio::test]
    async fn generate_unique_slug_gives_up_eventually() {
        let result =
            generate_unique_slug_async("Busy", |_| async { Ok::<_, LookupFailed>(false) }).await;
        assert!(matches!(
            result,
            Err(SlugAsyncError::Slug(SlugError::Exhausted { base })) if base == "busy"
        ));
    }

    #[tokio::test]
    async fn predicate_errors_propagate() {
        let result =
            generate_unique_slug_async("Busy", |_| async { Err::<bool, _>(LookupFailed) }).await;
        assert!(matches!(result, Err(SlugAsyncError::Predicate(LookupFailed))));
    }
}
