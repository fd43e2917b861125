use async_trait::async_trait;
use shortlink_core::{
    CreatedUrl, NewUrl, Repository, ShortCode, ShortenParams, Shortener, ShortenerError, Stats,
};
use shortlink_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info};

/// A concrete implementation of the `Shortener` trait.
///
/// Wraps a `Repository` and a `Generator`. There is no collision pre-check
/// and no retry for generated codes; the store's uniqueness constraint is the
/// only guard, and a collision surfaces as [`ShortenerError::Conflict`].
#[derive(Debug)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    base_url: String,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            base_url: self.base_url.clone(),
        }
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a service whose short URLs are rooted at `base_url`.
    pub fn new(repository: Arc<R>, generator: G, base_url: impl Into<String>) -> Self {
        Self {
            repository,
            generator: Arc::new(generator),
            base_url: base_url.into(),
        }
    }

    /// The URL is otherwise stored verbatim, but it must be usable as a
    /// `Location` header.
    fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.trim().is_empty() {
            return Err(ShortenerError::InvalidUrl("URL is required".to_string()));
        }
        if url.chars().any(char::is_control) {
            return Err(ShortenerError::InvalidUrl(
                "URL must not contain control characters".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, params: ShortenParams) -> Result<CreatedUrl, ShortenerError> {
        Self::validate_url(&params.original_url)?;

        let short_code: ShortCode = match params.custom_code {
            Some(code) => code,
            None => self.generator.generate(),
        };
        debug!(code = %short_code, "storing new short url");

        let record = self
            .repository
            .insert(NewUrl {
                short_code,
                original_url: params.original_url,
                expires_at: params.expires_at,
            })
            .await?;

        info!(code = %record.short_code, "short url created");
        Ok(CreatedUrl {
            short_url: record.short_code.to_url(&self.base_url),
            short_code: record.short_code,
        })
    }

    async fn stats(&self) -> Result<Stats, ShortenerError> {
        Ok(self.repository.stats().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::{SignedDuration, Timestamp};
    use shortlink_core::{ReadRepository, StorageError};
    use shortlink_generator::{RandomGenerator, SequenceGenerator};
    use shortlink_storage::InMemoryRepository;

    const BASE_URL: &str = "http://localhost:8080";

    fn test_service() -> (
        ShortenerService<InMemoryRepository, SequenceGenerator>,
        Arc<InMemoryRepository>,
    ) {
        let repo = Arc::new(InMemoryRepository::new());
        let service =
            ShortenerService::new(Arc::clone(&repo), SequenceGenerator::with_prefix("sl"), BASE_URL);
        (service, repo)
    }

    fn params(url: &str, custom: Option<&str>) -> ShortenParams {
        ShortenParams {
            original_url: url.to_string(),
            custom_code: custom.map(|c| ShortCode::custom(c).unwrap()),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn shorten_with_generated_code() {
        let (service, repo) = test_service();

        let created = service.shorten(params("https://example.com", None)).await.unwrap();

        assert_eq!(created.short_code.as_str(), "sl000000");
        assert_eq!(created.short_url, "http://localhost:8080/sl000000");

        let stored = repo.get_by_code(&created.short_code).await.unwrap();
        assert_eq!(stored.original_url, "https://example.com");
        assert_eq!(stored.clicks, 0);
    }

    #[tokio::test]
    async fn shorten_with_random_generator_uses_configured_length() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ShortenerService::new(repo, RandomGenerator::new(6).unwrap(), BASE_URL);

        let created = service.shorten(params("https://example.com", None)).await.unwrap();

        assert_eq!(created.short_code.len(), 6);
        assert!(created
            .short_code
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(created.short_url, format!("{BASE_URL}/{}", created.short_code));
    }

    #[tokio::test]
    async fn shorten_with_custom_code() {
        let (service, _) = test_service();

        let created = service
            .shorten(params("https://example.com", Some("my-link")))
            .await
            .unwrap();

        assert_eq!(created.short_code.as_str(), "my-link");
        assert_eq!(created.short_url, "http://localhost:8080/my-link");
    }

    #[tokio::test]
    async fn reused_custom_code_conflicts_without_overwrite() {
        let (service, repo) = test_service();

        service
            .shorten(params("https://first.example", Some("taken")))
            .await
            .unwrap();
        let err = service
            .shorten(params("https://second.example", Some("taken")))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::Conflict(ref code) if code == "taken"));
        let stored = repo.get_by_code(&ShortCode::custom("taken").unwrap()).await.unwrap();
        assert_eq!(stored.original_url, "https://first.example");
    }

    #[tokio::test]
    async fn colliding_generated_code_conflicts() {
        let repo = Arc::new(InMemoryRepository::new());
        let first = ShortenerService::new(
            Arc::clone(&repo),
            SequenceGenerator::with_prefix("dup"),
            BASE_URL,
        );
        let second = ShortenerService::new(repo, SequenceGenerator::with_prefix("dup"), BASE_URL);

        first.shorten(params("https://a.example", None)).await.unwrap();
        let err = second.shorten(params("https://b.example", None)).await.unwrap_err();

        assert!(matches!(err, ShortenerError::Conflict(_)));
    }

    #[tokio::test]
    async fn empty_url_is_rejected() {
        let (service, repo) = test_service();

        for url in ["", "   "] {
            let err = service.shorten(params(url, None)).await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidUrl(_)));
        }
        assert_eq!(repo.stats().await.unwrap(), Stats::default());
    }

    #[tokio::test]
    async fn url_with_control_characters_is_rejected() {
        let (service, repo) = test_service();

        for url in [
            "https://example.com/a\nb",
            "https://example.com/\r",
            "https://example.com/\u{7f}",
        ] {
            let err = service.shorten(params(url, Some("ctl"))).await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidUrl(_)), "{url:?}");
        }
        assert_eq!(repo.stats().await.unwrap(), Stats::default());
    }

    #[tokio::test]
    async fn url_is_stored_verbatim() {
        let (service, repo) = test_service();

        let created = service.shorten(params("not a url", None)).await.unwrap();

        let stored = repo.get_by_code(&created.short_code).await.unwrap();
        assert_eq!(stored.original_url, "not a url");
    }

    #[tokio::test]
    async fn expires_at_is_persisted() {
        let (service, repo) = test_service();
        let expires_at = Timestamp::now() + SignedDuration::from_hours(24);

        let created = service
            .shorten(ShortenParams {
                original_url: "https://example.com".to_string(),
                custom_code: None,
                expires_at: Some(expires_at),
            })
            .await
            .unwrap();

        let stored = repo.get_by_code(&created.short_code).await.unwrap();
        assert_eq!(stored.expires_at, Some(expires_at));
    }

    #[tokio::test]
    async fn stats_reflect_store() {
        let (service, repo) = test_service();
        assert_eq!(service.stats().await.unwrap(), Stats::default());

        let created = service.shorten(params("https://a.example", None)).await.unwrap();
        service.shorten(params("https://b.example", None)).await.unwrap();
        repo.increment_clicks(&created.short_code).await.unwrap();

        assert_eq!(
            service.stats().await.unwrap(),
            Stats {
                total_urls: 2,
                total_clicks: 1
            }
        );
    }

    #[test]
    fn storage_errors_convert() {
        assert!(matches!(
            ShortenerError::from(StorageError::Conflict("x".into())),
            ShortenerError::Conflict(_)
        ));
        assert!(matches!(
            ShortenerError::from(StorageError::Unavailable("down".into())),
            ShortenerError::Storage(StorageError::Unavailable(_))
        ));
    }
}
