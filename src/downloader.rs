use crate::cache::SeenIdCache;
use crate::client::ImageSource;
use crate::error::BingError;
use crate::models::{ImageRecord, image_id, is_usable_id};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Outcome of a successful [`Downloader::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ids written to the save directory, in metadata order.
    pub downloaded: Vec<String>,
    pub skipped_cached: usize,
    pub skipped_invalid: usize,
}

pub struct Downloader<S> {
    source: S,
    cache_path: PathBuf,
}

impl<S: ImageSource> Downloader<S> {
    pub fn new(source: S, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            cache_path: cache_path.into(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Download every image in the current metadata that is not in the id cache.
    ///
    /// Once the cache is loaded, pending ids are flushed on every exit path, so
    /// images written before a failure are remembered by the next run.
    pub async fn run(&self, save_dir: &Path) -> Result<RunSummary, BingError> {
        let metadata = self.source.fetch_metadata().await?;
        if metadata.images.is_empty() {
            info!("Metadata lists no images, nothing to do");
            return Ok(RunSummary::default());
        }

        let mut cache = SeenIdCache::new(&self.cache_path);
        cache.load()?;
        let mut guard = cache.flush_guard();

        let mut summary = RunSummary::default();
        let outcome = self
            .download_all(&metadata.images, save_dir, &mut guard, &mut summary)
            .await;
        let flushed = guard.finish();

        match (outcome, flushed) {
            (Err(err), Err(flush_err)) => {
                warn!("Failed to flush id cache after error: {}", flush_err);
                Err(err)
            }
            (Err(err), Ok(())) => Err(err),
            (Ok(()), flushed) => {
                flushed?;
                info!(
                    "Downloaded {} images, {} already cached, {} without usable id",
                    summary.downloaded.len(),
                    summary.skipped_cached,
                    summary.skipped_invalid
                );
                Ok(summary)
            }
        }
    }

    async fn download_all(
        &self,
        images: &[ImageRecord],
        save_dir: &Path,
        cache: &mut SeenIdCache,
        summary: &mut RunSummary,
    ) -> Result<(), BingError> {
        for record in images {
            let url = record.full_url(self.source.base_url())?;
            let id = match image_id(&url) {
                Some(id) if is_usable_id(&id) => id,
                other => {
                    warn!("Skipping {}: no usable id ({:?})", url, other);
                    summary.skipped_invalid += 1;
                    continue;
                }
            };

            if cache.contains(&id) {
                debug!("Skipping {}: already downloaded", id);
                summary.skipped_cached += 1;
                continue;
            }

            let path = self
                .download_one(&url, &id, save_dir)
                .await
                .map_err(|err| BingError::download(&id, err))?;
            info!("Saved {} to {}", id, path.display());

            cache.add(id.clone());
            summary.downloaded.push(id);
        }
        Ok(())
    }

    async fn download_one(
        &self,
        url: &url::Url,
        id: &str,
        save_dir: &Path,
    ) -> Result<PathBuf, BingError> {
        let bytes = self.source.fetch_image(url).await?;
        tokio::fs::create_dir_all(save_dir)
            .await
            .map_err(|e| BingError::io(save_dir, e))?;
        let path = save_dir.join(id);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| BingError::io(&path, e))?;
        Ok(path)
    }
}
