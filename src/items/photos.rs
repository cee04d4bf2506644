use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use crate::storage::StorageClient;

/// A photo chosen from the poster's device.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

/// `<epoch-millis>-<file name>`. Only the last path component of the name is kept.
pub fn derive_storage_key(file_name: &str, epoch_millis: i128) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("photo");
    format!("{}-{}", epoch_millis, base)
}

fn epoch_millis_now() -> i128 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

/// Uploads the photo and returns its public URL, or `None` on any failure.
///
/// Uploads never overwrite: a key that already exists in the bucket is a failure.
pub async fn upload_photo(storage: &dyn StorageClient, file: &PhotoFile) -> Option<String> {
    let key = derive_storage_key(&file.file_name, epoch_millis_now());
    match storage
        .put_object_if_absent(&key, file.body.clone(), &file.content_type)
        .await
    {
        Ok(()) => {
            let url = storage.public_url(&key);
            info!(bucket = storage.bucket(), %key, bytes = file.body.len(), "photo uploaded");
            Some(url)
        }
        Err(e) => {
            error!(error = %e, bucket = storage.bucket(), %key, "photo upload failed");
            None
        }
    }
}

/// Logs the visible buckets and whether the photo bucket is among them.
pub async fn log_bucket_diagnostics(storage: &dyn StorageClient) -> bool {
    match storage.list_buckets().await {
        Ok(buckets) => {
            let found = buckets.iter().any(|b| b == storage.bucket());
            debug!(?buckets, "buckets visible to storage client");
            if found {
                info!(bucket = storage.bucket(), "photo bucket reachable");
            } else {
                warn!(bucket = storage.bucket(), "photo bucket not found; uploads will fail");
            }
            found
        }
        Err(e) => {
            warn!(error = %e, "could not list buckets");
            false
        }
    }
}
