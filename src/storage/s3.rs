//! S3 object storage backend.

use anyhow::{Context, Result as AnyResult};
use aws_sdk_s3 as s3;
use s3::config::Region;
use s3::primitives::ByteStream;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::S3Settings;
use crate::errors::Result;

/// Suffix for in-flight downloads. It never decodes as a backup name, so
/// a leftover partial file can not be listed, selected, or cleaned up as
/// if it were a real artifact.
const PART_SUFFIX: &str = ".part";

#[derive(Debug)]
pub struct S3Backend {
    settings: S3Settings,
}

impl S3Backend {
    pub fn new(settings: S3Settings) -> Self {
        S3Backend { settings }
    }

    async fn client(&self) -> s3::Client {
        let mut loader = aws_config::defaults(s3::config::BehaviorVersion::latest());
        if let Some(profile) = &self.settings.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = &self.settings.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(region) = &self.settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        s3::Client::new(&loader.load().await)
    }

    /// All object keys in the bucket, following continuation tokens.
    pub async fn list(&self) -> Result<Vec<String>> {
        let client = self.client().await;
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = client.list_objects_v2().bucket(&self.settings.bucket);
            if let Some(token) = &continuation {
                request = request.continuation_token(token);
            }
            let response = request.send().await.with_context(|| {
                format!("Failed to list objects in bucket {}", self.settings.bucket)
            })?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }

            match response.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        Ok(keys)
    }

    pub async fn upload(&self, file: &Path, key: &str) -> Result<()> {
        let client = self.client().await;
        let body = stream_from_path(file).await?;

        client
            .put_object()
            .bucket(&self.settings.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to upload {} to s3://{}/{}",
                    file.display(),
                    self.settings.bucket,
                    key
                )
            })?;
        Ok(())
    }

    /// Streams the object to `<key>.part` and renames it into place only
    /// once the whole body has arrived, so an interrupted download never
    /// leaves a file that looks like a complete backup.
    pub async fn download(&self, key: &str, dest_dir: &Path) -> Result<PathBuf> {
        let dest = dest_dir.join(key);
        let part = dest_dir.join(format!("{}{}", key, PART_SUFFIX));

        if let Err(e) = self.stream_object(key, &part).await {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }

        tokio::fs::rename(&part, &dest)
            .await
            .with_context(|| format!("Failed to move download into place at {}", dest.display()))?;
        Ok(dest)
    }

    async fn stream_object(&self, key: &str, part: &Path) -> Result<()> {
        let client = self.client().await;

        let mut object = client
            .get_object()
            .bucket(&self.settings.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| {
                format!("Failed to get object s3://{}/{}", self.settings.bucket, key)
            })?;

        let mut output = File::create(part)
            .await
            .with_context(|| format!("Failed to create destination file {}", part.display()))?;

        while let Some(chunk) = object
            .body
            .try_next()
            .await
            .with_context(|| format!("Failed while streaming s3://{}/{}", self.settings.bucket, key))?
        {
            output
                .write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write to {}", part.display()))?;
        }

        output
            .flush()
            .await
            .with_context(|| format!("Failed to flush {}", part.display()))?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let client = self.client().await;
        client
            .delete_object()
            .bucket(&self.settings.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| {
                format!("Failed to delete s3://{}/{}", self.settings.bucket, key)
            })?;
        Ok(())
    }
}

async fn stream_from_path(file: &Path) -> AnyResult<ByteStream> {
    ByteStream::from_path(file)
        .await
        .with_context(|| format!("Failed to read file for upload: {}", file.display()))
}
