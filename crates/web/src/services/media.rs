//! Storage of uploaded profile images under the media directory.

use std::path::Path;

use uuid::Uuid;

use crate::forms::ProfileImage;
use crate::models::customer::DEFAULT_PROFILE_PIC;

/// Write `image` under `media_dir` with a random name and return that name.
///
/// # Errors
///
/// Returns an I/O error if the directory or file cannot be written.
pub async fn store_profile_image(
    media_dir: &Path,
    image: &ProfileImage,
    extension: &str,
) -> std::io::Result<String> {
    tokio::fs::create_dir_all(media_dir).await?;

    let file_name = format!("{}.{extension}", Uuid::new_v4().simple());
    tokio::fs::write(media_dir.join(&file_name), &image.bytes).await?;

    tracing::debug!(file = %file_name, bytes = image.bytes.len(), "profile image stored");
    Ok(file_name)
}

/// Delete a previously stored profile image.
///
/// The stock picture and names that are not plain file names are left alone.
/// Failures are logged; a missing file is not an error.
pub async fn remove_profile_image(media_dir: &Path, file_name: &str) {
    if file_name == DEFAULT_PROFILE_PIC
        || file_name.is_empty()
        || file_name.contains(['/', '\\'])
        || file_name.starts_with('.')
    {
        return;
    }

    match tokio::fs::remove_file(media_dir.join(file_name)).await {
        Ok(()) => tracing::debug!(file = %file_name, "profile image removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(file = %file_name, error = %e, "failed to remove profile image"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Bytes;

    use super::*;

    #[tokio::test]
    async fn test_store_profile_image_uses_random_name() {
        let dir = std::env::temp_dir().join(format!("order-desk-media-{}", Uuid::new_v4()));
        let image = ProfileImage {
            file_name: "../../etc/passwd.png".to_string(),
            bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
        };

        let name = store_profile_image(&dir, &image, "png").await.unwrap();
        assert!(name.ends_with(".png"));
        assert!(!name.contains('/'));
        assert_eq!(tokio::fs::read(dir.join(&name)).await.unwrap(), image.bytes);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_profile_image_deletes_stored_file() {
        let dir = std::env::temp_dir().join(format!("order-desk-media-{}", Uuid::new_v4()));
        let image = ProfileImage {
            file_name: "me.png".to_string(),
            bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
        };
        let name = store_profile_image(&dir, &image, "png").await.unwrap();

        remove_profile_image(&dir, &name).await;
        assert!(!dir.join(&name).exists());

        // Already gone: nothing to do.
        remove_profile_image(&dir, &name).await;

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_profile_image_keeps_default_and_outside_paths() {
        let dir = std::env::temp_dir().join(format!("order-desk-media-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(dir.join("nested")).await.unwrap();
        tokio::fs::write(dir.join(DEFAULT_PROFILE_PIC), b"stock").await.unwrap();
        tokio::fs::write(dir.join("nested/keep.png"), b"keep").await.unwrap();

        remove_profile_image(&dir, DEFAULT_PROFILE_PIC).await;
        remove_profile_image(&dir, "nested/keep.png").await;
        remove_profile_image(&dir, "..").await;

        assert!(dir.join(DEFAULT_PROFILE_PIC).exists());
        assert!(dir.join("nested/keep.png").exists());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
