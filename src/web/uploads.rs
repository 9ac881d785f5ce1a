use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Allowed image extensions
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Maximum file size (10 MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Public URL prefix under which `uploads_dir` is served.
pub const UPLOADS_PREFIX: &str = "uploads/";

fn validated_extension(filename: &str) -> Result<String> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .ok_or_else(|| AppError::Validation("Nom de fichier invalide.".to_string()))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::Validation(format!(
            "Type de fichier non autorisé. Formats acceptés : {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(extension)
}

/// Save an uploaded image under a fresh UUID name.
/// Returns the public reference (e.g., "uploads/abc123.jpg")
pub async fn save_uploaded_file(
    uploads_dir: &Path,
    filename: &str,
    data: &[u8],
) -> Result<String> {
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::Validation("Fichier trop volumineux (10 Mo maximum).".to_string()));
    }

    let extension = validated_extension(filename)?;

    fs::create_dir_all(uploads_dir).await.map_err(|e| {
        AppError::Internal(format!("Failed to create uploads directory: {}", e))
    })?;

    let new_filename = format!("{}.{}", Uuid::new_v4(), extension);
    let file_path = uploads_dir.join(&new_filename);

    let mut file = fs::File::create(&file_path).await.map_err(|e| {
        AppError::Internal(format!("Failed to create file: {}", e))
    })?;

    file.write_all(data).await.map_err(|e| {
        AppError::Internal(format!("Failed to write file: {}", e))
    })?;

    Ok(format!("{}{}", UPLOADS_PREFIX, new_filename))
}

/// Disk path for a stored reference. Anything but a bare file name under
/// `uploads/` is refused so a record cannot point deletion outside the directory.
pub fn resolve_upload_path(uploads_dir: &Path, reference: &str) -> Option<PathBuf> {
    let name = reference.strip_prefix(UPLOADS_PREFIX)?;
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(file)), None) => Some(uploads_dir.join(file)),
        _ => None,
    }
}

/// Delete an uploaded file by its reference (e.g., "uploads/abc123.jpg")
pub async fn delete_uploaded_file(uploads_dir: &Path, reference: &str) -> Result<()> {
    let Some(path) = resolve_upload_path(uploads_dir, reference) else {
        return Ok(());
    };

    match fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::Internal(format!("Failed to delete file: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_validation() {
        assert_eq!(validated_extension("Pochette.JPG").unwrap(), "jpg");
        assert!(validated_extension("script.sh").is_err());
        assert!(validated_extension("noextension").is_err());
    }

    #[test]
    fn test_resolve_upload_path_refuses_traversal() {
        let dir = Path::new("/srv/uploads");
        assert_eq!(
            resolve_upload_path(dir, "uploads/a.png"),
            Some(PathBuf::from("/srv/uploads/a.png"))
        );
        assert_eq!(resolve_upload_path(dir, "uploads/../secret.png"), None);
        assert_eq!(resolve_upload_path(dir, "uploads/sub/a.png"), None);
        assert_eq!(resolve_upload_path(dir, "https://cdn.example/a.png"), None);
    }

    #[tokio::test]
    async fn test_save_then_delete() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("uploads");
        let reference = save_uploaded_file(&dir, "cover.png", b"\x89PNG").await.unwrap();
        assert!(reference.starts_with(UPLOADS_PREFIX));

        let path = resolve_upload_path(&dir, &reference).unwrap();
        assert!(path.exists());

        delete_uploaded_file(&dir, &reference).await.unwrap();
        assert!(!path.exists());
        // Second delete is a no-op.
        delete_uploaded_file(&dir, &reference).await.unwrap();
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let data = vec![0u8; MAX_FILE_SIZE + 1];
        assert!(matches!(
            save_uploaded_file(tmp.path(), "big.png", &data).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
