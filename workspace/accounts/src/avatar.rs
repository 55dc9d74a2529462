use std::path::Path;

use uuid::Uuid;

/// Directory (relative to the media root) that avatar uploads land in.
pub const AVATAR_UPLOAD_DIR: &str = "uploads/avatar/image";

/// Build the storage path for an uploaded avatar.
///
/// The original file name is replaced by a fresh UUID so uploads never
/// collide; only the extension (with its dot) is kept.
pub fn avatar_image_file_path(filename: &str) -> String {
    let extension = Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    format!("{}/{}{}", AVATAR_UPLOAD_DIR, Uuid::new_v4(), extension)
}
