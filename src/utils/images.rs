//! Writing generated images to disk.

use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::message::ImagePart;

/// Decodes each part and writes it as `lumiera-<session>-<n>.<ext>` under
/// `dir`, creating the directory when needed. Numbering skips names that
/// already exist, so repeated saves never replace earlier files.
pub async fn write_images(
    dir: &Path,
    session_id: &str,
    images: &[ImagePart],
) -> io::Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;
    let prefix: String = session_id.chars().take(8).collect();
    let mut written = Vec::with_capacity(images.len());
    let mut next = 1usize;
    for image in images {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(image.data.as_bytes())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let (path, mut file) = loop {
            let path = dir.join(format!("lumiera-{prefix}-{next}.{}", image.extension()));
            next += 1;
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => break (path, file),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(err),
            }
        };
        file.write_all(&bytes).await?;
        file.flush().await?;
        debug!(path = %path.display(), "image written");
        written.push(path);
    }
    Ok(written)
}
