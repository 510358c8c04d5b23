use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use actix_multipart::{Field, Multipart};
use actix_web::web;
use futures::TryStreamExt;
use futures_util::StreamExt;
use log::{debug, warn};
use uuid::Uuid;

use super::error::ProxyError;

const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;
const DEFAULT_FILENAME: &str = "upload.jpg";

/// An uploaded file spooled to disk for the lifetime of one request.
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: u64,
}

impl TempUpload {
    fn new(dir: &Path, filename: Option<String>, content_type: Option<String>) -> Self {
        let filename = filename
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let extension = Path::new(&filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        Self {
            path: dir.join(format!("upload-{}{}", Uuid::new_v4(), extension)),
            filename,
            content_type,
            size: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the spooled bytes back on the blocking pool.
    pub async fn read(&self) -> Result<Vec<u8>, ProxyError> {
        let path = self.path.clone();
        Ok(web::block(move || std::fs::read(path)).await??)
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temp upload {}", self.path.display()),
            Err(e) => warn!("Failed to cleanup temp file {}: {}", self.path.display(), e),
        }
    }
}

/// Fields of a multipart prediction request.
#[derive(Debug, Default)]
pub struct PredictForm {
    pub mode: Option<String>,
    pub answers: Option<String>,
    pub file: Option<TempUpload>,
}

pub async fn parse_predict_form(
    mut payload: Multipart,
    upload_dir: &Path,
    max_file_bytes: u64,
) -> Result<PredictForm, ProxyError> {
    let mut form = PredictForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "mode" => form.mode = Some(read_text(&mut field, &name).await?),
            "answers" => form.answers = Some(read_text(&mut field, &name).await?),
            // Older clients send the image as `image`.
            "file" | "image" => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_string);
                let content_type = field.content_type().map(|m| m.essence_str().to_string());
                let upload = TempUpload::new(upload_dir, filename, content_type);
                form.file = Some(spool(&mut field, upload, max_file_bytes).await?);
            }
            other => {
                debug!("Ignoring multipart field '{}'", other);
                while field.try_next().await?.is_some() {}
            }
        }
    }

    Ok(form)
}

async fn read_text(field: &mut Field, name: &str) -> Result<String, ProxyError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if data.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(ProxyError::FieldTooLong(name.to_string()));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&data).into_owned())
}

async fn spool(
    field: &mut Field,
    mut upload: TempUpload,
    max_bytes: u64,
) -> Result<TempUpload, ProxyError> {
    let path = upload.path().to_path_buf();
    let mut file = web::block(move || File::create(path)).await??;
    while let Some(chunk) = field.next().await {
        let data = chunk?;
        upload.size += data.len() as u64;
        if upload.size > max_bytes {
            return Err(ProxyError::PayloadTooLarge { limit: max_bytes });
        }
        file = web::block(move || file.write_all(&data).map(|_| file)).await??;
    }
    web::block(move || file.flush()).await??;
    Ok(upload)
}

/// Content type for a spooled upload: the client's, else sniffed, else JPEG.
pub fn upload_mime(upload: &TempUpload, bytes: &[u8]) -> String {
    upload.content_type.clone().unwrap_or_else(|| {
        image::guess_format(bytes)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| "image/jpeg".to_string())
    })
}
