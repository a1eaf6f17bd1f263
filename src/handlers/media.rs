// src/handlers/media.rs
// DOCUMENTATION: Serves uploaded media files
// PURPOSE: GET /media/{file_name} from the local media directory

use crate::errors::TravelError;
use crate::services::MediaStorage;
use actix_web::{http::header, web, HttpResponse, Responder};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// GET /media/{file_name}
/// DOCUMENTATION: The file is streamed from disk, so large videos are never
/// held in memory as a whole
pub async fn get_media(
    media: web::Data<MediaStorage>,
    path: web::Path<String>,
) -> Result<impl Responder, TravelError> {
    let file_name = path.into_inner();
    let file_path = media.resolve(&file_name)?;

    let file = match File::open(&file_path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(TravelError::NotFound(format!("Datei {}", file_name)));
        }
        Err(e) => {
            log::error!("Cannot open {}: {}", file_path.display(), e);
            return Err(TravelError::StorageError(e.to_string()));
        }
    };
    let size = file
        .metadata()
        .await
        .map_err(|e| {
            log::error!("Cannot stat {}: {}", file_path.display(), e);
            TravelError::StorageError(e.to_string())
        })?
        .len();

    let content_type = mime_guess::from_path(&file_name).first_or_octet_stream();

    Ok(HttpResponse::Ok()
        .content_type(content_type.essence_str())
        // keys are never reused
        .insert_header((header::CACHE_CONTROL, "public, max-age=31536000, immutable"))
        .no_chunking(size)
        .streaming(ReaderStream::new(file)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/media/{file_name}", web::get().to(get_media));
}
