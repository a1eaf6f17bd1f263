// src/handlers/trip_photos.rs
// DOCUMENTATION: HTTP handlers for trip photos
// PURPOSE: Feed paging, multipart upload, likes and admin deletion

use crate::db::TravelStore;
use crate::errors::TravelError;
use crate::handlers::admin::AdminAuth;
use crate::models::{MediaType, NewTripPhoto, PhotoPageQuery};
use crate::services::{MediaStorage, PhotoService};
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use uuid::Uuid;

/// Upper bound for a plain text form field
const MAX_TEXT_FIELD_BYTES: usize = 4 * 1024;

/// File part of an upload once it is on disk
struct StoredFile {
    key: String,
    media_type: MediaType,
    mime_type: String,
    size: u64,
}

#[derive(Default)]
struct UploadForm {
    file: Option<StoredFile>,
    location_id: Option<Uuid>,
    creator_id: Option<Uuid>,
    caption: Option<String>,
    taken_at: Option<DateTime<Utc>>,
}

/// GET /trip-photos
/// One page of the feed, newest first
pub async fn list_trip_photos(
    store: web::Data<dyn TravelStore>,
    query: web::Query<PhotoPageQuery>,
) -> Result<impl Responder, TravelError> {
    let page = PhotoService::page(store.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /trip-photos/grouped
/// Same page, grouped by day
pub async fn list_trip_photos_grouped(
    store: web::Data<dyn TravelStore>,
    query: web::Query<PhotoPageQuery>,
) -> Result<impl Responder, TravelError> {
    let page = PhotoService::grouped_page(store.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /trip-photos/{id}
pub async fn get_trip_photo(
    store: web::Data<dyn TravelStore>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, TravelError> {
    let photo = store.get_trip_photo(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(photo))
}

/// POST /trip-photos
/// Multipart upload with the fields `file`, `location_id`, `creator_id`,
/// `caption` and `taken_at` (RFC 3339)
///
/// DOCUMENTATION: The file is streamed to the media directory first; it is
/// removed again if any later step fails
pub async fn upload_trip_photo(
    store: web::Data<dyn TravelStore>,
    media: web::Data<MediaStorage>,
    mut payload: Multipart,
) -> Result<impl Responder, TravelError> {
    let id = Uuid::new_v4();
    let mut form = UploadForm::default();

    if let Err(e) = read_form(&media, id, &mut payload, &mut form).await {
        if let Some(file) = &form.file {
            media.remove(&file.key).await;
        }
        return Err(e);
    }

    let file = form.file.ok_or_else(|| {
        TravelError::InvalidInput("Feld 'file' fehlt im Upload".to_string())
    })?;

    let photo = NewTripPhoto {
        id,
        location_id: form.location_id,
        creator_id: form.creator_id,
        url: media.public_url(&file.key),
        storage_key: file.key,
        media_type: file.media_type,
        mime_type: file.mime_type,
        file_size: file.size as i64,
        caption: form.caption,
        taken_at: form.taken_at,
    };

    let record = PhotoService::register_upload(store.get_ref(), &media, photo).await?;
    Ok(HttpResponse::Created().json(record))
}

async fn read_form(
    media: &MediaStorage,
    id: Uuid,
    payload: &mut Multipart,
    form: &mut UploadForm,
) -> Result<(), TravelError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| TravelError::InvalidInput(e.to_string()))?;
        let name = field.name().to_string();

        match name.as_str() {
            "file" => {
                if form.file.is_some() {
                    return Err(TravelError::InvalidInput(
                        "Nur eine Datei pro Upload erlaubt".to_string(),
                    ));
                }

                let file_name = field
                    .content_disposition()
                    .get_filename()
                    .map(str::to_string);
                let mime_type = upload_mime(&field, file_name.as_deref());
                let media_type = MediaType::from_mime(&mime_type)
                    .ok_or_else(|| TravelError::UnsupportedMediaType(mime_type.clone()))?;

                let key = MediaStorage::key_for(id, file_name.as_deref(), &mime_type);
                form.file = Some(StoredFile {
                    key: key.clone(),
                    media_type,
                    mime_type,
                    size: 0,
                });

                let size = media.write_stream(&key, &mut field).await?;
                if size == 0 {
                    return Err(TravelError::InvalidInput("Die Datei ist leer".to_string()));
                }
                if let Some(file) = form.file.as_mut() {
                    file.size = size;
                }
            }
            "location_id" => form.location_id = parse_uuid(&name, read_text(&mut field).await?)?,
            "creator_id" => form.creator_id = parse_uuid(&name, read_text(&mut field).await?)?,
            "caption" => {
                let caption = read_text(&mut field).await?;
                form.caption = Some(caption.trim().to_string()).filter(|c| !c.is_empty());
            }
            "taken_at" => {
                let raw = read_text(&mut field).await?;
                form.taken_at = match raw.trim() {
                    "" => None,
                    value => Some(
                        DateTime::parse_from_rfc3339(value)
                            .map_err(|_| {
                                TravelError::InvalidInput(format!(
                                    "Ungültiges Datum für taken_at: {}",
                                    value
                                ))
                            })?
                            .with_timezone(&Utc),
                    ),
                };
            }
            other => {
                log::debug!("Ignoring upload field '{}'", other);
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| TravelError::InvalidInput(e.to_string()))?;
                }
            }
        }
    }

    Ok(())
}

/// MIME type of the file part; falls back to the file name when the client
/// sent none or only application/octet-stream
fn upload_mime(field: &Field, file_name: Option<&str>) -> String {
    let declared = field
        .content_type()
        .map(|m| m.essence_str().to_string())
        .filter(|m| m != "application/octet-stream");

    declared
        .or_else(|| {
            file_name
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|m| m.essence_str().to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

async fn read_text(field: &mut Field) -> Result<String, TravelError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| TravelError::InvalidInput(e.to_string()))?;
        if bytes.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(TravelError::InvalidInput(format!(
                "Feld '{}' ist zu lang",
                field.name()
            )));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| {
        TravelError::InvalidInput(format!("Feld '{}' ist kein gültiges UTF-8", field.name()))
    })
}

fn parse_uuid(name: &str, raw: String) -> Result<Option<Uuid>, TravelError> {
    match raw.trim() {
        "" => Ok(None),
        value => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| TravelError::InvalidInput(format!("Ungültige UUID für {}: {}", name, value))),
    }
}

/// POST /trip-photos/{id}/like
pub async fn like_trip_photo(
    store: web::Data<dyn TravelStore>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, TravelError> {
    let response = PhotoService::like(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /trip-photos/{id}/like
pub async fn unlike_trip_photo(
    store: web::Data<dyn TravelStore>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, TravelError> {
    let response = PhotoService::unlike(store.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /trip-photos/{id}
pub async fn delete_trip_photo(
    _admin: AdminAuth,
    store: web::Data<dyn TravelStore>,
    media: web::Data<MediaStorage>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, TravelError> {
    PhotoService::delete(store.get_ref(), &media, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configuration for trip photo routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/trip-photos")
            .route("", web::get().to(list_trip_photos))
            .route("", web::post().to(upload_trip_photo))
            // before /{id} so "grouped" is not parsed as an id
            .route("/grouped", web::get().to(list_trip_photos_grouped))
            .route("/{id}", web::get().to(get_trip_photo))
            .route("/{id}", web::delete().to(delete_trip_photo))
            .route("/{id}/like", web::post().to(like_trip_photo))
            .route("/{id}/like", web::delete().to(unlike_trip_photo)),
    );
}
