//! Notes REST API: create, list, read, update and delete notes.
//!
//! Lists can be scoped to one owner with `?userId=` or via
//! `/api/users/{user_id}/notes`.

use actix_web::{web, HttpResponse, Responder};
use notes_types::{
    CreateNoteRequest, CreateNoteResponse, ErrorResponse, MessageResponse, NotesQuery,
    NotesResponse, UpdateNoteRequest,
};

use crate::notes::NoteError;
use crate::AppState;

/// Map a service error to a response: 404 for a missing note, otherwise a
/// logged 500 with a generic message.
fn error_response(e: &NoteError, context: &str) -> HttpResponse {
    if e.is_not_found() {
        return HttpResponse::NotFound().json(ErrorResponse::new("Note not found"));
    }

    log::error!("{}: {}", context, e);
    HttpResponse::InternalServerError().json(ErrorResponse::new(context))
}

/// An empty body means "no owner"; anything else must be a valid request.
fn parse_create_body(body: &[u8]) -> Result<CreateNoteRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateNoteRequest::default());
    }
    serde_json::from_slice(body)
}

/// Create a note and return the refreshed list with the new id
async fn create_note(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let user_id = match parse_create_body(&body) {
        Ok(req) => req.user_id,
        Err(e) => {
            log::debug!("Rejected create body: {}", e);
            return HttpResponse::BadRequest()
                .json(ErrorResponse::new(format!("Invalid request body: {}", e)));
        }
    };

    let note = match data.notes.create(user_id.clone()).await {
        Ok(note) => note,
        Err(e) => return error_response(&e, "Error creating note"),
    };
    log::info!("Created note {}", note.id);

    match data.notes.list(user_id).await {
        Ok(notes) => HttpResponse::Ok().json(CreateNoteResponse {
            notes,
            new_note_id: note.id,
        }),
        Err(e) => error_response(&e, "Error fetching notes"),
    }
}

/// List all notes, or one owner's notes when `?userId=` is given
async fn list_notes(data: web::Data<AppState>, query: web::Query<NotesQuery>) -> impl Responder {
    match data.notes.list(query.into_inner().user_id).await {
        Ok(notes) => HttpResponse::Ok().json(notes),
        Err(e) => error_response(&e, "Error fetching notes"),
    }
}

async fn list_user_notes(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match data.notes.list_by_user(path.into_inner()).await {
        Ok(notes) => HttpResponse::Ok().json(notes),
        Err(e) => error_response(&e, "Error fetching notes"),
    }
}

async fn get_note(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match data.notes.get_by_id(path.into_inner()).await {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(e) => error_response(&e, "Error fetching note"),
    }
}

async fn update_note(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdateNoteRequest>,
) -> impl Responder {
    let note_id = path.into_inner();
    let UpdateNoteRequest { title, text } = body.into_inner();

    match data.notes.update(note_id, title, text).await {
        Ok(_) => {
            log::debug!("Updated note {}", note_id);
            HttpResponse::Ok().json(MessageResponse::new("Updated note"))
        }
        Err(e) => error_response(&e, "Error updating note"),
    }
}

/// Delete a note and return the refreshed list
async fn delete_note(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<NotesQuery>,
) -> impl Responder {
    let note_id = path.into_inner();

    if let Err(e) = data.notes.delete(note_id).await {
        return error_response(&e, "Error deleting note");
    }
    log::info!("Deleted note {}", note_id);

    match data.notes.list(query.into_inner().user_id).await {
        Ok(notes) => HttpResponse::Ok().json(NotesResponse { notes }),
        Err(e) => error_response(&e, "Error fetching notes"),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notes")
            .route("", web::post().to(create_note))
            .route("", web::get().to(list_notes))
            .route("/{id}", web::get().to(get_note))
            .route("/{id}", web::put().to(update_note))
            .route("/{id}", web::delete().to(delete_note)),
    );
    cfg.service(web::resource("/api/users/{user_id}/notes").route(web::get().to(list_user_notes)));
}
