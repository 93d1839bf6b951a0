use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, EventsQuery, EventsResponse};

/// Audit journal, optionally starting at position `since`.
#[get("/events/")]
pub async fn get_events(state: web::Data<AppState>, query: web::Query<EventsQuery>) -> impl Responder {
    let sale = state.sale.read().expect("lock poisoned");
    let journal = sale.journal();
    HttpResponse::Ok().json(EventsResponse {
        total: journal.len(),
        events: journal.iter().skip(query.since.unwrap_or(0)).collect(),
    })
}
