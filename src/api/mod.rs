mod events;
mod health;
pub mod models;
mod purchase;
mod sale;

use actix_web::HttpResponse;
use actix_web::web::{self, ServiceConfig};

use crate::sale::SaleError;

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(sale::get_sale)
            .service(sale::get_steps)
            .service(sale::get_step_by_due_date)
            .service(sale::get_step)
            .service(sale::add_step)
            .service(sale::get_step_rate)
            .service(sale::set_step_rate)
            .service(sale::get_usd_rate)
            .service(sale::set_usd_rate)
            .service(purchase::get_quote)
            .service(purchase::post_purchase)
            .service(events::get_events),
    );
}

/// Map a sale error to an HTTP response carrying its message.
fn error_response(err: &SaleError) -> HttpResponse {
    let msg = err.to_string();
    match err {
        SaleError::CapacityExceeded { .. } => HttpResponse::Conflict().body(msg),
        SaleError::ArithmeticOverflow | SaleError::DivisionByZero => {
            HttpResponse::UnprocessableEntity().body(msg)
        }
        SaleError::SaleNotOpen { .. } | SaleError::SaleClosed { .. } => {
            HttpResponse::Forbidden().body(msg)
        }
        _ => HttpResponse::BadRequest().body(msg),
    }
}
