mod api;
mod config;
mod sale;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{info, warn};
use std::io;

use api::AppState;
use api::models::system_clock;
use config::Settings;
use sale::{Sale, SaleError};

/// Create the sale and apply the configured steps. Bad steps are skipped,
/// a bad sale definition is fatal.
fn build_sale(settings: &Settings, now: u64) -> Result<Sale, SaleError> {
    let mut sale = Sale::new(settings.sale, now)?;
    for entry in &settings.steps {
        let step = match sale.add_step(entry.due_date, now) {
            Ok(step) => step,
            Err(e) => {
                warn!("CONFIG - step due {} skipped: {}", entry.due_date, e);
                continue;
            }
        };
        if let Some(rate) = entry.rate {
            sale.set_step_rate(step, rate, now)?;
        }
    }
    Ok(sale)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let now = system_clock();
    let settings = Settings::from_env(now);
    let sale = build_sale(&settings, now)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    info!(
        "sale window [{}, {}], base rate {}, {} step(s)",
        settings.sale.opening_time,
        settings.sale.closing_time,
        settings.sale.rate,
        sale.steps().step_count()
    );
    println!(
        "📈 Starting stepped sale API at http://{}:{}",
        settings.host, settings.port
    );

    let state = web::Data::new(AppState::new(sale));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
