use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info, warn};
use std::time::Instant;

use super::error_response;
use super::models::{AppState, PurchaseRequest, QuoteQuery, QuoteResponse};

/// Price `amount` at time `at` (defaults to the clock). Read-only.
#[get("/quote/")]
pub async fn get_quote(state: web::Data<AppState>, query: web::Query<QuoteQuery>) -> impl Responder {
    let Ok(amount) = query.amount.trim().parse::<u128>() else {
        return HttpResponse::BadRequest().body("amount must be a non-negative integer");
    };
    let at = query.at.unwrap_or_else(|| state.now());

    let sale = state.sale.read().expect("lock poisoned");
    let step = sale.current_step(at);
    let quote = sale
        .current_rate(at)
        .and_then(|rate| sale.tokens_for(amount, at).map(|tokens| (rate, tokens)));

    match quote {
        Ok((rate, tokens)) => {
            debug!("GET /quote/ - amount={amount} at={at} step={step} rate={rate} -> {tokens}");
            HttpResponse::Ok().json(QuoteResponse {
                amount,
                at,
                step,
                rate,
                usd_rate: sale.schedule().usd_rate(),
                tokens,
            })
        }
        Err(e) => error_response(&e),
    }
}

/// Process a validated payment at the current clock time.
#[post("/purchase/")]
pub async fn post_purchase(
    state: web::Data<AppState>,
    body: web::Json<PurchaseRequest>,
) -> impl Responder {
    let t0 = Instant::now();
    let now = state.now();

    let result = {
        let mut sale = state.sale.write().expect("lock poisoned");
        sale.buy_tokens(&body.beneficiary, body.amount, now)
    };

    match result {
        Ok(purchase) => {
            info!(
                "POST /purchase/ - {} bought {} tokens at step {} ({} ms)",
                purchase.beneficiary,
                purchase.tokens,
                purchase.step,
                t0.elapsed().as_millis()
            );
            HttpResponse::Ok().json(purchase)
        }
        Err(e) => {
            warn!(
                "POST /purchase/ - rejected beneficiary={:?} amount={}: {}",
                body.beneficiary, body.amount, e
            );
            error_response(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use crate::api::models::AppState;
    use crate::api::{init_routes, test_support};

    fn stepped_state(clock: fn() -> u64) -> web::Data<AppState> {
        let mut sale = test_support::sale();
        sale.add_step(1500, 900).unwrap();
        sale.set_step_rate(1, 10, 900).unwrap();
        web::Data::new(AppState::with_clock(sale, clock))
    }

    #[actix_web::test]
    async fn quote_follows_the_step_schedule() {
        let state = stepped_state(|| 1200);
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/quote/?amount=100")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["step"], 1);
        assert_eq!(body["rate"], 10);
        assert_eq!(body["tokens"], 10);

        let req = test::TestRequest::get()
            .uri("/api/v1/quote/?amount=100&at=1800")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["step"], 2);
        assert_eq!(body["rate"], 5);
        assert_eq!(body["tokens"], 20);
    }

    #[actix_web::test]
    async fn quote_reports_overflow_and_bad_amount() {
        let state = stepped_state(|| 1200);
        state.sale.write().unwrap().set_usd_rate(u128::MAX, 900);
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/quote/?amount=100")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::get()
            .uri("/api/v1/quote/?amount=-1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn purchase_updates_totals_and_journal() {
        let state = stepped_state(|| 1800);
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/purchase/")
            .set_json(json!({ "beneficiary": "alice", "amount": 100 }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["tokens"], 20);
        assert_eq!(body["step"], 2);

        let sale = state.sale.read().unwrap();
        assert_eq!(sale.raised(), 100);
        assert_eq!(sale.tokens_sold(), 20);
        assert_eq!(sale.journal().len(), 3);
    }

    #[actix_web::test]
    async fn purchase_after_close_is_forbidden() {
        let state = stepped_state(|| 2500);
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(init_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/purchase/")
            .set_json(json!({ "beneficiary": "alice", "amount": 100 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(state.sale.read().unwrap().raised(), 0);
    }
}
