use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info, warn};

use super::error_response;
use super::models::{
    AddStepRequest, AddStepResponse, AppState, RateChangeResponse, SetRateRequest,
    SetUsdRateRequest, StepInfo, StepRateResponse, StepsResponse, UsdRateResponse,
};
use crate::sale::{Sale, SaleResult};

/// Snapshot of the sale at the current clock time.
#[get("/sale/")]
pub async fn get_sale(state: web::Data<AppState>) -> impl Responder {
    let now = state.now();
    let sale = state.sale.read().expect("lock poisoned");
    match sale.summary(now) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => error_response(&e),
    }
}

/// List every step with its due date and effective rate.
#[get("/steps/")]
pub async fn get_steps(state: web::Data<AppState>) -> impl Responder {
    let now = state.now();
    let sale = state.sale.read().expect("lock poisoned");
    let table = sale.steps();
    let schedule = sale.schedule();

    // custom due dates first, then the closing step
    let steps = table
        .boundaries()
        .iter()
        .copied()
        .chain(std::iter::once(table.window().closing()))
        .enumerate()
        .map(|(idx, due_date)| -> SaleResult<StepInfo> {
            let step = (idx + 1) as u8;
            Ok(StepInfo {
                step,
                due_date,
                rate: schedule.step_rate(step)?,
                explicit_rate: schedule.explicit_rate(step).is_some(),
            })
        })
        .collect::<SaleResult<Vec<_>>>();

    match steps {
        Ok(steps) => HttpResponse::Ok().json(StepsResponse {
            step_count: table.step_count(),
            current_step: table.current_step(now),
            steps,
        }),
        Err(e) => error_response(&e),
    }
}

fn step_info(sale: &Sale, step: u8) -> SaleResult<StepInfo> {
    let schedule = sale.schedule();
    Ok(StepInfo {
        step,
        due_date: sale.steps().due_date(step)?,
        rate: schedule.step_rate(step)?,
        explicit_rate: schedule.explicit_rate(step).is_some(),
    })
}

#[get("/steps/{step}/")]
pub async fn get_step(state: web::Data<AppState>, path: web::Path<(u8,)>) -> impl Responder {
    let step = path.into_inner().0;
    let sale = state.sale.read().expect("lock poisoned");
    match step_info(&sale, step) {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(e) => error_response(&e),
    }
}

/// Step that ends exactly at `due_date` (the closing time maps to the last step).
#[get("/steps/due/{due_date}/")]
pub async fn get_step_by_due_date(
    state: web::Data<AppState>,
    path: web::Path<(u64,)>,
) -> impl Responder {
    let due_date = path.into_inner().0;
    let sale = state.sale.read().expect("lock poisoned");
    let Some(step) = sale.steps().step_of(due_date) else {
        return HttpResponse::NotFound().body(format!("no step ends at {due_date}"));
    };
    match step_info(&sale, step) {
        Ok(info) => HttpResponse::Ok().json(info),
        Err(e) => error_response(&e),
    }
}

/// Append a step ending at `due_date`. Due dates must arrive in increasing order.
#[post("/steps/")]
pub async fn add_step(
    state: web::Data<AppState>,
    body: web::Json<AddStepRequest>,
) -> impl Responder {
    let now = state.now();
    let mut sale = state.sale.write().expect("lock poisoned");
    match sale.add_step(body.due_date, now) {
        Ok(step) => {
            info!(
                "POST /steps/ - due_date={} assigned step {} (closing now step {})",
                body.due_date,
                step,
                sale.steps().step_count()
            );
            HttpResponse::Ok().json(AddStepResponse {
                step,
                due_date: body.due_date,
                step_count: sale.steps().step_count(),
            })
        }
        Err(e) => {
            warn!("POST /steps/ - rejected due_date={}: {}", body.due_date, e);
            error_response(&e)
        }
    }
}

#[get("/steps/{step}/rate/")]
pub async fn get_step_rate(state: web::Data<AppState>, path: web::Path<(u8,)>) -> impl Responder {
    let step = path.into_inner().0;
    let sale = state.sale.read().expect("lock poisoned");
    match sale.schedule().step_rate(step) {
        Ok(rate) => HttpResponse::Ok().json(StepRateResponse {
            step,
            rate,
            explicit_rate: sale.schedule().explicit_rate(step).is_some(),
        }),
        Err(e) => error_response(&e),
    }
}

#[post("/steps/{step}/rate/")]
pub async fn set_step_rate(
    state: web::Data<AppState>,
    path: web::Path<(u8,)>,
    body: web::Json<SetRateRequest>,
) -> impl Responder {
    let step = path.into_inner().0;
    let now = state.now();
    let mut sale = state.sale.write().expect("lock poisoned");
    match sale.set_step_rate(step, body.rate, now) {
        Ok(old_rate) => {
            debug!("POST /steps/{step}/rate/ - {} -> {}", old_rate, body.rate);
            HttpResponse::Ok().json(RateChangeResponse {
                old_rate,
                new_rate: body.rate,
            })
        }
        Err(e) => {
            warn!("POST /steps/{step}/rate/ - rejected: {}", e);
            error_response(&e)
        }
    }
}

#[get("/usd-rate/")]
pub async fn get_usd_rate(state: web::Data<AppState>) -> impl Responder {
    let sale = state.sale.read().expect("lock poisoned");
    HttpResponse::Ok().json(UsdRateResponse {
        usd_rate: sale.schedule().usd_rate(),
    })
}

/// Update the USD/ETH factor (price feed push).
#[post("/usd-rate/")]
pub async fn set_usd_rate(
    state: web::Data<AppState>,
    body: web::Json<SetUsdRateRequest>,
) -> impl Responder {
    let now = state.now();
    let mut sale = state.sale.write().expect("lock poisoned");
    let old_rate = sale.set_usd_rate(body.value, now);
    debug!("POST /usd-rate/ - {} -> {}", old_rate, body.value);
    HttpResponse::Ok().json(RateChangeResponse {
        old_rate,
        new_rate: body.value,
    })
}
