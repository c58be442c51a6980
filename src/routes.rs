use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::require_authorization;
use crate::balance::compute_balances;
use crate::config::AppConfig;
use crate::error::AppResult;
use crate::schemas::{AdvanceView, ExpenseView, NewAdvance, NewExpense, NewMember, Trip, TripView};
use crate::settlement::settle_trip;
use crate::store::TripStore;

#[derive(Deserialize, Serialize)]
struct TripNameJson {
    name: String,
}

fn authorize(request: &HttpRequest, config: &AppConfig) -> AppResult<()> {
    let level = require_authorization(request, config.bot_token.as_deref())?;
    info!(?level, path = %request.path(), "authorized");
    Ok(())
}

#[put("/trips/{id}")]
async fn add_trip(
    request: HttpRequest,
    config: web::Data<AppConfig>,
    store: web::Data<TripStore>,
    id: web::Path<String>,
    json: web::Json<TripNameJson>,
) -> AppResult<HttpResponse> {
    authorize(&request, &config)?;
    let trip = Trip::new(id.into_inner(), json.into_inner().name);
    store.create(&trip).await?;
    Ok(HttpResponse::Ok().body("Trip added"))
}

#[get("/trips")]
async fn list_trips(store: web::Data<TripStore>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(store.list().await?))
}

#[get("/trips/{id}")]
async fn get_trip(store: web::Data<TripStore>, id: web::Path<String>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(TripView::from(store.find(&id).await?)))
}

#[post("/trips/{id}/members")]
async fn add_member(
    request: HttpRequest,
    config: web::Data<AppConfig>,
    store: web::Data<TripStore>,
    id: web::Path<String>,
    member: web::Json<NewMember>,
) -> AppResult<HttpResponse> {
    authorize(&request, &config)?;
    let trip = store.find(&id).await?;
    let member = trip.admit_member(member.into_inner())?;
    store.push_member(&trip.id, &member).await?;
    Ok(HttpResponse::Ok().json(member))
}

#[delete("/trips/{id}/members/{member}")]
async fn remove_member(
    request: HttpRequest,
    config: web::Data<AppConfig>,
    store: web::Data<TripStore>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    authorize(&request, &config)?;
    let (trip_id, member_id) = path.into_inner();
    store.mark_member_left(&trip_id, &member_id).await?;
    Ok(HttpResponse::Ok().body("Member left"))
}

#[post("/trips/{id}/expenses")]
async fn add_expense(
    request: HttpRequest,
    config: web::Data<AppConfig>,
    store: web::Data<TripStore>,
    id: web::Path<String>,
    expense: web::Json<NewExpense>,
) -> AppResult<HttpResponse> {
    authorize(&request, &config)?;
    let trip = store.find(&id).await?;
    let expense = trip.record_expense(expense.into_inner())?;
    store.push_expense(&trip.id, &expense).await?;
    Ok(HttpResponse::Ok().json(ExpenseView::from(expense)))
}

#[delete("/trips/{id}/expenses/{expense}")]
async fn delete_expense(
    request: HttpRequest,
    config: web::Data<AppConfig>,
    store: web::Data<TripStore>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    authorize(&request, &config)?;
    let (trip_id, expense_id) = path.into_inner();
    store.delete_expense(&trip_id, &expense_id).await?;
    Ok(HttpResponse::Ok().body("Expense deleted"))
}

#[post("/trips/{id}/advances")]
async fn add_advance(
    request: HttpRequest,
    config: web::Data<AppConfig>,
    store: web::Data<TripStore>,
    id: web::Path<String>,
    advance: web::Json<NewAdvance>,
) -> AppResult<HttpResponse> {
    authorize(&request, &config)?;
    let trip = store.find(&id).await?;
    let advance = trip.record_advance(advance.into_inner())?;
    store.push_advance(&trip.id, &advance).await?;
    Ok(HttpResponse::Ok().json(AdvanceView::from(advance)))
}

#[delete("/trips/{id}/advances/{advance}")]
async fn delete_advance(
    request: HttpRequest,
    config: web::Data<AppConfig>,
    store: web::Data<TripStore>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    authorize(&request, &config)?;
    let (trip_id, advance_id) = path.into_inner();
    store.delete_advance(&trip_id, &advance_id).await?;
    Ok(HttpResponse::Ok().body("Advance deleted"))
}

#[get("/trips/{id}/balance")]
async fn get_balance(store: web::Data<TripStore>, id: web::Path<String>) -> AppResult<HttpResponse> {
    let trip = store.find(&id).await?;
    let balances = compute_balances(&trip.expenses, &trip.advances, &trip.members);
    Ok(HttpResponse::Ok().json(balances.member_balances))
}

#[get("/trips/{id}/settlement")]
async fn get_settlement(store: web::Data<TripStore>, id: web::Path<String>) -> AppResult<HttpResponse> {
    let trip = store.find(&id).await?;
    Ok(HttpResponse::Ok().json(settle_trip(&trip)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_trips)
        .service(add_trip)
        .service(get_trip)
        .service(add_member)
        .service(remove_member)
        .service(add_expense)
        .service(delete_expense)
        .service(add_advance)
        .service(delete_advance)
        .service(get_balance)
        .service(get_settlement);
}
