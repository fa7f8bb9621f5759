//! HTTP handlers for the Shipyard server.

use std::fmt;

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use shipyard_core::{
    CatalogService, PageParams, Result, Ship, ShipFilter, ShipPatch, ShipyardError, parse_ship_id,
};

use crate::openapi::ApiDoc;

#[derive(Clone)]
/// Shared application state for handlers.
pub struct AppState {
    /// Catalog over the configured store.
    pub catalog: CatalogService,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

/// Map a catalog error onto its HTTP status.
pub fn error_response(err: &ShipyardError) -> HttpResponse {
    let body = ErrorResponse {
        message: err.to_string(),
    };
    if err.is_client_fault() {
        return HttpResponse::BadRequest().json(body);
    }
    match err {
        ShipyardError::NotFound(_) => HttpResponse::NotFound().json(body),
        _ => {
            log::error!("{err}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn bad_request<E: fmt::Debug + fmt::Display + 'static>(err: E) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse {
        message: err.to_string(),
    });
    InternalError::from_response(err, response).into()
}

/// Query extractor settings that report malformed parameters as 400.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err: QueryPayloadError, _req: &HttpRequest| bad_request(err))
}

/// JSON extractor settings that report malformed bodies as 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| bad_request(err))
}

/// Register the catalog endpoints and extractor settings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .app_data(json_config())
        .service(list_ships)
        .service(count_ships)
        .service(create_ship)
        .service(get_ship)
        .service(update_ship)
        .service(delete_ship)
        .service(openapi_json);
}

async fn blocking<T, F>(job: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(job).await.map_err(ShipyardError::storage)?
}

fn respond<T: Serialize>(result: Result<T>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    get,
    path = "/ships",
    params(ShipFilter, PageParams),
    responses(
        (status = 200, description = "One page of matching ships", body = [Ship]),
        (status = 400, description = "Malformed parameter", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships")]
/// List ships matching the filter, sorted and paged.
pub async fn list_ships(
    state: web::Data<AppState>,
    filter: web::Query<ShipFilter>,
    paging: web::Query<PageParams>,
) -> impl Responder {
    let catalog = state.catalog.clone();
    let filter = filter.into_inner();
    let paging = paging.into_inner();
    respond(
        blocking(move || {
            let predicate = filter.predicate()?;
            let page = paging.page_request()?;
            catalog.list(&predicate, &page)
        })
        .await,
    )
}

#[utoipa::path(
    get,
    path = "/ships/count",
    params(ShipFilter),
    responses(
        (status = 200, description = "Number of matching ships", body = u64),
        (status = 400, description = "Malformed parameter", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/count")]
/// Count ships matching the filter.
pub async fn count_ships(
    state: web::Data<AppState>,
    filter: web::Query<ShipFilter>,
) -> impl Responder {
    let catalog = state.catalog.clone();
    let filter = filter.into_inner();
    respond(blocking(move || catalog.count(&filter.predicate()?)).await)
}

#[utoipa::path(
    post,
    path = "/ships",
    request_body = ShipPatch,
    responses(
        (status = 200, description = "Created ship", body = Ship),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships")]
/// Create a ship.
pub async fn create_ship(
    state: web::Data<AppState>,
    payload: web::Json<ShipPatch>,
) -> impl Responder {
    let catalog = state.catalog.clone();
    let patch = payload.into_inner();
    respond(blocking(move || catalog.create(patch)).await)
}

#[utoipa::path(
    get,
    path = "/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    responses(
        (status = 200, description = "Stored ship", body = Ship),
        (status = 400, description = "Invalid identifier", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[get("/rest/ships/{id}")]
/// Fetch a ship.
pub async fn get_ship(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_ship_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let catalog = state.catalog.clone();
    respond(blocking(move || catalog.get(id)).await)
}

#[utoipa::path(
    post,
    path = "/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    request_body = ShipPatch,
    responses(
        (status = 200, description = "Updated ship", body = Ship),
        (status = 400, description = "Invalid identifier or field", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[post("/rest/ships/{id}")]
/// Overwrite the supplied fields of a ship.
pub async fn update_ship(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ShipPatch>,
) -> impl Responder {
    let id = match parse_ship_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let catalog = state.catalog.clone();
    let patch = payload.into_inner();
    respond(blocking(move || catalog.update(id, patch)).await)
}

#[utoipa::path(
    delete,
    path = "/ships/{id}",
    params(
        ("id" = i64, Path, description = "Ship identifier")
    ),
    responses(
        (status = 200, description = "Ship deleted"),
        (status = 400, description = "Invalid identifier", body = ErrorResponse),
        (status = 404, description = "Ship not found", body = ErrorResponse)
    ),
    tag = "ships"
)]
#[delete("/rest/ships/{id}")]
/// Delete a ship.
pub async fn delete_ship(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_ship_id(&path.into_inner()) {
        Ok(id) => id,
        Err(err) => return error_response(&err),
    };
    let catalog = state.catalog.clone();
    match blocking(move || catalog.delete(id)).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(err) => error_response(&err),
    }
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/rest/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::ServiceResponse;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use shipyard_core::start_of_year;

    fn millis(year: i32) -> i64 {
        start_of_year(year).expect("year").timestamp_millis()
    }

    fn ship_json(
        name: &str,
        ship_type: &str,
        year: i32,
        is_used: bool,
        speed: f64,
        crew_size: i32,
    ) -> Value {
        json!({
            "name": name,
            "planet": "Earth",
            "shipType": ship_type,
            "prodDate": millis(year),
            "isUsed": is_used,
            "speed": speed,
            "crewSize": crew_size,
        })
    }

    fn seeded_catalog() -> CatalogService {
        let catalog = CatalogService::in_memory();
        let fleet = [
            ship_json("Atlas", "TRANSPORT", 2990, true, 0.31, 12),
            ship_json("Borealis", "MILITARY", 3005, false, 0.77, 900),
            ship_json("Cygnus", "MERCHANT", 2850, false, 0.5, 45),
            ship_json("Draco", "MILITARY", 3019, true, 0.99, 3),
            ship_json("Eridanus", "TRANSPORT", 2999, false, 0.05, 7000),
        ];
        for ship in fleet {
            let patch: ShipPatch = serde_json::from_value(ship).expect("payload");
            catalog.create(patch).expect("seed ship");
        }
        catalog
    }

    macro_rules! app {
        ($catalog:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState { catalog: $catalog }))
                    .configure(configure),
            )
            .await
        };
    }

    async fn message(resp: ServiceResponse) -> String {
        let body: ErrorResponse = test::read_body_json(resp).await;
        body.message
    }

    #[actix_web::test]
    async fn create_defaults_usage_and_computes_rating() {
        let app = app!(CatalogService::in_memory());
        let req = test::TestRequest::post()
            .uri("/rest/ships")
            .set_json(json!({
                "name": "X",
                "planet": "Y",
                "shipType": "MILITARY",
                "prodDate": millis(2900),
                "speed": 0.5,
                "crewSize": 100
            }))
            .to_request();
        let ship: Ship = test::call_and_read_body_json(&app, req).await;

        assert_eq!(ship.id, 1);
        assert!(!ship.is_used);
        assert_eq!(ship.rating, 0.33);

        let req = test::TestRequest::get().uri("/rest/ships/1").to_request();
        let fetched: Ship = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, ship);
    }

    #[actix_web::test]
    async fn create_with_missing_or_invalid_fields_is_bad_request() {
        let app = app!(CatalogService::in_memory());
        let req = test::TestRequest::post()
            .uri("/rest/ships")
            .set_json(json!({ "name": "X", "planet": "Y" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(message(resp).await.contains("shipType"));

        let mut payload = ship_json("X", "MERCHANT", 3000, false, 0.5, 10);
        payload["speed"] = json!(1.5);
        let req = test::TestRequest::post()
            .uri("/rest/ships")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(message(resp).await.starts_with("speed"));
    }

    #[actix_web::test]
    async fn malformed_body_is_bad_request() {
        let app = app!(CatalogService::in_memory());
        let req = test::TestRequest::post()
            .uri("/rest/ships")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"shipType":"YACHT"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(!message(resp).await.is_empty());
    }

    #[actix_web::test]
    async fn identifiers_are_validated() {
        let app = app!(seeded_catalog());
        let uris = [
            "/rest/ships/abc",
            "/rest/ships/0",
            "/rest/ships/-4",
            "/rest/ships/1.5",
            "/rest/ships/%201",
            "/rest/ships/1%20",
        ];
        for uri in uris {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }

        let req = test::TestRequest::get().uri("/rest/ships/99").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(message(resp).await, "ship 99 not found");
    }

    #[actix_web::test]
    async fn update_merges_supplied_fields() {
        let app = app!(seeded_catalog());
        let req = test::TestRequest::get().uri("/rest/ships/1").to_request();
        let before: Ship = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/rest/ships/1")
            .set_json(json!({ "speed": 0.5 }))
            .to_request();
        let updated: Ship = test::call_and_read_body_json(&app, req).await;

        assert_eq!(updated.speed, 0.5);
        assert_eq!(updated.name, before.name);
        assert_eq!(updated.prod_date, before.prod_date);
        assert_eq!(updated.is_used, before.is_used);
        assert_eq!(updated.crew_size, before.crew_size);
        assert_eq!(
            updated.rating,
            shipyard_core::compute_rating(0.5, before.is_used, before.prod_year())
        );
    }

    #[actix_web::test]
    async fn update_validates_before_lookup() {
        let app = app!(seeded_catalog());

        let req = test::TestRequest::post()
            .uri("/rest/ships/77")
            .set_json(json!({ "crewSize": 0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/rest/ships/77")
            .set_json(json!({ "crewSize": 10 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/rest/ships/zero")
            .set_json(json!({ "crewSize": 10 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn delete_returns_empty_ok_then_not_found() {
        let app = app!(seeded_catalog());

        let req = test::TestRequest::delete()
            .uri("/rest/ships/2")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(test::read_body(resp).await.is_empty());

        let req = test::TestRequest::delete()
            .uri("/rest/ships/2")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/rest/ships/count")
            .to_request();
        let count: u64 = test::call_and_read_body_json(&app, req).await;
        assert_eq!(count, 4);
    }

    #[actix_web::test]
    async fn list_applies_filters_sort_and_paging() {
        let app = app!(seeded_catalog());

        let req = test::TestRequest::get().uri("/rest/ships").to_request();
        let ships: Vec<Ship> = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<i64> = ships.iter().map(|ship| ship.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let req = test::TestRequest::get()
            .uri("/rest/ships?order=SPEED&pageNumber=1&pageSize=2")
            .to_request();
        let ships: Vec<Ship> = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = ships.iter().map(|ship| ship.name.as_str()).collect();
        assert_eq!(names, vec!["Cygnus", "Borealis"]);

        let req = test::TestRequest::get()
            .uri("/rest/ships?shipType=MILITARY&isUsed=false&pageSize=10")
            .to_request();
        let ships: Vec<Ship> = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = ships.iter().map(|ship| ship.name.as_str()).collect();
        assert_eq!(names, vec!["Borealis"]);

        let req = test::TestRequest::get()
            .uri("/rest/ships?pageNumber=5&pageSize=3")
            .to_request();
        let ships: Vec<Ship> = test::call_and_read_body_json(&app, req).await;
        assert!(ships.is_empty());
    }

    #[actix_web::test]
    async fn count_matches_listing() {
        let app = app!(seeded_catalog());
        for query in ["", "name=a", "minSpeed=0.3&maxCrewSize=1000", "planet=mars"] {
            let req = test::TestRequest::get()
                .uri(&format!("/rest/ships/count?{query}"))
                .to_request();
            let count: u64 = test::call_and_read_body_json(&app, req).await;

            let req = test::TestRequest::get()
                .uri(&format!("/rest/ships?{query}&pageSize=100"))
                .to_request();
            let ships: Vec<Ship> = test::call_and_read_body_json(&app, req).await;
            assert_eq!(count, ships.len() as u64, "{query}");
        }
    }

    #[actix_web::test]
    async fn malformed_query_parameters_are_bad_request() {
        let app = app!(CatalogService::in_memory());
        for uri in [
            "/rest/ships?minSpeed=fast",
            "/rest/ships?order=NAME",
            "/rest/ships?pageSize=0",
            "/rest/ships/count?isUsed=maybe",
            "/rest/ships/count?shipType=YACHT",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert!(!message(resp).await.is_empty(), "{uri}");
        }
    }

    #[actix_web::test]
    async fn non_finite_range_bounds_are_bad_request() {
        let app = app!(seeded_catalog());
        for (uri, field) in [
            ("/rest/ships?minSpeed=NaN", "minSpeed"),
            ("/rest/ships/count?minSpeed=NaN", "minSpeed"),
            ("/rest/ships?maxRating=inf", "maxRating"),
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert!(message(resp).await.starts_with(field), "{uri}");
        }
    }

    #[actix_web::test]
    async fn storage_failures_are_internal_errors() {
        let resp = error_response(&ShipyardError::storage("pool exhausted"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = error_response(&ShipyardError::IncompleteInput("missing".to_string()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = error_response(&ShipyardError::NotFound(3));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn openapi_endpoint_serves_document() {
        let app = app!(CatalogService::in_memory());
        let req = test::TestRequest::get()
            .uri("/rest/openapi.json")
            .to_request();
        let doc: Value = test::call_and_read_body_json(&app, req).await;
        assert!(doc["paths"]["/ships/{id}"].is_object());
    }
}
