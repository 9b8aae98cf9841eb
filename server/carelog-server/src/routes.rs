pub mod paths;

use axum::{
    extract::Request,
    middleware::{from_fn, from_fn_with_state, Next},
    routing::{delete, get, post, put},
    Router,
};

use crate::{
    auth::{CLINIC_ONLY, CLINIC_OR_CORPORATE, INDIVIDUAL_ONLY},
    handlers::{auth, clinical, health, messages, patients, soap_notes},
    middleware::{authenticate, authorize},
    openapi,
    server::CarelogServer,
};

/// Create health check routes (no authentication required)
pub fn health_routes() -> Router<CarelogServer> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::VERSION, get(health::version_info))
}

/// Create authentication routes (token issuance; no token required)
pub fn auth_routes() -> Router<CarelogServer> {
    Router::new()
        .route(paths::auth::REGISTER, post(auth::register))
        .route(paths::auth::LOGIN, post(auth::login))
}

/// Create patient management routes (clinic only)
pub fn patient_routes() -> Router<CarelogServer> {
    Router::new()
        .route(paths::patients::PATIENTS, get(patients::list_patients))
        .route(paths::patients::PATIENTS, post(patients::register_patient))
        .route(paths::patients::PATIENT_BY_ID, get(patients::get_patient))
        .route(paths::patients::PATIENT_BY_ID, put(patients::update_patient))
        .route(paths::patients::PATIENT_BY_ID, delete(patients::archive_patient))
}

/// Create clinical note routes (clinic only; ownership-checked writes)
pub fn clinical_routes() -> Router<CarelogServer> {
    Router::new()
        // SOAP notes
        .route(paths::patients::SOAP_NOTES, get(soap_notes::list_soap_notes))
        .route(paths::patients::SOAP_NOTES, post(soap_notes::create_soap_note))
        .route(paths::patients::SOAP_NOTE_BY_ID, get(soap_notes::get_soap_note))
        .route(paths::patients::SOAP_NOTE_BY_ID, put(soap_notes::update_soap_note))
        .route(paths::patients::SOAP_NOTE_BY_ID, delete(soap_notes::delete_soap_note))
        // Examinations
        .route(paths::patients::EXAMINATIONS, get(clinical::list_examinations))
        .route(paths::patients::EXAMINATIONS, post(clinical::create_examination))
        .route(paths::patients::EXAMINATION_BY_ID, get(clinical::get_examination))
        .route(paths::patients::EXAMINATION_BY_ID, delete(clinical::delete_examination))
        // Interventions
        .route(paths::patients::INTERVENTIONS, get(clinical::list_interventions))
        .route(paths::patients::INTERVENTIONS, post(clinical::create_intervention))
        .route(paths::patients::INTERVENTION_BY_ID, get(clinical::get_intervention))
        .route(paths::patients::INTERVENTION_BY_ID, delete(clinical::delete_intervention))
        // Investigations
        .route(paths::patients::INVESTIGATIONS, get(clinical::list_investigations))
        .route(paths::patients::INVESTIGATIONS, post(clinical::create_investigation))
        .route(paths::patients::INVESTIGATION_BY_ID, get(clinical::get_investigation))
        .route(paths::patients::INVESTIGATION_BY_ID, put(clinical::update_investigation))
        .route(paths::patients::INVESTIGATION_BY_ID, delete(clinical::delete_investigation))
        // Assistant notes
        .route(paths::patients::ASSISTANT_NOTES, get(clinical::list_assistant_notes))
        .route(paths::patients::ASSISTANT_NOTES, post(clinical::create_assistant_note))
        .route(paths::patients::ASSISTANT_NOTE_BY_ID, get(clinical::get_assistant_note))
        .route(paths::patients::ASSISTANT_NOTE_BY_ID, delete(clinical::delete_assistant_note))
}

/// Create scheduled message routes (clinic only)
pub fn message_routes() -> Router<CarelogServer> {
    Router::new()
        .route(paths::messages::MESSAGES, get(messages::list_messages))
        .route(paths::messages::MESSAGES, post(messages::schedule_message))
        .route(paths::messages::MESSAGE_BY_ID, get(messages::get_message))
        .route(paths::messages::MESSAGE_BY_ID, delete(messages::cancel_message))
}

/// Create reporting routes (clinic or corporate)
pub fn reporting_routes() -> Router<CarelogServer> {
    Router::new().route(paths::patients::PATIENT_SUMMARY, get(patients::patient_summary))
}

/// Create self-service routes (individual only)
pub fn me_routes() -> Router<CarelogServer> {
    Router::new().route(paths::me::RECORD, get(patients::my_record))
}

/// Create API v1 routes.
///
/// Gate ordering per route: authenticate runs first (outermost), then the
/// group's role check, then the handler. The clinic-ownership check lives
/// inside the handlers' repository calls.
pub fn api_v1_routes(server: &CarelogServer) -> Router<CarelogServer> {
    let protected = Router::new()
        .merge(
            patient_routes()
                .merge(clinical_routes())
                .merge(message_routes())
                .route_layer(from_fn(|req: Request, next: Next| {
                    authorize(CLINIC_ONLY, req, next)
                })),
        )
        .merge(reporting_routes().route_layer(from_fn(|req: Request, next: Next| {
            authorize(CLINIC_OR_CORPORATE, req, next)
        })))
        .merge(me_routes().route_layer(from_fn(|req: Request, next: Next| {
            authorize(INDIVIDUAL_ONLY, req, next)
        })))
        .route_layer(from_fn_with_state(server.clone(), authenticate));

    Router::new().merge(auth_routes()).merge(protected)
}

/// Create all application routes
pub fn create_routes(server: &CarelogServer) -> Router<CarelogServer> {
    Router::new()
        // Health check routes (no authentication required)
        .merge(health_routes())
        // API documentation routes
        .merge(openapi::create_docs_routes())
        // API v1 routes (authentication required except /auth)
        .nest(paths::API_V1, api_v1_routes(server))
}
