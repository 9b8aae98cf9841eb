use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::server::CarelogServer;

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::handlers::health::health_check,
        crate::handlers::health::version_info,

        // Authentication endpoints
        crate::handlers::auth::register,
        crate::handlers::auth::login,

        // Patient endpoints
        crate::handlers::patients::list_patients,
        crate::handlers::patients::register_patient,
        crate::handlers::patients::get_patient,
        crate::handlers::patients::update_patient,
        crate::handlers::patients::archive_patient,
        crate::handlers::patients::patient_summary,
        crate::handlers::patients::my_record,

        // SOAP note endpoints
        crate::handlers::soap_notes::create_soap_note,
        crate::handlers::soap_notes::list_soap_notes,
        crate::handlers::soap_notes::get_soap_note,
        crate::handlers::soap_notes::update_soap_note,
        crate::handlers::soap_notes::delete_soap_note,

        // Clinical endpoints
        crate::handlers::clinical::create_examination,
        crate::handlers::clinical::list_examinations,
        crate::handlers::clinical::get_examination,
        crate::handlers::clinical::delete_examination,
        crate::handlers::clinical::create_intervention,
        crate::handlers::clinical::list_interventions,
        crate::handlers::clinical::get_intervention,
        crate::handlers::clinical::delete_intervention,
        crate::handlers::clinical::create_investigation,
        crate::handlers::clinical::list_investigations,
        crate::handlers::clinical::get_investigation,
        crate::handlers::clinical::update_investigation,
        crate::handlers::clinical::delete_investigation,
        crate::handlers::clinical::create_assistant_note,
        crate::handlers::clinical::list_assistant_notes,
        crate::handlers::clinical::get_assistant_note,
        crate::handlers::clinical::delete_assistant_note,

        // Message endpoints
        crate::handlers::messages::schedule_message,
        crate::handlers::messages::list_messages,
        crate::handlers::messages::get_message,
        crate::handlers::messages::cancel_message,
    ),
    components(
        schemas(
            // Health schemas
            crate::handlers::health::HealthResponse,
            crate::handlers::health::VersionResponse,

            // Authentication schemas
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::AuthResponse,
            crate::auth::Role,

            // Patient schemas
            crate::handlers::patients::CreatePatientRequest,
            crate::handlers::patients::UpdatePatientRequest,
            database_layer::Patient,
            database_layer::PatientSummary,
            database_layer::PatientChart,

            // Clinical schemas
            crate::handlers::soap_notes::CreateSoapNoteRequest,
            crate::handlers::soap_notes::UpdateSoapNoteRequest,
            crate::handlers::clinical::CreateExaminationRequest,
            crate::handlers::clinical::CreateInterventionRequest,
            crate::handlers::clinical::CreateInvestigationRequest,
            crate::handlers::clinical::UpdateInvestigationRequest,
            crate::handlers::clinical::CreateAssistantNoteRequest,
            database_layer::SoapNote,
            database_layer::Examination,
            database_layer::Intervention,
            database_layer::Investigation,
            database_layer::AssistantNote,

            // Message schemas
            crate::handlers::messages::ScheduleMessageRequest,
            crate::handlers::messages::CancelMessageResponse,
            messaging_service::ScheduledMessage,
            messaging_service::MessageStatus,
        )
    ),
    tags(
        (name = "health", description = "System health and status endpoints"),
        (name = "auth", description = "Account registration and token issuance"),
        (name = "patients", description = "Patient registration and demographics"),
        (name = "soap-notes", description = "SOAP clinical notes"),
        (name = "clinical", description = "Examinations, interventions, investigations, assistant notes"),
        (name = "messages", description = "Scheduled WhatsApp reminders"),
    ),
    info(
        title = "Carelog Engine API",
        version = "0.1.0",
        description = "Clinical record-keeping API: patient management, clinical notes, and scheduled patient messaging behind role-scoped access control.",
        contact(
            name = "Carelog Team",
            email = "api@carelog.dev",
            url = "https://carelog.dev"
        ),
    ),
)]
pub struct ApiDoc;

/// Create documentation routes
pub fn create_docs_routes() -> Router<CarelogServer> {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
