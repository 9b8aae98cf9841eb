use anyhow::Result;
use axum::extract::FromRef;
use std::sync::Arc;
use tracing::warn;

use database_layer::{
    AuditLog, ClinicalRepository, DatabasePool, PatientRepository, UserRepository,
};
use messaging_service::{
    LogOnlySender, MessageScheduler, MessageSender, SqlxMessageStore, WhatsAppSender,
};

use crate::auth::TokenCodec;
use crate::config::ServerConfig;

/// Main Carelog server state
#[derive(Clone)]
pub struct CarelogServer {
    /// Server configuration
    pub config: ServerConfig,
    /// Database connection pool
    pub db: DatabasePool,
    /// Account repository
    pub users: UserRepository,
    /// Patient repository
    pub patients: PatientRepository,
    /// Clinical-note repository (ownership-checked writes)
    pub clinical: ClinicalRepository,
    /// Audit trail writer
    pub audit: AuditLog,
    /// Identity token codec
    pub tokens: TokenCodec,
    /// Scheduled-message store (read side)
    pub messages: Arc<SqlxMessageStore>,
    /// Scheduled-message job owner
    pub scheduler: Arc<MessageScheduler>,
}

impl CarelogServer {
    /// Create a new Carelog server instance: connect, migrate, and wire up
    /// the repositories and the message scheduler.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let db = DatabasePool::new(&config.database_url).await?;
        db.run_migrations().await?;

        let pool = db.pool().clone();

        let users = UserRepository::new(pool.clone());
        let patients = PatientRepository::new(pool.clone());
        let clinical = ClinicalRepository::new(pool.clone());
        let audit = AuditLog::new(pool.clone());

        let tokens = TokenCodec::new(&config.jwt_secret, config.issuer.clone(), config.token_ttl_seconds);

        let sender: Arc<dyn MessageSender> = match &config.whatsapp {
            Some(whatsapp) => Arc::new(WhatsAppSender::new(whatsapp.clone())?),
            None => {
                warn!("WhatsApp transport not configured; scheduled messages will be logged only");
                Arc::new(LogOnlySender)
            }
        };
        let messages = Arc::new(SqlxMessageStore::new(pool));
        let scheduler = Arc::new(MessageScheduler::new(messages.clone(), sender));

        Ok(Self {
            config,
            db,
            users,
            patients,
            clinical,
            audit,
            tokens,
            messages,
            scheduler,
        })
    }
}

impl FromRef<CarelogServer> for TokenCodec {
    fn from_ref(server: &CarelogServer) -> TokenCodec {
        server.tokens.clone()
    }
}

impl std::fmt::Debug for CarelogServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarelogServer")
            .field("config", &self.config.environment)
            .field("whatsapp_configured", &self.config.whatsapp.is_some())
            .finish()
    }
}
