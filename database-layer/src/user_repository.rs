use sqlx::{Pool, Postgres};

use crate::error::{DatabaseError, DbResult};
use crate::models::{Doctor, User};

/// Repository for account rows
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Look up an account by email (login path)
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, doctor_id, patient_id, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Create a clinic account together with its doctor row.
    ///
    /// Both inserts share one transaction so a half-registered clinic can
    /// never exist. A duplicate email surfaces as [`DatabaseError::Conflict`].
    pub async fn create_clinic_user(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        clinic_name: &str,
        phone: Option<&str>,
    ) -> DbResult<(User, Doctor)> {
        let mut tx = self.pool.begin().await?;

        let doctor = sqlx::query_as::<_, Doctor>(
            r#"
            INSERT INTO doctors (full_name, clinic_name, phone)
            VALUES ($1, $2, $3)
            RETURNING id, full_name, clinic_name, phone, created_at
            "#,
        )
        .bind(full_name)
        .bind(clinic_name)
        .bind(phone)
        .fetch_one(&mut *tx)
        .await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role, doctor_id)
            VALUES ($1, $2, 'CLINIC', $3)
            RETURNING id, email, password_hash, role, doctor_id, patient_id, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(doctor.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Conflict("email is already registered".to_string())
            }
            _ => DatabaseError::SqlxError(e),
        })?;

        tx.commit().await?;

        Ok((user, doctor))
    }
}
