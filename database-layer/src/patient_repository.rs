use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{
    Examination, Intervention, Investigation, NewPatient, Patient, PatientChanges, PatientChart,
    PatientSummary, SoapNote,
};

const PATIENT_COLUMNS: &str = "id, doctor_id, full_name, date_of_birth, sex, phone, email, \
                               address, created_at, updated_at, archived_at";

/// Repository for patient registration and demographics.
///
/// Every doctor-facing read is scoped by `doctor_id` in the query itself;
/// a clinic can never see another clinic's patients through this type.
#[derive(Debug, Clone)]
pub struct PatientRepository {
    pool: Pool<Postgres>,
}

impl PatientRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Register a new patient under the given doctor
    pub async fn create(&self, doctor_id: Uuid, new: &NewPatient) -> DbResult<Patient> {
        let patient = sqlx::query_as::<_, Patient>(&format!(
            r#"
            INSERT INTO patients (doctor_id, full_name, date_of_birth, sex, phone, email, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PATIENT_COLUMNS}
            "#
        ))
        .bind(doctor_id)
        .bind(&new.full_name)
        .bind(new.date_of_birth)
        .bind(&new.sex)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(patient)
    }

    /// List a doctor's patients with an optional name search.
    /// Returns the page plus the unpaginated total.
    pub async fn list(
        &self,
        doctor_id: Uuid,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<Patient>, i64)> {
        let (patients, total) = if let Some(term) = search {
            let pattern = format!("%{}%", term);
            let patients = sqlx::query_as::<_, Patient>(&format!(
                r#"
                SELECT {PATIENT_COLUMNS}
                FROM patients
                WHERE doctor_id = $1 AND archived_at IS NULL AND full_name ILIKE $2
                ORDER BY full_name ASC
                LIMIT $3 OFFSET $4
                "#
            ))
            .bind(doctor_id)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            let total: i64 = sqlx::query_scalar(
                r#"
                SELECT COUNT(*) FROM patients
                WHERE doctor_id = $1 AND archived_at IS NULL AND full_name ILIKE $2
                "#,
            )
            .bind(doctor_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

            (patients, total)
        } else {
            let patients = sqlx::query_as::<_, Patient>(&format!(
                r#"
                SELECT {PATIENT_COLUMNS}
                FROM patients
                WHERE doctor_id = $1 AND archived_at IS NULL
                ORDER BY full_name ASC
                LIMIT $2 OFFSET $3
                "#
            ))
            .bind(doctor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM patients WHERE doctor_id = $1 AND archived_at IS NULL",
            )
            .bind(doctor_id)
            .fetch_one(&self.pool)
            .await?;

            (patients, total)
        };

        Ok((patients, total))
    }

    /// Get one of the doctor's patients by id
    pub async fn get(&self, doctor_id: Uuid, patient_id: Uuid) -> DbResult<Option<Patient>> {
        let patient = sqlx::query_as::<_, Patient>(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE id = $1 AND doctor_id = $2 AND archived_at IS NULL
            "#
        ))
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(patient)
    }

    /// Partial demographics update; absent fields keep their value
    pub async fn update(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        changes: &PatientChanges,
    ) -> DbResult<Option<Patient>> {
        let patient = sqlx::query_as::<_, Patient>(&format!(
            r#"
            UPDATE patients
            SET
                full_name = COALESCE($1, full_name),
                date_of_birth = COALESCE($2, date_of_birth),
                sex = COALESCE($3, sex),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                address = COALESCE($6, address),
                updated_at = NOW()
            WHERE id = $7 AND doctor_id = $8 AND archived_at IS NULL
            RETURNING {PATIENT_COLUMNS}
            "#
        ))
        .bind(&changes.full_name)
        .bind(changes.date_of_birth)
        .bind(&changes.sex)
        .bind(&changes.phone)
        .bind(&changes.email)
        .bind(&changes.address)
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(patient)
    }

    /// Archive a patient (soft delete); returns false when no row matched
    pub async fn archive(&self, doctor_id: Uuid, patient_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE patients
            SET archived_at = NOW()
            WHERE id = $1 AND doctor_id = $2 AND archived_at IS NULL
            "#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Resolve the owning doctor of a patient, if the patient exists
    pub async fn owner_of(&self, patient_id: Uuid) -> DbResult<Option<Uuid>> {
        let owner: Option<Uuid> = sqlx::query_scalar(
            "SELECT doctor_id FROM patients WHERE id = $1 AND archived_at IS NULL",
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    /// Per-patient activity counters for reporting views
    pub async fn summary(&self, patient_id: Uuid) -> DbResult<Option<PatientSummary>> {
        let summary = sqlx::query_as::<_, PatientSummary>(
            r#"
            SELECT
                p.id AS patient_id,
                p.full_name,
                p.date_of_birth,
                (SELECT COUNT(*) FROM soap_notes n WHERE n.patient_id = p.id) AS soap_note_count,
                (SELECT COUNT(*) FROM examinations e WHERE e.patient_id = p.id) AS examination_count,
                (SELECT COUNT(*) FROM interventions i WHERE i.patient_id = p.id) AS intervention_count,
                (SELECT COUNT(*) FROM investigations v WHERE v.patient_id = p.id) AS investigation_count,
                (SELECT MAX(t.created_at) FROM (
                    SELECT created_at FROM soap_notes WHERE patient_id = p.id
                    UNION ALL SELECT created_at FROM examinations WHERE patient_id = p.id
                    UNION ALL SELECT created_at FROM interventions WHERE patient_id = p.id
                    UNION ALL SELECT created_at FROM investigations WHERE patient_id = p.id
                ) t) AS last_activity_at
            FROM patients p
            WHERE p.id = $1 AND p.archived_at IS NULL
            "#,
        )
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }

    /// A patient's full chart, as served to the patient themselves.
    /// Assistant notes are the doctor's working material and are not included.
    pub async fn chart(&self, patient_id: Uuid) -> DbResult<Option<PatientChart>> {
        let Some(patient) = sqlx::query_as::<_, Patient>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1 AND archived_at IS NULL"
        ))
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let soap_notes = sqlx::query_as::<_, SoapNote>(
            "SELECT * FROM soap_notes WHERE patient_id = $1 ORDER BY created_at DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        let examinations = sqlx::query_as::<_, Examination>(
            "SELECT * FROM examinations WHERE patient_id = $1 ORDER BY created_at DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        let interventions = sqlx::query_as::<_, Intervention>(
            "SELECT * FROM interventions WHERE patient_id = $1 ORDER BY created_at DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        let investigations = sqlx::query_as::<_, Investigation>(
            "SELECT * FROM investigations WHERE patient_id = $1 ORDER BY created_at DESC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PatientChart {
            patient,
            soap_notes,
            examinations,
            interventions,
            investigations,
        }))
    }
}
