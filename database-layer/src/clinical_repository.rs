use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::error::{DatabaseError, DbResult};
use crate::models::{
    AssistantNote, Examination, Intervention, Investigation, InvestigationChanges,
    NewAssistantNote, NewExamination, NewIntervention, NewInvestigation, NewSoapNote, SoapNote,
    SoapNoteChanges,
};

/// Repository for clinical notes (SOAP notes, examinations, interventions,
/// investigations, assistant notes).
///
/// Every mutation runs inside one transaction: the patient row is locked with
/// `FOR SHARE`, its owning doctor is compared against the acting doctor, and
/// only then does the write happen. Ownership cannot change between the check
/// and the write, and no write is visible when the check fails.
#[derive(Debug, Clone)]
pub struct ClinicalRepository {
    pool: sqlx::Pool<Postgres>,
}

/// Lock the patient row and verify it belongs to the acting doctor.
///
/// A missing patient and a foreign patient both produce
/// [`DatabaseError::OwnershipViolation`].
async fn assert_ownership(
    tx: &mut Transaction<'_, Postgres>,
    patient_id: Uuid,
    doctor_id: Uuid,
) -> DbResult<()> {
    let owner: Option<Uuid> = sqlx::query_scalar(
        "SELECT doctor_id FROM patients WHERE id = $1 AND archived_at IS NULL FOR SHARE",
    )
    .bind(patient_id)
    .fetch_optional(&mut **tx)
    .await?;

    match owner {
        Some(owner) if owner == doctor_id => Ok(()),
        _ => Err(DatabaseError::OwnershipViolation),
    }
}

/// Resolve the patient a note belongs to, or report the note missing.
async fn note_patient(
    tx: &mut Transaction<'_, Postgres>,
    table: &'static str,
    note_id: Uuid,
    entity: &'static str,
) -> DbResult<Uuid> {
    let patient_id: Option<Uuid> =
        sqlx::query_scalar(&format!("SELECT patient_id FROM {table} WHERE id = $1"))
            .bind(note_id)
            .fetch_optional(&mut **tx)
            .await?;

    patient_id.ok_or(DatabaseError::NotFound { entity })
}

impl ClinicalRepository {
    pub fn new(pool: sqlx::Pool<Postgres>) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // SOAP notes
    // ------------------------------------------------------------------

    pub async fn create_soap_note(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        new: &NewSoapNote,
    ) -> DbResult<SoapNote> {
        let mut tx = self.pool.begin().await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        let note = sqlx::query_as::<_, SoapNote>(
            r#"
            INSERT INTO soap_notes (patient_id, doctor_id, subjective, objective, assessment, plan)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(&new.subjective)
        .bind(&new.objective)
        .bind(&new.assessment)
        .bind(&new.plan)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(note)
    }

    pub async fn list_soap_notes(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<SoapNote>, i64)> {
        let notes = sqlx::query_as::<_, SoapNote>(
            r#"
            SELECT * FROM soap_notes
            WHERE patient_id = $1 AND doctor_id = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM soap_notes WHERE patient_id = $1 AND doctor_id = $2",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((notes, total))
    }

    pub async fn get_soap_note(&self, doctor_id: Uuid, note_id: Uuid) -> DbResult<Option<SoapNote>> {
        let note = sqlx::query_as::<_, SoapNote>(
            "SELECT * FROM soap_notes WHERE id = $1 AND doctor_id = $2",
        )
        .bind(note_id)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    pub async fn update_soap_note(
        &self,
        doctor_id: Uuid,
        note_id: Uuid,
        changes: &SoapNoteChanges,
    ) -> DbResult<SoapNote> {
        let mut tx = self.pool.begin().await?;
        let patient_id = note_patient(&mut tx, "soap_notes", note_id, "SOAP note").await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        let note = sqlx::query_as::<_, SoapNote>(
            r#"
            UPDATE soap_notes
            SET
                subjective = COALESCE($1, subjective),
                objective = COALESCE($2, objective),
                assessment = COALESCE($3, assessment),
                plan = COALESCE($4, plan),
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&changes.subjective)
        .bind(&changes.objective)
        .bind(&changes.assessment)
        .bind(&changes.plan)
        .bind(note_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(note)
    }

    pub async fn delete_soap_note(&self, doctor_id: Uuid, note_id: Uuid) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        let patient_id = note_patient(&mut tx, "soap_notes", note_id, "SOAP note").await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        sqlx::query("DELETE FROM soap_notes WHERE id = $1")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Examinations
    // ------------------------------------------------------------------

    pub async fn create_examination(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        new: &NewExamination,
    ) -> DbResult<Examination> {
        let mut tx = self.pool.begin().await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        let exam = sqlx::query_as::<_, Examination>(
            r#"
            INSERT INTO examinations (patient_id, doctor_id, vitals, findings)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(&new.vitals)
        .bind(&new.findings)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(exam)
    }

    pub async fn list_examinations(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<Examination>, i64)> {
        let exams = sqlx::query_as::<_, Examination>(
            r#"
            SELECT * FROM examinations
            WHERE patient_id = $1 AND doctor_id = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM examinations WHERE patient_id = $1 AND doctor_id = $2",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((exams, total))
    }

    pub async fn get_examination(
        &self,
        doctor_id: Uuid,
        exam_id: Uuid,
    ) -> DbResult<Option<Examination>> {
        let exam = sqlx::query_as::<_, Examination>(
            "SELECT * FROM examinations WHERE id = $1 AND doctor_id = $2",
        )
        .bind(exam_id)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exam)
    }

    pub async fn delete_examination(&self, doctor_id: Uuid, exam_id: Uuid) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        let patient_id = note_patient(&mut tx, "examinations", exam_id, "examination").await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        sqlx::query("DELETE FROM examinations WHERE id = $1")
            .bind(exam_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Interventions
    // ------------------------------------------------------------------

    pub async fn create_intervention(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        new: &NewIntervention,
    ) -> DbResult<Intervention> {
        let mut tx = self.pool.begin().await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        let intervention = sqlx::query_as::<_, Intervention>(
            r#"
            INSERT INTO interventions (patient_id, doctor_id, title, description, performed_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))
            RETURNING *
            "#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.performed_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(intervention)
    }

    pub async fn list_interventions(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<Intervention>, i64)> {
        let interventions = sqlx::query_as::<_, Intervention>(
            r#"
            SELECT * FROM interventions
            WHERE patient_id = $1 AND doctor_id = $2
            ORDER BY performed_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM interventions WHERE patient_id = $1 AND doctor_id = $2",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((interventions, total))
    }

    pub async fn get_intervention(
        &self,
        doctor_id: Uuid,
        intervention_id: Uuid,
    ) -> DbResult<Option<Intervention>> {
        let intervention = sqlx::query_as::<_, Intervention>(
            "SELECT * FROM interventions WHERE id = $1 AND doctor_id = $2",
        )
        .bind(intervention_id)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(intervention)
    }

    pub async fn delete_intervention(
        &self,
        doctor_id: Uuid,
        intervention_id: Uuid,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        let patient_id =
            note_patient(&mut tx, "interventions", intervention_id, "intervention").await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        sqlx::query("DELETE FROM interventions WHERE id = $1")
            .bind(intervention_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Investigations
    // ------------------------------------------------------------------

    pub async fn create_investigation(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        new: &NewInvestigation,
    ) -> DbResult<Investigation> {
        let mut tx = self.pool.begin().await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        let investigation = sqlx::query_as::<_, Investigation>(
            r#"
            INSERT INTO investigations
                (patient_id, doctor_id, title, result_summary, attachment_url, attachment_mime)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(&new.title)
        .bind(&new.result_summary)
        .bind(&new.attachment_url)
        .bind(&new.attachment_mime)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(investigation)
    }

    pub async fn list_investigations(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<Investigation>, i64)> {
        let investigations = sqlx::query_as::<_, Investigation>(
            r#"
            SELECT * FROM investigations
            WHERE patient_id = $1 AND doctor_id = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM investigations WHERE patient_id = $1 AND doctor_id = $2",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((investigations, total))
    }

    pub async fn get_investigation(
        &self,
        doctor_id: Uuid,
        investigation_id: Uuid,
    ) -> DbResult<Option<Investigation>> {
        let investigation = sqlx::query_as::<_, Investigation>(
            "SELECT * FROM investigations WHERE id = $1 AND doctor_id = $2",
        )
        .bind(investigation_id)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(investigation)
    }

    /// Attach results to an investigation once they come back from the lab
    pub async fn update_investigation(
        &self,
        doctor_id: Uuid,
        investigation_id: Uuid,
        changes: &InvestigationChanges,
    ) -> DbResult<Investigation> {
        let mut tx = self.pool.begin().await?;
        let patient_id =
            note_patient(&mut tx, "investigations", investigation_id, "investigation").await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        let investigation = sqlx::query_as::<_, Investigation>(
            r#"
            UPDATE investigations
            SET
                result_summary = COALESCE($1, result_summary),
                attachment_url = COALESCE($2, attachment_url),
                attachment_mime = COALESCE($3, attachment_mime),
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&changes.result_summary)
        .bind(&changes.attachment_url)
        .bind(&changes.attachment_mime)
        .bind(investigation_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(investigation)
    }

    pub async fn delete_investigation(
        &self,
        doctor_id: Uuid,
        investigation_id: Uuid,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        let patient_id =
            note_patient(&mut tx, "investigations", investigation_id, "investigation").await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        sqlx::query("DELETE FROM investigations WHERE id = $1")
            .bind(investigation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Assistant notes
    // ------------------------------------------------------------------

    pub async fn create_assistant_note(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        new: &NewAssistantNote,
    ) -> DbResult<AssistantNote> {
        let mut tx = self.pool.begin().await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        let note = sqlx::query_as::<_, AssistantNote>(
            r#"
            INSERT INTO assistant_notes (patient_id, doctor_id, prompt, content, model_tag)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(&new.prompt)
        .bind(&new.content)
        .bind(&new.model_tag)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(note)
    }

    pub async fn list_assistant_notes(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DbResult<(Vec<AssistantNote>, i64)> {
        let notes = sqlx::query_as::<_, AssistantNote>(
            r#"
            SELECT * FROM assistant_notes
            WHERE patient_id = $1 AND doctor_id = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(patient_id)
        .bind(doctor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assistant_notes WHERE patient_id = $1 AND doctor_id = $2",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((notes, total))
    }

    pub async fn get_assistant_note(
        &self,
        doctor_id: Uuid,
        note_id: Uuid,
    ) -> DbResult<Option<AssistantNote>> {
        let note = sqlx::query_as::<_, AssistantNote>(
            "SELECT * FROM assistant_notes WHERE id = $1 AND doctor_id = $2",
        )
        .bind(note_id)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    pub async fn delete_assistant_note(&self, doctor_id: Uuid, note_id: Uuid) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        let patient_id = note_patient(&mut tx, "assistant_notes", note_id, "assistant note").await?;
        assert_ownership(&mut tx, patient_id, doctor_id).await?;

        sqlx::query("DELETE FROM assistant_notes WHERE id = $1")
            .bind(note_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
