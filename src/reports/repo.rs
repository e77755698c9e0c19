use sqlx::{PgExecutor, Postgres, QueryBuilder};

use super::repo_types::{NewReport, Report, ReportChanges, ReportStatus};

pub(crate) const REPORT_COLUMNS: &str = "id, npsn, school_name, category_id, issue_description, \
     nisn, status, reporter_id, created_at, updated_at";

impl Report {
    pub async fn find_by_id<'e, E>(db: E, id: i64) -> Result<Option<Report>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS);
        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn current_status<'e, E>(db: E, id: i64) -> Result<Option<ReportStatus>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, ReportStatus>("SELECT status FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Insert a new report in status `baru`.
    pub async fn insert<'e, E>(db: E, reporter_id: i64, new: &NewReport) -> Result<Report, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            INSERT INTO reports (npsn, school_name, category_id, issue_description, nisn, status, reporter_id)
            VALUES ($1, $2, $3, $4, $5, 'baru', $6)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );
        sqlx::query_as::<_, Report>(&sql)
            .bind(&new.npsn)
            .bind(&new.school_name)
            .bind(new.category_id)
            .bind(&new.issue_description)
            .bind(&new.nisn)
            .bind(reporter_id)
            .fetch_one(db)
            .await
    }

    /// Apply the present fields and bump `updated_at`, but only while the report still
    /// belongs to `reporter_id` and is `baru`. `None` when that no longer holds.
    pub async fn update_if_editable<'e, E>(
        db: E,
        id: i64,
        reporter_id: i64,
        changes: &ReportChanges,
    ) -> Result<Option<Report>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE reports SET ");
        push_changes(&mut qb, changes);
        push_editable_guard(&mut qb, id, reporter_id);
        qb.push(" RETURNING ").push(REPORT_COLUMNS);
        qb.build_query_as::<Report>().fetch_optional(db).await
    }

    /// `None` if the report is gone.
    pub async fn set_status<'e, E>(
        db: E,
        id: i64,
        status: ReportStatus,
    ) -> Result<Option<Report>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "UPDATE reports SET status = $1, updated_at = now() WHERE id = $2 RETURNING {}",
            REPORT_COLUMNS
        );
        sqlx::query_as::<_, Report>(&sql)
            .bind(status)
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Delete the report if it still belongs to `reporter_id` and is `baru`.
    pub async fn delete_if_editable<'e, E>(
        db: E,
        id: i64,
        reporter_id: i64,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM reports");
        push_editable_guard(&mut qb, id, reporter_id);
        let res = qb.build().execute(db).await?;
        Ok(res.rows_affected() > 0)
    }
}

fn push_changes(qb: &mut QueryBuilder<'_, Postgres>, changes: &ReportChanges) {
    let mut set = qb.separated(", ");
    if let Some(npsn) = &changes.npsn {
        set.push("npsn = ").push_bind_unseparated(npsn.clone());
    }
    if let Some(school_name) = &changes.school_name {
        set.push("school_name = ")
            .push_bind_unseparated(school_name.clone());
    }
    if let Some(category_id) = changes.category_id {
        set.push("category_id = ").push_bind_unseparated(category_id);
    }
    if let Some(description) = &changes.issue_description {
        set.push("issue_description = ")
            .push_bind_unseparated(description.clone());
    }
    if let Some(nisn) = &changes.nisn {
        set.push("nisn = ").push_bind_unseparated(nisn.clone());
    }
    set.push("updated_at = now()");
}

fn push_editable_guard(qb: &mut QueryBuilder<'_, Postgres>, id: i64, reporter_id: i64) {
    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND reporter_id = ")
        .push_bind(reporter_id)
        .push(" AND status = ")
        .push_bind(ReportStatus::New);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_present_fields_are_set() {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE reports SET ");
        push_changes(
            &mut qb,
            &ReportChanges {
                school_name: Some("SMPN 2 Depok".into()),
                ..ReportChanges::default()
            },
        );
        assert_eq!(
            qb.sql(),
            "UPDATE reports SET school_name = $1, updated_at = now()"
        );
    }

    #[test]
    fn explicit_null_nisn_is_written() {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE reports SET ");
        push_changes(
            &mut qb,
            &ReportChanges {
                nisn: Some(None),
                category_id: Some(3),
                ..ReportChanges::default()
            },
        );
        assert_eq!(
            qb.sql(),
            "UPDATE reports SET category_id = $1, nisn = $2, updated_at = now()"
        );
    }

    #[test]
    fn reporter_writes_are_guarded_by_owner_and_status() {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE reports SET ");
        push_changes(
            &mut qb,
            &ReportChanges {
                npsn: Some("87654321".into()),
                ..ReportChanges::default()
            },
        );
        push_editable_guard(&mut qb, 9, 4);
        assert_eq!(
            qb.sql(),
            "UPDATE reports SET npsn = $1, updated_at = now() \
             WHERE id = $2 AND reporter_id = $3 AND status = $4"
        );

        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM reports");
        push_editable_guard(&mut qb, 9, 4);
        assert_eq!(
            qb.sql(),
            "DELETE FROM reports WHERE id = $1 AND reporter_id = $2 AND status = $3"
        );
    }

    #[test]
    fn empty_changes_only_touch_timestamp() {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE reports SET ");
        push_changes(&mut qb, &ReportChanges::default());
        assert_eq!(qb.sql(), "UPDATE reports SET updated_at = now()");
    }
}
