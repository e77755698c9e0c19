//! Read side over reports: filtered/paginated lists and joined single-report views.

use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;

use super::repo_types::{ReportFilter, ReportListItem};
use crate::pagination::{Paginated, Pagination};

const LIST_SELECT: &str = r#"
    SELECT r.id, r.npsn, r.school_name, r.category_id, r.issue_description, r.nisn,
           r.status, r.reporter_id, r.created_at, r.updated_at,
           c.name AS category_name, u.name AS reporter_name
      FROM reports r
      JOIN categories c ON c.id = r.category_id
      JOIN users u ON u.id = r.reporter_id"#;

const NEWEST_FIRST: &str = " ORDER BY r.created_at DESC, r.id DESC";

/// `%term%` for ILIKE, with LIKE metacharacters in `term` matched literally.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.trim().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn day_start(date: time::Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}

pub(crate) fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReportFilter) {
    qb.push(" WHERE 1=1");
    if let Some(status) = filter.status {
        qb.push(" AND r.status = ").push_bind(status);
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND r.category_id = ").push_bind(category_id);
    }
    if let Some(reporter_id) = filter.reporter_id {
        qb.push(" AND r.reporter_id = ").push_bind(reporter_id);
    }
    if let Some(npsn) = &filter.npsn {
        qb.push(" AND r.npsn = ").push_bind(npsn.clone());
    }
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        qb.push(" AND (r.school_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR r.npsn ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR r.issue_description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND r.created_at >= ").push_bind(day_start(from));
    }
    if let Some(to) = filter.date_to {
        // inclusive of the whole `to` day
        match to.next_day() {
            Some(next) => {
                qb.push(" AND r.created_at < ").push_bind(day_start(next));
            }
            None => {
                qb.push(" AND r.created_at <= ").push_bind(day_start(to));
            }
        }
    }
}

/// One page of reports matching `filter`, newest first, with the total match count.
pub async fn list(
    db: &PgPool,
    filter: &ReportFilter,
    page: Pagination,
) -> Result<Paginated<ReportListItem>, sqlx::Error> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reports r");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(db).await?;

    let mut qb = QueryBuilder::<Postgres>::new(LIST_SELECT);
    push_filters(&mut qb, filter);
    qb.push(NEWEST_FIRST)
        .push(" LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = qb.build_query_as::<ReportListItem>().fetch_all(db).await?;

    Ok(Paginated::new(rows, total, page))
}

/// Same as [`list`] with the reporter pinned, whatever the filter says.
pub async fn list_by_user(
    db: &PgPool,
    reporter_id: i64,
    filter: ReportFilter,
    page: Pagination,
) -> Result<Paginated<ReportListItem>, sqlx::Error> {
    let filter = ReportFilter {
        reporter_id: Some(reporter_id),
        ..filter
    };
    list(db, &filter, page).await
}

/// Every report matching `filter`, newest first. Used by export.
pub async fn list_all(
    db: &PgPool,
    filter: &ReportFilter,
) -> Result<Vec<ReportListItem>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(LIST_SELECT);
    push_filters(&mut qb, filter);
    qb.push(NEWEST_FIRST);
    qb.build_query_as::<ReportListItem>().fetch_all(db).await
}

pub async fn recent(
    db: &PgPool,
    reporter_id: Option<i64>,
    limit: i64,
) -> Result<Vec<ReportListItem>, sqlx::Error> {
    let filter = ReportFilter {
        reporter_id,
        ..ReportFilter::default()
    };
    let mut qb = QueryBuilder::<Postgres>::new(LIST_SELECT);
    push_filters(&mut qb, &filter);
    qb.push(NEWEST_FIRST).push(" LIMIT ").push_bind(limit);
    qb.build_query_as::<ReportListItem>().fetch_all(db).await
}

pub async fn find_item(db: &PgPool, id: i64) -> Result<Option<ReportListItem>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(LIST_SELECT);
    qb.push(" WHERE r.id = ").push_bind(id);
    qb.build_query_as::<ReportListItem>().fetch_optional(db).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::repo_types::ReportStatus;
    use time::macros::date;

    fn sql_for(filter: &ReportFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reports r");
        push_filters(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("sdn"), "%sdn%");
        assert_eq!(like_pattern(" 100% "), "%100\\%%");
        assert_eq!(like_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert_eq!(
            sql_for(&ReportFilter::default()),
            "SELECT COUNT(*) FROM reports r WHERE 1=1"
        );
    }

    #[test]
    fn exact_filters_are_anded() {
        let sql = sql_for(&ReportFilter {
            status: Some(ReportStatus::InProgress),
            category_id: Some(4),
            reporter_id: Some(9),
            npsn: Some("12345678".into()),
            ..ReportFilter::default()
        });
        assert!(sql.ends_with(
            "WHERE 1=1 AND r.status = $1 AND r.category_id = $2 \
             AND r.reporter_id = $3 AND r.npsn = $4"
        ));
    }

    #[test]
    fn search_is_a_single_or_group() {
        let sql = sql_for(&ReportFilter {
            status: Some(ReportStatus::New),
            search: Some("bocor".into()),
            ..ReportFilter::default()
        });
        assert!(sql.contains(
            "AND (r.school_name ILIKE $2 OR r.npsn ILIKE $3 OR r.issue_description ILIKE $4)"
        ));
        assert_eq!(sql.matches(" OR ").count(), 2);
    }

    #[test]
    fn date_to_covers_whole_day() {
        let sql = sql_for(&ReportFilter {
            date_from: Some(date!(2024 - 01 - 01)),
            date_to: Some(date!(2024 - 01 - 31)),
            ..ReportFilter::default()
        });
        assert!(sql.contains("AND r.created_at >= $1"));
        assert!(sql.contains("AND r.created_at < $2"));
    }

    #[test]
    fn day_start_is_utc_midnight() {
        let t = day_start(date!(2024 - 02 - 29));
        assert_eq!(t.hour(), 0);
        assert_eq!(t.offset(), time::UtcOffset::UTC);
        assert_eq!(t.date(), date!(2024 - 02 - 29));
    }
}
