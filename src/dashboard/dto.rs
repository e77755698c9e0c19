use serde::Serialize;
use sqlx::FromRow;

use crate::reports::{repo_types::ReportListItem, ReportStatus};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: i64,
    #[serde(rename = "baru")]
    pub new: i64,
    #[serde(rename = "proses")]
    pub in_progress: i64,
    #[serde(rename = "selesai")]
    pub done: i64,
}

impl StatusCounts {
    pub fn from_rows(rows: impl IntoIterator<Item = (ReportStatus, i64)>) -> Self {
        let mut counts = Self::default();
        for (status, n) in rows {
            match status {
                ReportStatus::New => counts.new += n,
                ReportStatus::InProgress => counts.in_progress += n,
                ReportStatus::Done => counts.done += n,
            }
            counts.total += n;
        }
        counts
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryCount {
    pub category_name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MonthCount {
    /// `YYYY-MM`
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct UserDashboard {
    pub counts: StatusCounts,
    pub recent: Vec<ReportListItem>,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub counts: StatusCounts,
    pub by_category: Vec<CategoryCount>,
    pub by_month: Vec<MonthCount>,
    pub recent: Vec<ReportListItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_fold_rows_and_total() {
        let counts = StatusCounts::from_rows([
            (ReportStatus::New, 3),
            (ReportStatus::Done, 2),
            (ReportStatus::InProgress, 1),
        ]);
        assert_eq!(
            counts,
            StatusCounts {
                total: 6,
                new: 3,
                in_progress: 1,
                done: 2
            }
        );
    }

    #[test]
    fn missing_statuses_are_zero() {
        let counts = StatusCounts::from_rows([(ReportStatus::InProgress, 4)]);
        assert_eq!(counts.new, 0);
        assert_eq!(counts.done, 0);
        assert_eq!(counts.total, 4);
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["proses"], 4);
        assert_eq!(json["baru"], 0);
    }
}
