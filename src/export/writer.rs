use anyhow::Context;
use time::format_description::well_known::Rfc3339;

use crate::reports::repo_types::ReportListItem;

const HEADER: [&str; 10] = [
    "id",
    "npsn",
    "school_name",
    "category",
    "issue_description",
    "nisn",
    "status",
    "reporter",
    "created_at",
    "updated_at",
];

/// Serialize reports as CSV with a header row. Quoting is left to the writer.
pub fn reports_to_csv(rows: &[ReportListItem]) -> anyhow::Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new().from_writer(&mut out);
        writer.write_record(HEADER).context("write csv header")?;

        for item in rows {
            let r = &item.report;
            let created_at = r.created_at.format(&Rfc3339).context("format created_at")?;
            let updated_at = r.updated_at.format(&Rfc3339).context("format updated_at")?;
            writer
                .write_record([
                    r.id.to_string().as_str(),
                    r.npsn.as_str(),
                    r.school_name.as_str(),
                    item.category_name.as_str(),
                    r.issue_description.as_str(),
                    r.nisn.as_deref().unwrap_or(""),
                    r.status.as_str(),
                    item.reporter_name.as_str(),
                    created_at.as_str(),
                    updated_at.as_str(),
                ])
                .with_context(|| format!("write csv row for report {}", r.id))?;
        }
        writer.flush().context("flush csv")?;
    }
    Ok(out)
}
