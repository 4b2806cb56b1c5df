//! CSV export of whatever the user is currently looking at.
//!
//! Every field is double-quoted and the header row matches the visible table
//! columns. Files are named `<dataset>_<YYYY-MM-DD>.csv`.

use chrono::NaiveDate;
use fv_api_types::ApiLead;

use crate::stats::MisRow;

#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output is not valid UTF-8")]
    Utf8,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// A value that can be written as one CSV row.
pub trait CsvRecord {
    fn headers() -> &'static [&'static str];
    fn fields(&self) -> Vec<String>;
}

pub const LEAD_HEADERS: &[&str] = &[
    "Name",
    "Mobile",
    "Email",
    "City",
    "Source",
    "Course",
    "Batch Type",
    "Stage",
    "Follow-up Date",
];

impl CsvRecord for ApiLead {
    fn headers() -> &'static [&'static str] {
        LEAD_HEADERS
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.full_name.clone(),
            self.mobile.clone(),
            self.email.clone().unwrap_or_default(),
            self.city.clone().unwrap_or_default(),
            self.lead_source.clone(),
            self.course_category.clone(),
            self.batch_type.clone(),
            self.stage.clone(),
            self.follow_up_date
                .as_deref()
                .and_then(|d| d.get(..10))
                .unwrap_or_default()
                .to_string(),
        ]
    }
}

impl CsvRecord for MisRow {
    fn headers() -> &'static [&'static str] {
        &["Metric", "Value"]
    }

    fn fields(&self) -> Vec<String> {
        vec![self.metric.clone(), self.value.clone()]
    }
}

/// Render rows with a header line, quoting every field.
pub fn to_csv<'a, T>(rows: impl IntoIterator<Item = &'a T>) -> Result<String, CsvError>
where
    T: CsvRecord + 'a,
{
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(T::headers())?;
    for row in rows {
        writer.write_record(row.fields())?;
    }
    writer.flush()?;
    let bytes = writer.into_inner().map_err(|e| CsvError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|_| CsvError::Utf8)
}

/// Parsed CSV: header plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All values of one column, in row order.
    pub fn values(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column(name)?;
        Some(
            self.rows
                .iter()
                .map(|r| r.get(idx).map(String::as_str).unwrap_or_default())
                .collect(),
        )
    }
}

pub fn parse_csv(text: &str) -> Result<CsvTable, CsvError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(text.as_bytes());
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(CsvTable { headers, rows })
}

/// `<dataset>_<YYYY-MM-DD>.csv`
pub fn export_filename(dataset: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", dataset, date.format("%Y-%m-%d"))
}
