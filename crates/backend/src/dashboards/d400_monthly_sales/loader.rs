use chrono::NaiveDate;
use contracts::dashboards::d400_monthly_sales::{
    DisplayUnit, LoadWarning, SalesRecord, COL_CHANGE_RATE, COL_MONTH, COL_PRIOR_YEAR, COL_REVENUE,
    REQUIRED_COLUMNS,
};

use super::error::LoadError;

/// One cleaned row with its unit-scaled and cumulative columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRow {
    pub month: String,
    pub revenue: f64,
    pub prior_year: f64,
    pub change_rate: f64,
    pub revenue_scaled: f64,
    pub prior_year_scaled: f64,
    /// Running total of `revenue` in month order
    pub cumulative: f64,
    pub cumulative_scaled: f64,
}

/// Cleaned, month-sorted sales data. Never empty.
#[derive(Debug, Clone)]
pub struct SalesTable {
    pub rows: Vec<SalesRow>,
    pub unit: DisplayUnit,
    pub warnings: Vec<LoadWarning>,
}

impl SalesTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn months(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.month.clone()).collect()
    }

    pub fn revenues(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.revenue).collect()
    }

    /// Total revenue, i.e. the last cumulative value.
    pub fn cumulative_total(&self) -> f64 {
        self.rows.last().map(|r| r.cumulative).unwrap_or(0.0)
    }

    /// The four source columns, for the preview panel.
    pub fn records(&self) -> Vec<SalesRecord> {
        self.rows
            .iter()
            .map(|r| SalesRecord {
                month: r.month.clone(),
                revenue: r.revenue,
                prior_year: r.prior_year,
                change_rate: r.change_rate,
            })
            .collect()
    }
}

/// Decodes uploaded bytes into text, enforcing the upload size limit.
pub fn decode_upload(bytes: Vec<u8>, limit: usize) -> Result<String, LoadError> {
    if bytes.len() > limit {
        return Err(LoadError::TooLarge {
            size: bytes.len(),
            limit,
        });
    }
    Ok(String::from_utf8(bytes)?)
}

/// Parses, validates and cleans sales CSV text.
///
/// Rows with a missing, unparsable or NaN value are dropped and reported in
/// [`SalesTable::warnings`]; the remaining rows are sorted by month label and
/// get their derived columns computed for `unit`.
pub fn load_data(csv_text: &str, unit: DisplayUnit) -> Result<SalesTable, LoadError> {
    // Strip UTF-8 BOM if present (Excel exports)
    let text = csv_text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();

    let mut indices = [0usize; 4];
    for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| LoadError::MissingColumn(column.to_string()))?;
    }
    let [month_idx, revenue_idx, prior_idx, rate_idx] = indices;

    let mut rows: Vec<SalesRow> = Vec::new();
    let mut warnings: Vec<LoadWarning> = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map(|p| p.line());
                tracing::warn!("Skipping malformed CSV record (line {:?}): {}", line, e);
                warnings.push(LoadWarning {
                    line,
                    message: format!("CSV 레코드를 읽을 수 없어 제외했습니다: {}", e),
                });
                dropped += 1;
                continue;
            }
        };
        let line = record.position().map(|p| p.line());
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let month = field(month_idx).trim().to_string();
        if month.is_empty() {
            warnings.push(LoadWarning {
                line,
                message: format!("{} 값이 비어 있어 행을 제외했습니다", COL_MONTH),
            });
            dropped += 1;
            continue;
        }

        let parsed = [
            (COL_REVENUE, field(revenue_idx), parse_number(field(revenue_idx))),
            (COL_PRIOR_YEAR, field(prior_idx), parse_number(field(prior_idx))),
            (COL_CHANGE_RATE, field(rate_idx), parse_rate(field(rate_idx))),
        ];
        if let Some((column, raw, _)) = parsed.iter().find(|(_, _, value)| value.is_none()) {
            warnings.push(LoadWarning {
                line,
                message: format!(
                    "{} 값 '{}'을(를) 숫자로 변환할 수 없어 행을 제외했습니다",
                    column, raw
                ),
            });
            dropped += 1;
            continue;
        }
        let [revenue, prior_year, change_rate] = parsed.map(|(_, _, value)| value.unwrap_or_default());

        if !is_year_month(&month) {
            warnings.push(LoadWarning {
                line,
                message: format!(
                    "{} 표기 '{}'이(가) YYYY-MM 형식이 아닙니다 (히트맵의 연/월 구분이 부정확할 수 있음)",
                    COL_MONTH, month
                ),
            });
        }

        rows.push(SalesRow {
            month,
            revenue,
            prior_year,
            change_rate,
            revenue_scaled: 0.0,
            prior_year_scaled: 0.0,
            cumulative: 0.0,
            cumulative_scaled: 0.0,
        });
    }

    if rows.is_empty() {
        return Err(LoadError::NoValidRows);
    }

    // stable: equal month labels keep file order
    rows.sort_by(|a, b| a.month.cmp(&b.month));
    derive_columns(&mut rows, unit);

    if dropped > 0 {
        tracing::warn!("Dropped {} CSV rows while cleaning, kept {}", dropped, rows.len());
    }
    tracing::info!("Loaded {} sales rows ({})", rows.len(), unit.label());

    Ok(SalesTable {
        rows,
        unit,
        warnings,
    })
}

/// Fills unit-scaled and cumulative columns; `rows` must already be sorted.
fn derive_columns(rows: &mut [SalesRow], unit: DisplayUnit) {
    let mut running = 0.0;
    for row in rows.iter_mut() {
        running += row.revenue;
        row.revenue_scaled = unit.scale(row.revenue);
        row.prior_year_scaled = unit.scale(row.prior_year);
        row.cumulative = running;
        row.cumulative_scaled = unit.scale(running);
    }
}

/// Numeric coercion: anything unparsable, and NaN, counts as missing.
/// `inf` / `-inf` are kept.
fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Like [`parse_number`] after removing every `%` sign.
fn parse_rate(raw: &str) -> Option<f64> {
    parse_number(&raw.replace('%', ""))
}

fn is_year_month(label: &str) -> bool {
    label.len() == 7 && NaiveDate::parse_from_str(&format!("{}-01", label), "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d400_monthly_sales::sample::SAMPLE_CSV;

    #[test]
    fn test_sample_loads_sorted_with_derived_columns() {
        let table = load_data(SAMPLE_CSV, DisplayUnit::Million).unwrap();
        assert_eq!(table.len(), 12);
        assert!(table.warnings.is_empty());
        assert_eq!(table.rows[0].month, "2024-01");
        assert_eq!(table.rows[0].revenue_scaled, 12.0);
        assert_eq!(table.rows[0].prior_year_scaled, 10.5);
        assert_eq!(table.rows[1].cumulative, 25_500_000.0);
        assert_eq!(table.cumulative_total(), 226_000_000.0);
        assert_eq!(table.rows[11].cumulative_scaled, 226.0);
        assert_eq!(table.rows[2].change_rate, -14.1);
    }

    #[test]
    fn test_missing_column_reports_first_missing() {
        let err = load_data("월,매출액,증감률\n2024-01,1,2\n", DisplayUnit::Won).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "전년동월"));
        assert_eq!(err.to_string(), "필수 컬럼 누락: 전년동월");
    }

    #[test]
    fn test_percent_sign_and_whitespace_are_cleaned() {
        let csv = "\u{FEFF} 월 ,매출액,전년동월,증감률,비고\n 2024-02 , 200 ,100, 100% ,x\n2024-01,100,100,0.0%,y\n";
        let table = load_data(csv, DisplayUnit::Won).unwrap();
        assert_eq!(table.months(), vec!["2024-01", "2024-02"]);
        assert_eq!(table.rows[1].change_rate, 100.0);
        assert_eq!(table.rows[1].revenue, 200.0);
        assert_eq!(table.rows[1].cumulative, 300.0);
    }

    #[test]
    fn test_unparsable_rows_are_dropped_with_warning() {
        let csv = "월,매출액,전년동월,증감률\n2024-01,abc,1,1\n2024-02,5,,1\n2024-03,7,6,n/a\n2024-04,9,8,12.5\n,1,1,1\n";
        let table = load_data(csv, DisplayUnit::Won).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].month, "2024-04");
        assert_eq!(table.warnings.len(), 4);
        assert_eq!(table.warnings[0].line, Some(2));
        assert!(table.warnings[0].message.contains("매출액"));
        assert!(table.warnings[0].message.contains("abc"));
        assert!(table.warnings[1].message.contains("전년동월"));
        assert!(table.warnings[2].message.contains("증감률"));
        assert!(table.warnings[3].message.contains("월 값이 비어"));
    }

    #[test]
    fn test_nan_is_missing_but_infinity_is_kept() {
        let csv = "월,매출액,전년동월,증감률\n2024-01,NaN,1,1\n2024-02,5,4,inf\n2024-03,7,6,-inf%\n";
        let table = load_data(csv, DisplayUnit::Won).unwrap();
        assert_eq!(table.months(), vec!["2024-02", "2024-03"]);
        assert_eq!(table.rows[0].change_rate, f64::INFINITY);
        assert_eq!(table.rows[1].change_rate, f64::NEG_INFINITY);
        assert_eq!(table.warnings.len(), 1);
        assert_eq!(table.warnings[0].line, Some(2));
    }

    #[test]
    fn test_infinite_revenue_propagates_to_cumulative() {
        let csv = "월,매출액,전년동월,증감률\n2024-01,inf,1,1\n2024-02,5,4,1\n";
        let table = load_data(csv, DisplayUnit::Thousand).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].revenue_scaled, f64::INFINITY);
        assert_eq!(table.cumulative_total(), f64::INFINITY);
        assert!(table.warnings.is_empty());
    }

    #[test]
    fn test_ragged_record_is_skipped() {
        let csv = "월,매출액,전년동월,증감률\n2024-01,1,2\n2024-02,5,4,1\n";
        let table = load_data(csv, DisplayUnit::Won).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.warnings.len(), 1);
        assert!(table.warnings[0].message.starts_with("CSV 레코드"));
    }

    #[test]
    fn test_no_valid_rows() {
        let err = load_data("월,매출액,전년동월,증감률\n2024-01,x,y,z\n", DisplayUnit::Won).unwrap_err();
        assert!(matches!(err, LoadError::NoValidRows));
        let err = load_data("월,매출액,전년동월,증감률\n", DisplayUnit::Won).unwrap_err();
        assert!(matches!(err, LoadError::NoValidRows));
    }

    #[test]
    fn test_non_standard_month_label_is_kept_with_warning() {
        let csv = "월,매출액,전년동월,증감률\n2024/01,1,1,0\n";
        let table = load_data(csv, DisplayUnit::Won).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.warnings.len(), 1);
        assert!(table.warnings[0].message.contains("YYYY-MM"));
    }

    #[test]
    fn test_sort_is_stable_for_equal_months() {
        let csv = "월,매출액,전년동월,증감률\n2024-02,1,1,0\n2024-01,2,1,0\n2024-01,3,1,0\n";
        let table = load_data(csv, DisplayUnit::Won).unwrap();
        assert_eq!(table.revenues(), vec![2.0, 3.0, 1.0]);
        assert_eq!(table.cumulative_total(), 6.0);
    }

    #[test]
    fn test_decode_upload() {
        assert_eq!(decode_upload(b"abc".to_vec(), 10).unwrap(), "abc");
        assert!(matches!(
            decode_upload(vec![b'a'; 11], 10),
            Err(LoadError::TooLarge { size: 11, limit: 10 })
        ));
        assert!(matches!(
            decode_upload(vec![0xff, 0xfe, 0x00], 10),
            Err(LoadError::Encoding(_))
        ));
    }
}
