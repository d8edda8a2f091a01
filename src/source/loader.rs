//! KPI metrics CSV loading.
//!
//! The file has a header row followed by `kpi,precision,recall,f1Score`
//! rows. Columns are positional and quoting is not supported. Any row
//! that fails to parse fails the whole load.

use super::SourceError;
use crate::models::KpiMetric;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tracing::{debug, info};

const COLUMNS: usize = 4;

/// Load KPI metrics from a CSV file.
pub async fn load_metrics(path: &Path) -> Result<Vec<KpiMetric>, SourceError> {
    debug!("Reading metrics from {}", path.display());

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Load {
            path: path.display().to_string(),
            source,
        })?;

    let rows = parse_metrics(&text)?;
    info!("Loaded {} KPI rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parse KPI metrics from CSV text.
pub fn parse_metrics(text: &str) -> Result<Vec<KpiMetric>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| SourceError::Data {
            line: e.position().map_or(0, |p| p.line()),
            reason: e.to_string(),
        })?;

        if record.iter().all(str::is_empty) {
            continue;
        }

        rows.push(parse_row(&record)?);
    }

    Ok(rows)
}

fn parse_row(record: &StringRecord) -> Result<KpiMetric, SourceError> {
    let line = record.position().map_or(0, |p| p.line());

    if record.len() < COLUMNS {
        return Err(SourceError::Data {
            line,
            reason: format!("expected {} columns, found {}", COLUMNS, record.len()),
        });
    }

    let kpi = &record[0];
    if kpi.is_empty() {
        return Err(SourceError::Data {
            line,
            reason: "empty KPI name".to_string(),
        });
    }

    Ok(KpiMetric::new(
        kpi,
        parse_score(&record[1], "precision", line)?,
        parse_score(&record[2], "recall", line)?,
        parse_score(&record[3], "f1Score", line)?,
    ))
}

/// Parse a score, which must be a finite number in [0, 1].
fn parse_score(field: &str, column: &str, line: u64) -> Result<f64, SourceError> {
    let value: f64 = field.parse().map_err(|_| SourceError::Data {
        line,
        reason: format!("{} '{}' is not a number", column, field),
    })?;

    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(SourceError::Data {
            line,
            reason: format!("{} {} is outside [0, 1]", column, field),
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_metrics() {
        let rows = parse_metrics("kpi,precision,recall,f1Score\nA,0.9,0.8,0.8471\nB,0.5,0.6,0.5455")
            .unwrap();

        assert_eq!(
            rows,
            vec![
                KpiMetric::new("A", 0.9, 0.8, 0.8471),
                KpiMetric::new("B", 0.5, 0.6, 0.5455),
            ]
        );
    }

    #[test]
    fn test_header_contents_are_ignored() {
        let rows = parse_metrics("name,p,r,f,notes\nPATHLOSS,0.7,0.6,0.65,extra").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kpi, "PATHLOSS");
        assert_eq!(rows[0].f1_score, 0.65);
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(parse_metrics("").unwrap().is_empty());
        assert!(parse_metrics("kpi,precision,recall,f1Score\n").unwrap().is_empty());
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let text = "kpi,precision,recall,f1Score\r\nA,0.9,0.8,0.85\r\n\r\n   \r\nB,0.1,0.2,0.13\r\n";
        let rows = parse_metrics(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].kpi, "B");
        assert_eq!(rows[1].f1_score, 0.13);
    }

    #[test]
    fn test_quotes_are_literal() {
        let rows = parse_metrics("kpi,precision,recall,f1Score\n\"DL BLER (%)\",0.5,0.5,0.5").unwrap();
        assert_eq!(rows[0].kpi, "\"DL BLER (%)\"");
    }

    #[test]
    fn test_unparsable_number_names_line() {
        let err = parse_metrics("kpi,precision,recall,f1Score\nA,0.9,0.8,0.85\nB,abc,0.6,0.5")
            .unwrap_err();

        match err {
            SourceError::Data { line, ref reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("precision"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_rejects_nan_and_out_of_range() {
        assert!(matches!(
            parse_metrics("h,h,h,h\nA,NaN,0.5,0.5"),
            Err(SourceError::Data { line: 2, .. })
        ));
        assert!(matches!(
            parse_metrics("h,h,h,h\nA,0.5,1.2,0.5"),
            Err(SourceError::Data { line: 2, .. })
        ));
        assert!(matches!(
            parse_metrics("h,h,h,h\nA,0.5,0.5,-0.1"),
            Err(SourceError::Data { line: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_short_rows_and_empty_names() {
        assert!(matches!(
            parse_metrics("h,h,h,h\nA,0.5,0.5"),
            Err(SourceError::Data { line: 2, .. })
        ));
        assert!(matches!(
            parse_metrics("h,h,h,h\n,0.5,0.5,0.5"),
            Err(SourceError::Data { line: 2, .. })
        ));
    }

    #[test]
    fn test_load_metrics_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "kpi,precision,recall,f1Score").unwrap();
        writeln!(file, "Cell Availability,0.92,0.88,0.8996").unwrap();
        writeln!(file, "Active_Users,0.61,0.72,0.6605").unwrap();

        let rows = tokio_test::block_on(load_metrics(file.path())).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kpi, "Cell Availability");
    }

    #[test]
    fn test_load_missing_file() {
        let err = tokio_test::block_on(load_metrics(Path::new("does/not/exist.csv"))).unwrap_err();
        assert!(matches!(err, SourceError::Load { .. }));
        assert!(err.to_string().contains("does/not/exist.csv"));
    }
}
