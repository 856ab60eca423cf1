use std::path::Path;

use csv::{Terminator, WriterBuilder};
use tracing::info;

use crate::error::Result;
use crate::rows::FlatRow;

#[derive(Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { rows: usize },
    NoData,
}

/// Write `rows` to `path`, replacing any existing file. Header comes from the
/// row type's field names. With no rows the file is left untouched.
pub fn save_csv(rows: &[FlatRow], path: &Path) -> Result<WriteOutcome> {
    if rows.is_empty() {
        return Ok(WriteOutcome::NoData);
    }

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(WriteOutcome::Written { rows: rows.len() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(study_id: &str, city: &str) -> FlatRow {
        FlatRow {
            study_id: study_id.into(),
            city: city.into(),
            state: String::new(),
            country: "USA".into(),
            lat: Some(42.36),
            lon: Some(-71.06),
            status: Some("RECRUITING".into()),
            start_date: None,
            start_date_type: None,
            completion_date: None,
            completion_date_type: None,
            study_type: None,
            phases: vec!["PHASE1".into(), "PHASE2".into()],
            allocation: None,
            intervention_model: None,
            primary_purpose: None,
            masking: None,
            healthy_volunteers: Some(true),
            sex: None,
            min_age: None,
            max_age: None,
        }
    }

    fn read_back(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let headers = reader.headers().unwrap().iter().map(str::to_string).collect();
        let records = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        (headers, records)
    }

    #[test]
    fn header_and_rows_align() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locations.csv");
        let rows = vec![row("NCT01", "Boston"), row("NCT01", "Salem, MA")];

        let outcome = save_csv(&rows, &path).unwrap();
        assert_eq!(outcome, WriteOutcome::Written { rows: 2 });

        let (headers, records) = read_back(&path);
        assert_eq!(headers, FlatRow::COLUMNS);
        assert_eq!(records.len(), 2);
        for rec in &records {
            assert_eq!(rec.len(), headers.len());
        }

        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
        assert_eq!(records[0][col("study_id")], "NCT01");
        assert_eq!(records[1][col("city")], "Salem, MA");
        assert_eq!(records[0][col("state")], "");
        assert_eq!(records[0][col("lat")], "42.36");
        assert_eq!(records[0][col("lon")], "-71.06");
        assert_eq!(records[0][col("phases")], r#"["PHASE1","PHASE2"]"#);
        assert_eq!(records[0][col("healty_volunteers")], "true");
        assert_eq!(records[0][col("start_date")], "");
    }

    #[test]
    fn empty_phase_list_and_absent_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locations.csv");
        let mut r = row("NCT02", "Oslo");
        r.phases.clear();
        r.healthy_volunteers = None;
        r.lat = None;

        save_csv(&[r], &path).unwrap();
        let (headers, records) = read_back(&path);
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
        assert_eq!(records[0][col("phases")], "[]");
        assert_eq!(records[0][col("healty_volunteers")], "");
        assert_eq!(records[0][col("lat")], "");
    }

    #[test]
    fn null_phases_and_false_flag_cells() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locations.csv");
        let study = serde_json::json!({
            "protocolSection": {
                "identificationModule": {"nctId": "NCT05"},
                "designModule": {"phases": null},
                "eligibilityModule": {"healthyVolunteers": false},
                "contactsLocationsModule": {"locations": [{"city": "Aarhus", "country": "Denmark"}]}
            }
        });
        let rows = crate::extract::flatten_study(&study, crate::extract::Unlocated::Drop);

        save_csv(&rows, &path).unwrap();
        let (headers, records) = read_back(&path);
        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
        assert_eq!(records[0][col("phases")], "[]");
        assert_eq!(records[0][col("healty_volunteers")], "false");
    }

    #[test]
    fn no_rows_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locations.csv");

        assert_eq!(save_csv(&[], &path).unwrap(), WriteOutcome::NoData);
        assert!(!path.exists());
    }

    #[test]
    fn existing_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("locations.csv");
        std::fs::write(&path, "stale,content\n1,2\n3,4\n5,6\n").unwrap();

        save_csv(&[row("NCT03", "Lyon")], &path).unwrap();
        let (headers, records) = read_back(&path);
        assert_eq!(headers[0], "study_id");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("locations.csv");
        assert!(save_csv(&[row("NCT04", "Rome")], &path).is_err());
    }
}
