use serde::{Serialize, Serializer};

/// One (trial, location) pair, the unit written to `locations.csv`.
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
    pub study_id: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub start_date_type: Option<String>,
    pub completion_date: Option<String>,
    pub completion_date_type: Option<String>,
    pub study_type: Option<String>,
    /// JSON array text such as `["PHASE2","PHASE3"]`, not a Python list repr.
    /// Absent or null phases give `[]` rather than an empty cell.
    #[serde(serialize_with = "phases_as_json")]
    pub phases: Vec<String>,
    pub allocation: Option<String>,
    pub intervention_model: Option<String>,
    pub primary_purpose: Option<String>,
    pub masking: Option<String>,
    /// Written as lowercase `true` / `false`, empty when unknown.
    // Column name kept as published downstream.
    #[serde(rename = "healty_volunteers")]
    pub healthy_volunteers: Option<bool>,
    pub sex: Option<String>,
    pub min_age: Option<String>,
    pub max_age: Option<String>,
}

#[cfg(test)]
impl FlatRow {
    pub const COLUMNS: [&'static str; 21] = [
        "study_id",
        "city",
        "state",
        "country",
        "lat",
        "lon",
        "status",
        "start_date",
        "start_date_type",
        "completion_date",
        "completion_date_type",
        "study_type",
        "phases",
        "allocation",
        "intervention_model",
        "primary_purpose",
        "masking",
        "healty_volunteers",
        "sex",
        "min_age",
        "max_age",
    ];
}

// CSV cells can't hold a sequence, so the phase list goes out as JSON text.
#[allow(clippy::ptr_arg)]
fn phases_as_json<S: Serializer>(phases: &Vec<String>, s: S) -> Result<S::Ok, S::Error> {
    let text = serde_json::to_string(phases).map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}
