use serde_json::Value;

use super::path::{lookup_array, lookup_bool, lookup_str};

const IDENTIFICATION: &[&str] = &["protocolSection", "identificationModule"];
const STATUS: &[&str] = &["protocolSection", "statusModule"];
const DESIGN: &[&str] = &["protocolSection", "designModule"];
const ELIGIBILITY: &[&str] = &["protocolSection", "eligibilityModule"];

/// Trial-level columns, shared by every location row of one study.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialFields {
    pub study_id: String,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub start_date_type: Option<String>,
    pub completion_date: Option<String>,
    pub completion_date_type: Option<String>,
    pub study_type: Option<String>,
    pub phases: Vec<String>,
    pub allocation: Option<String>,
    pub intervention_model: Option<String>,
    pub primary_purpose: Option<String>,
    pub masking: Option<String>,
    pub healthy_volunteers: Option<bool>,
    pub sex: Option<String>,
    pub min_age: Option<String>,
    pub max_age: Option<String>,
}

pub fn extract(study: &Value) -> TrialFields {
    let path = |module: &[&'static str], rest: &[&'static str]| -> Vec<&'static str> {
        module.iter().chain(rest).copied().collect()
    };
    let at = |module: &[&'static str], rest: &[&'static str]| lookup_str(study, &path(module, rest));

    TrialFields {
        study_id: at(IDENTIFICATION, &["nctId"]).unwrap_or_default(),
        status: at(STATUS, &["overallStatus"]),
        start_date: at(STATUS, &["startDateStruct", "date"]),
        start_date_type: at(STATUS, &["startDateStruct", "type"]),
        completion_date: at(STATUS, &["completionDateStruct", "date"]),
        completion_date_type: at(STATUS, &["completionDateStruct", "type"]),
        study_type: at(DESIGN, &["studyType"]),
        phases: phases(study),
        allocation: at(DESIGN, &["designInfo", "allocation"]),
        intervention_model: at(DESIGN, &["designInfo", "interventionModel"]),
        primary_purpose: at(DESIGN, &["designInfo", "primaryPurpose"]),
        masking: at(DESIGN, &["designInfo", "maskingInfo", "masking"]),
        healthy_volunteers: lookup_bool(study, &path(ELIGIBILITY, &["healthyVolunteers"])),
        sex: at(ELIGIBILITY, &["sex"]),
        min_age: at(ELIGIBILITY, &["minimumAge"]),
        max_age: at(ELIGIBILITY, &["maximumAge"]),
    }
}

// A null or missing list is the same as no phases; the CSV cell is then `[]`.
fn phases(study: &Value) -> Vec<String> {
    lookup_array(study, &["protocolSection", "designModule", "phases"])
        .iter()
        .filter_map(|p| p.as_str().map(str::to_string))
        .collect()
}
