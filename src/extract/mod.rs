pub mod location;
pub mod path;
pub mod trial;

use serde_json::Value;

use crate::rows::FlatRow;
use location::SiteLocation;
use trial::TrialFields;

/// What to emit for a study that reports no sites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Unlocated {
    /// No rows; the study is absent from the output.
    #[default]
    Drop,
    /// One row with empty location columns.
    Keep,
}

/// Cross-join one study's trial fields with each of its sites.
pub fn flatten_study(study: &Value, unlocated: Unlocated) -> Vec<FlatRow> {
    let trial = trial::extract(study);
    let sites = location::extract(study);

    if sites.is_empty() {
        return match unlocated {
            Unlocated::Drop => Vec::new(),
            Unlocated::Keep => vec![join(&trial, &SiteLocation::default())],
        };
    }

    sites.iter().map(|site| join(&trial, site)).collect()
}

/// Flatten a page of studies onto `out`, keeping registry order.
pub fn flatten_into(studies: &[Value], unlocated: Unlocated, out: &mut Vec<FlatRow>) {
    for study in studies {
        out.extend(flatten_study(study, unlocated));
    }
}

fn join(trial: &TrialFields, site: &SiteLocation) -> FlatRow {
    FlatRow {
        study_id: trial.study_id.clone(),
        city: site.city.clone(),
        state: site.state.clone(),
        country: site.country.clone(),
        lat: site.lat,
        lon: site.lon,
        status: trial.status.clone(),
        start_date: trial.start_date.clone(),
        start_date_type: trial.start_date_type.clone(),
        completion_date: trial.completion_date.clone(),
        completion_date_type: trial.completion_date_type.clone(),
        study_type: trial.study_type.clone(),
        phases: trial.phases.clone(),
        allocation: trial.allocation.clone(),
        intervention_model: trial.intervention_model.clone(),
        primary_purpose: trial.primary_purpose.clone(),
        masking: trial.masking.clone(),
        healthy_volunteers: trial.healthy_volunteers,
        sex: trial.sex.clone(),
        min_age: trial.min_age.clone(),
        max_age: trial.max_age.clone(),
    }
}

// ── Tests ──
