use std::path::PathBuf;

use chrono::NaiveDate;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::query::StudyQuery;

pub const DEFAULT_BASE_URL: &str = "https://clinicaltrials.gov/api/v2/studies";
pub const DEFAULT_CONDITION: &str = "diabetes";
pub const DEFAULT_START_DATE: &str = "2019-01-01";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_OUTPUT: &str = "locations.csv";

const ENV_PREFIX: &str = "CTGOV";

/// Run settings: compiled-in defaults, then `CTGOV_*` environment variables,
/// then command-line flags (applied by the caller through [`Settings::override_with`]).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub condition: String,
    pub start_date: NaiveDate,
    pub page_size: u32,
    pub output: PathBuf,
    #[serde(default)]
    pub max_pages: Option<usize>,
    #[serde(default)]
    pub include_unlocated: bool,
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub condition: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub page_size: Option<u32>,
    pub output: Option<PathBuf>,
    pub max_pages: Option<usize>,
    pub include_unlocated: bool,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn from_environment(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("condition", DEFAULT_CONDITION)?
            .set_default("start_date", DEFAULT_START_DATE)?
            .set_default("page_size", i64::from(DEFAULT_PAGE_SIZE))?
            .set_default("output", DEFAULT_OUTPUT)?
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn override_with(mut self, o: Overrides) -> Self {
        if let Some(v) = o.base_url {
            self.base_url = v;
        }
        if let Some(v) = o.condition {
            self.condition = v;
        }
        if let Some(v) = o.start_date {
            self.start_date = v;
        }
        if let Some(v) = o.page_size {
            self.page_size = v;
        }
        if let Some(v) = o.output {
            self.output = v;
        }
        if o.max_pages.is_some() {
            self.max_pages = o.max_pages;
        }
        self.include_unlocated |= o.include_unlocated;
        self
    }

    pub fn query(&self) -> StudyQuery {
        StudyQuery {
            condition: self.condition.clone(),
            start_date: self.start_date,
            page_size: self.page_size,
        }
    }
}
