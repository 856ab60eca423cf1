use chrono::NaiveDate;

/// Filter set sent with every studies request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyQuery {
    pub condition: String,
    pub start_date: NaiveDate,
    pub page_size: u32,
}

impl StudyQuery {
    /// `AREA[StartDate]RANGE[<start>,MAX]`: studies starting on or after `start_date`.
    pub fn advanced_filter(&self) -> String {
        format!(
            "AREA[StartDate]RANGE[{},MAX]",
            self.start_date.format("%Y-%m-%d")
        )
    }

    /// Encoded query string, with `pageToken` only on continuation requests.
    pub fn to_query_string(&self, page_token: Option<&str>) -> String {
        let mut params: Vec<(&str, String)> = vec![
            ("query.cond", self.condition.clone()),
            ("filter.advanced", self.advanced_filter()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        params.push(("pageSize", self.page_size.to_string()));

        params
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn url(&self, base_url: &str, page_token: Option<&str>) -> String {
        format!("{}?{}", base_url, self.to_query_string(page_token))
    }
}

/// Form-style encoding that leaves `[`, `]` and `+` readable.
/// Spaces become `+`, so a literal `+` and a space encode the same way.
pub fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw)
        .replace("%20", "+")
        .replace("%5B", "[")
        .replace("%5D", "]")
        .replace("%2B", "+")
}
