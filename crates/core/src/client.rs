//! HTTP access to the availability and goal feeds.

use chrono::NaiveDate;
use reqwest::Client;
use tracing::debug;

use crate::{
    config::AppConfig,
    error::LoadError,
    models::{DayRoster, Goal, GoalFeed},
};

/// Client for the day-roster and goal endpoints.
///
/// Cheap to clone; fetch tasks take a clone and report back over a channel
/// tagged with the date the request was issued for.
#[derive(Debug, Clone)]
pub struct DayClient {
    http: Client,
    roster_url: String,
    goals_url: String,
}

impl DayClient {
    /// Build a client from configuration, rejecting missing endpoints
    /// before any request goes out.
    pub fn new(config: &AppConfig) -> Result<Self, LoadError> {
        if config.roster_url.trim().is_empty() {
            return Err(LoadError::Config("roster_url"));
        }
        if config.goals_url.trim().is_empty() {
            return Err(LoadError::Config("goals_url"));
        }
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            roster_url: config.roster_url.clone(),
            goals_url: config.goals_url.clone(),
        })
    }

    /// Fetch available and blocked resources for `date`.
    pub async fn roster(&self, date: NaiveDate) -> Result<DayRoster, LoadError> {
        let body = self.fetch(&self.roster_url, date).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch the goal feed for `date`.
    pub async fn goals(&self, date: NaiveDate) -> Result<Vec<Goal>, LoadError> {
        let body = self.fetch(&self.goals_url, date).await?;
        let feed: GoalFeed = serde_json::from_str(&body)?;
        Ok(feed.goals)
    }

    async fn fetch(&self, base: &str, date: NaiveDate) -> Result<String, LoadError> {
        let url = with_date_param(base, date);
        debug!(%url, "fetching");
        let response = self
            .http
            .get(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Append the `data=YYYY-MM-DD` query parameter, respecting an existing
/// query string.
fn with_date_param(base: &str, date: NaiveDate) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}data={}", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    #[test]
    fn date_param_respects_existing_queries() {
        assert_eq!(
            with_date_param("http://unit.local/roster", day()),
            "http://unit.local/roster?data=2026-08-07"
        );
        assert_eq!(
            with_date_param("http://unit.local/roster?unit=3", day()),
            "http://unit.local/roster?unit=3&data=2026-08-07"
        );
    }

    #[test]
    fn roster_fixture_decodes_with_and_without_reasons() {
        let body = r#"{
            "livres": [
                {"id": 1, "nome": "Alves"},
                {"id": 2, "nome": "Braga"}
            ],
            "impedidos": [
                {"nome": "Costa", "motivo": "Leave"},
                {"nome": "Dias"}
            ]
        }"#;
        let roster: DayRoster = serde_json::from_str(body).unwrap();
        assert_eq!(roster.available.len(), 2);
        assert_eq!(roster.available[0].name, "Alves");
        assert_eq!(roster.blocked[0].reason.as_deref(), Some("Leave"));
        assert_eq!(roster.blocked[1].reason, None);
    }

    #[test]
    fn roster_fixture_tolerates_missing_arrays() {
        let roster: DayRoster = serde_json::from_str("{}").unwrap();
        assert!(roster.available.is_empty());
        assert!(roster.blocked.is_empty());
    }

    #[test]
    fn goal_feed_fixture_decodes_optional_fields() {
        let body = r#"{
            "metas": [
                {
                    "id": 7,
                    "nome": "Inspections",
                    "data_limite": "2026-08-31",
                    "alocado_unidade": 4,
                    "executado_unidade": 1,
                    "meta_total": 12
                },
                {"id": 8, "nome": "Night patrol"}
            ]
        }"#;
        let feed: GoalFeed = serde_json::from_str(body).unwrap();
        assert_eq!(feed.goals.len(), 2);
        assert_eq!(
            feed.goals[0].deadline,
            NaiveDate::from_ymd_opt(2026, 8, 31)
        );
        assert_eq!(feed.goals[0].progress_percent(), 25);
        assert_eq!(feed.goals[1].allocated, 0);
        assert_eq!(feed.goals[1].target, None);
    }

    #[test]
    fn malformed_bodies_surface_as_decode_errors() {
        let result: Result<DayRoster, _> =
            serde_json::from_str("not json").map_err(LoadError::from);
        assert!(matches!(result, Err(LoadError::Decode(_))));
    }

    #[test]
    fn missing_endpoints_are_rejected_up_front() {
        let config = AppConfig {
            roster_url: String::new(),
            goals_url: "http://unit.local/goals".to_string(),
            start_date: None,
        };
        assert!(matches!(
            DayClient::new(&config),
            Err(LoadError::Config("roster_url"))
        ));
    }
}
