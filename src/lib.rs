pub mod aggregate;
pub mod config;
pub mod error;
pub mod llm;
pub mod model;
pub mod prompt;
pub mod report;
pub mod text;

use std::path::PathBuf;

use serde::Serialize;

pub use aggregate::{compute_summary, group_by_company, CompanyGroup, Summary};
pub use config::Config;
pub use error::{Error, Result};
pub use model::{load_tickets, Ticket, TicketId};

/// Progress reporter for long-running report generation.
pub trait ReportProgress {
    fn on_company_start(&self, _company: &str, _index: usize, _total: usize) {}
    fn on_batch_complete(&self, _company: &str, _batch: usize, _total: usize) {}
    fn on_company_complete(&self, _outcome: &ReportOutcome) {}
}

/// Progress reporter that does nothing (for library use and tests).
pub struct NoopProgress;

impl ReportProgress for NoopProgress {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReportStatus {
    Success,
    PartialFailure,
    Failed,
}

/// Outcome of report generation for one company.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub company: String,
    pub status: ReportStatus,
    pub batches_completed: u32,
    pub batches_total: u32,
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl ReportOutcome {
    fn from_counts(
        company: String,
        batches_completed: u32,
        batches_total: u32,
        output_path: Option<PathBuf>,
        error: Option<String>,
    ) -> Self {
        let status = if batches_completed == batches_total && error.is_none() {
            ReportStatus::Success
        } else if batches_completed > 0 {
            ReportStatus::PartialFailure
        } else {
            ReportStatus::Failed
        };
        Self {
            company,
            status,
            batches_completed,
            batches_total,
            output_path,
            error,
        }
    }
}

/// Main entry point: a loaded ticket set plus the run configuration.
///
/// Tickets are read once, held in memory, and never mutated. Summaries are
/// recomputed on demand; nothing is cached across runs.
pub struct TicketScope {
    config: Config,
    tickets: Vec<Ticket>,
}

impl TicketScope {
    /// Load the configured ticket source. Malformed JSON is fatal.
    pub fn load(config: Config) -> Result<Self> {
        let tickets = model::load_tickets(&config.source)?;
        Ok(Self { config, tickets })
    }

    /// Build from an already-loaded ticket list (for tests).
    pub fn from_tickets(config: Config, tickets: Vec<Ticket>) -> Self {
        Self { config, tickets }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// All company groups, in first-encountered order.
    pub fn companies(&self) -> Vec<CompanyGroup<'_>> {
        aggregate::group_by_company(&self.tickets)
    }

    /// The group for one company, if it has any tickets.
    pub fn company(&self, name: &str) -> Result<CompanyGroup<'_>> {
        self.companies()
            .into_iter()
            .find(|g| g.company == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Aggregator summaries for every company.
    pub fn summaries(&self) -> Vec<Summary> {
        let now = self.config.reference_now();
        self.companies()
            .iter()
            .map(|g| {
                aggregate::compute_summary(&g.company, &g.tickets, now, self.config.window_days)
            })
            .collect()
    }

    /// Aggregator summary for one company group.
    pub fn summarize(&self, group: &CompanyGroup<'_>) -> Summary {
        aggregate::compute_summary(
            &group.company,
            &group.tickets,
            self.config.reference_now(),
            self.config.window_days,
        )
    }

    /// Generate the five-section analysis report for one company: prompt
    /// batches against the LLM, joined responses written as summary JSON
    /// and report text. Failed batches degrade the outcome instead of
    /// aborting the run.
    pub async fn report_company(
        &self,
        agent: &mixtape_core::Agent,
        group: &CompanyGroup<'_>,
        progress: &dyn ReportProgress,
    ) -> ReportOutcome {
        let summary = self.summarize(group);
        log::info!(
            "Analyzing company: {} ({} tickets)",
            group.company,
            group.tickets.len()
        );

        let batches = prompt::batches(&group.tickets, self.config.batch_size);
        let batches_total = batches.len() as u32;
        let mut responses: Vec<String> = Vec::new();
        let mut completed = 0u32;
        let mut last_error: Option<String> = None;

        for (i, batch) in batches.iter().enumerate() {
            let text = prompt::report_prompt(&group.company, &summary, batch);
            match llm::run_with_retry(agent, &text, self.config.max_retries).await {
                Ok(response) => {
                    responses.push(response);
                    completed += 1;
                    progress.on_batch_complete(&group.company, i + 1, batches.len());
                }
                Err(e) => {
                    log::error!(
                        "Batch {}/{} failed for {}: {e}",
                        i + 1,
                        batches.len(),
                        group.company
                    );
                    last_error = Some(e.to_string());
                }
            }
        }

        let output_path = if responses.is_empty() {
            None
        } else {
            let joined = responses.join("\n\n");
            match self.write_outputs(&group.company, "report.md", &joined) {
                Ok(path) => Some(path),
                Err(e) => {
                    last_error = Some(e.to_string());
                    None
                }
            }
        };

        ReportOutcome::from_counts(
            group.company.clone(),
            completed,
            batches_total,
            output_path,
            last_error,
        )
    }

    /// Generate reports for every company, sequentially.
    pub async fn report_all(
        &self,
        agent: &mixtape_core::Agent,
        progress: &dyn ReportProgress,
    ) -> Vec<ReportOutcome> {
        let groups = self.companies();
        let total = groups.len();
        let mut outcomes = Vec::with_capacity(total);
        for (i, group) in groups.iter().enumerate() {
            progress.on_company_start(&group.company, i, total);
            let outcome = self.report_company(agent, group, progress).await;
            progress.on_company_complete(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Generate the deep root-cause report for one company. The whole group
    /// goes into a single prompt; the seven analysis methods are applied
    /// inline by the model.
    pub async fn causes_company(
        &self,
        agent: &mixtape_core::Agent,
        group: &CompanyGroup<'_>,
    ) -> ReportOutcome {
        let summary = self.summarize(group);
        log::info!(
            "Root-cause analysis for: {} ({} tickets)",
            group.company,
            group.tickets.len()
        );

        let text = prompt::causes_prompt(&group.company, &summary, &group.tickets);
        match llm::run_with_retry(agent, &text, self.config.max_retries).await {
            Ok(response) => match self.write_outputs(&group.company, "causes.md", &response) {
                Ok(path) => {
                    ReportOutcome::from_counts(group.company.clone(), 1, 1, Some(path), None)
                }
                Err(e) => ReportOutcome::from_counts(
                    group.company.clone(),
                    1,
                    1,
                    None,
                    Some(e.to_string()),
                ),
            },
            Err(e) => {
                log::error!("Root-cause analysis failed for {}: {e}", group.company);
                ReportOutcome::from_counts(group.company.clone(), 0, 1, None, Some(e.to_string()))
            }
        }
    }

    /// Run the seven standalone method analyses for one company, each as an
    /// independent completion written to its own file.
    pub async fn method_analyses(
        &self,
        agent: &mixtape_core::Agent,
        group: &CompanyGroup<'_>,
        progress: &dyn ReportProgress,
    ) -> ReportOutcome {
        let summary = self.summarize(group);
        let total = prompt::ANALYSIS_METHODS.len() as u32;
        let mut completed = 0u32;
        let mut last_error: Option<String> = None;
        let mut last_path: Option<PathBuf> = None;

        for (i, (key, description)) in prompt::ANALYSIS_METHODS.iter().enumerate() {
            let text = prompt::method_prompt(&group.company, &summary, description);
            match llm::run_with_retry(agent, &text, self.config.max_retries).await {
                Ok(response) => {
                    let file_name = format!("method_{key}.md");
                    match report::write_report_text(
                        &self.config.output_dir,
                        &group.company,
                        &file_name,
                        &response,
                    ) {
                        Ok(path) => {
                            completed += 1;
                            last_path = Some(path);
                            progress.on_batch_complete(&group.company, i + 1, total as usize);
                        }
                        Err(e) => last_error = Some(e.to_string()),
                    }
                }
                Err(e) => {
                    log::error!("Method '{key}' failed for {}: {e}", group.company);
                    last_error = Some(e.to_string());
                }
            }
        }

        ReportOutcome::from_counts(
            group.company.clone(),
            completed,
            total,
            last_path,
            last_error,
        )
    }

    fn write_outputs(&self, company: &str, file_name: &str, text: &str) -> Result<PathBuf> {
        report::write_summary_json(&self.config.output_dir, company, text)?;
        report::write_report_text(&self.config.output_dir, company, file_name, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(company: &str, date: &str, themes: &str) -> Ticket {
        Ticket {
            id: TicketId::Number(1),
            company: Some(company.to_string()),
            title: "title".into(),
            description: Some("a reasonably long ticket description body here".into()),
            priority: "normal".into(),
            themes: Some(themes.to_string()),
            project: None,
            tracked_hours: 0.5,
            date_creation: date.to_string(),
        }
    }

    fn scope() -> TicketScope {
        let config = Config {
            now: Some(config::parse_now("2024-04-01").unwrap()),
            ..Config::default()
        };
        TicketScope::from_tickets(
            config,
            vec![
                ticket("Acme", "15/03/2024 10:00", "Auth"),
                ticket("Globex", "2024-03-20", "Billing"),
                ticket("Acme", "2024-03-21", "Auth"),
            ],
        )
    }

    #[test]
    fn test_companies_and_lookup() {
        let scope = scope();
        let groups = scope.companies();
        assert_eq!(groups.len(), 2);
        assert_eq!(scope.company("Acme").unwrap().tickets.len(), 2);
        assert!(matches!(
            scope.company("Initech").unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[test]
    fn test_summaries_cover_every_company() {
        let scope = scope();
        let summaries = scope.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].company, "Acme");
        assert_eq!(summaries[0].total_count, 2);
        assert_eq!(summaries[0].top_themes[0], ("Auth".to_string(), 2));
        assert_eq!(summaries[1].total_count, 1);
    }

    #[test]
    fn test_outcome_status_derivation() {
        let ok = ReportOutcome::from_counts("A".into(), 2, 2, None, None);
        assert_eq!(ok.status, ReportStatus::Success);
        let partial = ReportOutcome::from_counts("A".into(), 1, 2, None, Some("x".into()));
        assert_eq!(partial.status, ReportStatus::PartialFailure);
        let failed = ReportOutcome::from_counts("A".into(), 0, 2, None, Some("x".into()));
        assert_eq!(failed.status, ReportStatus::Failed);
    }
}
