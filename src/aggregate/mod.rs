pub mod dates;

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::model::Ticket;

/// Sentinel for tickets with no company value.
pub const UNKNOWN_COMPANY: &str = "unknown";
/// Sentinel for tickets with no theme tag.
pub const UNSPECIFIED_THEME: &str = "unspecified";
/// Sentinel for tickets with no project tag.
pub const UNKNOWN_PROJECT: &str = "unknown";

const TOP_THEMES: usize = 5;
const TOP_PROJECTS: usize = 3;
const SHORT_DESCRIPTION_WORDS: usize = 5;

/// All tickets sharing one company value, in input order.
#[derive(Debug)]
pub struct CompanyGroup<'a> {
    pub company: String,
    pub tickets: Vec<&'a Ticket>,
}

/// Per-company statistical summary, the input to prompt construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub company: String,
    pub total_count: u64,
    /// Tickets whose description is missing, empty, or under 5 words.
    pub empty_or_short_count: u64,
    /// Up to 5 (theme, count) pairs, most frequent first.
    pub top_themes: Vec<(String, u64)>,
    /// Up to 3 (project, count) pairs, most frequent first.
    pub top_projects: Vec<(String, u64)>,
    /// Tickets per calendar month within the trailing window, ascending.
    pub monthly_trend: BTreeMap<String, u64>,
    /// Tickets per week-of-year within the trailing window, ascending.
    pub weekly_trend: BTreeMap<String, u64>,
    /// Tickets per weekday name, in first-encountered order.
    pub daily_trend: Vec<(String, u64)>,
}

/// Frequency counter that remembers first-seen order so that top-N selection
/// breaks ties the way the input arrived.
#[derive(Debug, Default)]
struct OrderedCounter {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl OrderedCounter {
    fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    /// The `n` most frequent entries, count descending. The sort is stable,
    /// so equal counts keep first-seen order.
    fn into_top(mut self, n: usize) -> Vec<(String, u64)> {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries.truncate(n);
        self.entries
    }
}

/// Partition tickets by company. Tickets with no company value land under
/// the `UNKNOWN_COMPANY` sentinel. Group order follows the order companies
/// first appear in the input; ticket order within a group matches the input.
pub fn group_by_company(tickets: &[Ticket]) -> Vec<CompanyGroup<'_>> {
    let mut groups: Vec<CompanyGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for ticket in tickets {
        let company = ticket.company.as_deref().unwrap_or(UNKNOWN_COMPANY);
        match index.get(company) {
            Some(&i) => groups[i].tickets.push(ticket),
            None => {
                index.insert(company.to_string(), groups.len());
                groups.push(CompanyGroup {
                    company: company.to_string(),
                    tickets: vec![ticket],
                });
            }
        }
    }
    groups
}

/// Compute the summary for one company's tickets.
///
/// Pure given `(tickets, now, window_days)`: the trailing window is
/// `now - window_days` with an inclusive lower bound. Tickets whose creation
/// date does not parse are logged at warn level and excluded from the trend
/// buckets only; they still count toward `total_count` and the description
/// check.
pub fn compute_summary(
    company: &str,
    tickets: &[&Ticket],
    now: NaiveDateTime,
    window_days: u32,
) -> Summary {
    let window_start = now - Duration::days(window_days as i64);

    let mut empty_or_short_count = 0u64;
    let mut themes = OrderedCounter::default();
    let mut projects = OrderedCounter::default();
    let mut monthly_trend: BTreeMap<String, u64> = BTreeMap::new();
    let mut weekly_trend: BTreeMap<String, u64> = BTreeMap::new();
    let mut daily = OrderedCounter::default();

    for ticket in tickets {
        if is_empty_or_short(ticket.description.as_deref()) {
            empty_or_short_count += 1;
        }
        themes.add(ticket.themes.as_deref().unwrap_or(UNSPECIFIED_THEME));
        projects.add(ticket.project.as_deref().unwrap_or(UNKNOWN_PROJECT));

        let created = match dates::parse_creation_date(&ticket.date_creation) {
            Ok(dt) => dt,
            Err(_) => {
                log::warn!(
                    "Ticket #{}: unrecognized date format: {}",
                    ticket.id,
                    ticket.date_creation
                );
                continue;
            }
        };
        if created >= window_start {
            *monthly_trend.entry(dates::month_key(created)).or_insert(0) += 1;
            *weekly_trend.entry(dates::week_key(created)).or_insert(0) += 1;
            daily.add(&dates::weekday_key(created));
        }
    }

    Summary {
        company: company.to_string(),
        total_count: tickets.len() as u64,
        empty_or_short_count,
        top_themes: themes.into_top(TOP_THEMES),
        top_projects: projects.into_top(TOP_PROJECTS),
        monthly_trend,
        weekly_trend,
        daily_trend: daily.entries,
    }
}

fn is_empty_or_short(description: Option<&str>) -> bool {
    match description {
        None => true,
        Some(d) => d.split_whitespace().count() < SHORT_DESCRIPTION_WORDS,
    }
}

/// Render "key: count" pairs joined by commas, for prompt interpolation.
pub fn format_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a u64)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Summary {
    pub fn top_themes_line(&self) -> String {
        format_pairs(self.top_themes.iter().map(|(k, v)| (k, v)))
    }

    pub fn top_projects_line(&self) -> String {
        format_pairs(self.top_projects.iter().map(|(k, v)| (k, v)))
    }

    pub fn monthly_trend_line(&self) -> String {
        format_pairs(self.monthly_trend.iter())
    }

    pub fn weekly_trend_line(&self) -> String {
        format_pairs(self.weekly_trend.iter())
    }

    pub fn daily_trend_line(&self) -> String {
        format_pairs(self.daily_trend.iter().map(|(k, v)| (k, v)))
    }
}
