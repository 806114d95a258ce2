use crate::aggregate::{Summary, UNSPECIFIED_THEME};
use crate::model::Ticket;
use crate::text::clean_description;

/// The root-cause analysis methods applied by the `causes` and `methods`
/// report flavors: (file-name key, prompt description).
pub const ANALYSIS_METHODS: &[(&str, &str)] = &[
    (
        "five_whys",
        "Detailed root cause analysis using the 5 Whys method.",
    ),
    (
        "fishbone",
        "Cause analysis using an Ishikawa (5M / fishbone) diagram.",
    ),
    (
        "pareto",
        "Pareto (80/20) analysis to identify the highest-impact problems.",
    ),
    (
        "time_series",
        "Time series analysis of incident trends.",
    ),
    (
        "spc",
        "Statistical Process Control (control chart) analysis.",
    ),
    (
        "text_mining",
        "Text mining and NLP analysis to surface hidden patterns.",
    ),
    (
        "correlation",
        "Correlation and factor analysis of the incidents.",
    ),
];

/// Split a company's tickets into prompt-sized batches.
pub fn batches<'a>(tickets: &'a [&'a Ticket], batch_size: usize) -> Vec<&'a [&'a Ticket]> {
    if tickets.is_empty() {
        return Vec::new();
    }
    tickets.chunks(batch_size.max(1)).collect()
}

/// One ticket rendered as a prompt block, description sanitized.
fn ticket_block(ticket: &Ticket) -> String {
    format!(
        "Ticket #{} :\n\
         - Title: {}\n\
         - Description: {}\n\
         - Priority: {}\n\
         - Themes: {}\n\
         - Tracked time: {}h\n\
         - Created: {}\n\n",
        ticket.id,
        ticket.title,
        clean_description(ticket.description.as_deref()),
        ticket.priority,
        ticket.themes.as_deref().unwrap_or(UNSPECIFIED_THEME),
        ticket.tracked_hours,
        ticket.date_creation,
    )
}

fn stats_section(summary: &Summary) -> String {
    format!(
        "- Total tickets: {}\n\
         - Empty or very short tickets: {}\n\
         - Main themes: {}\n\
         - Main projects: {}\n\
         - Trend over the trailing window (monthly): {}\n\
         - Weekly trend: {}\n\
         - Per-weekday trend: {}\n",
        summary.total_count,
        summary.empty_or_short_count,
        summary.top_themes_line(),
        summary.top_projects_line(),
        summary.monthly_trend_line(),
        summary.weekly_trend_line(),
        summary.daily_trend_line(),
    )
}

/// The five-section support analysis report prompt for one batch of tickets.
pub fn report_prompt(company: &str, summary: &Summary, tickets: &[&Ticket]) -> String {
    let mut prompt = format!(
        r#"You are an expert IT support analyst. Analyze the support tickets for the company '{company}' and produce a detailed, structured report in plain markdown with the following sections:

---

## 1. General statistics
{stats}
Expected analysis:
- Identify activity peaks and their likely causes.
- Detect recurring patterns (weekday, start/end of month).
- Compare recurring projects and themes.

---

## 2. Critical problems
- Identify recurring problems and their associated themes.
- Give concrete ticket examples illustrating each problem.
- Rank problems by decreasing frequency.

---

## 3. Existing solutions
- List the solutions already applied and their effectiveness.
- Point out solutions that were reused across several tickets.

---

## 4. Improvement proposals
- Recommend specific actions to prevent recurrence.
- Suggest automation or tooling improvements.
- Give good practices grounded in the observed problems.

---

## 5. Risks and points of attention
- Identify critical areas needing particular attention.
- Propose prevention and anticipation strategies.

---

Style: clear headings and bullet points, figures and percentages to back
every claim, professional prose with no visible instructions.

---

Tickets to analyze:

"#,
        stats = stats_section(summary),
    );
    for ticket in tickets {
        prompt.push_str(&ticket_block(ticket));
    }
    prompt.push_str("\nA complete and detailed analysis is expected.\n");
    prompt
}

/// The deep root-cause report prompt: same statistics, but the analysis
/// section walks through every method in `ANALYSIS_METHODS` inline.
pub fn causes_prompt(company: &str, summary: &Summary, tickets: &[&Ticket]) -> String {
    let methods = ANALYSIS_METHODS
        .iter()
        .map(|(_, desc)| format!("  - {desc} Work through it in detail and explain your reasoning."))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = format!(
        r#"You are a senior IT support analyst. Analyze the support tickets for the company '{company}' and produce a detailed report in plain markdown.

---

## 1. General statistics
{stats}
Expected analysis:
- Identify activity peaks and their causes.
- Detect recurring patterns (by weekday, start of month, end of month).
- Compare recurring projects and themes.

---

## 2. Deep root-cause analysis
- Identify recurring problems and their associated themes.
- Explain the root causes: technical, human, organizational.
- Rank problems by frequency and impact.
- Distinguish persistent problems from problems tied to recent changes.
- Apply each of the following methods:
{methods}

---

Tickets to analyze:

"#,
        stats = stats_section(summary),
    );
    for ticket in tickets {
        prompt.push_str(&ticket_block(ticket));
    }
    prompt.push_str(
        "\nIMPORTANT: respond in clear professional prose, with no visible instructions.\n",
    );
    prompt
}

/// One standalone prompt per analysis method, each usable as an independent
/// request against the same statistics.
pub fn method_prompt(company: &str, summary: &Summary, method_description: &str) -> String {
    format!(
        r#"Advanced analysis for the company '{company}': {method_description}

Ticket statistics:
{stats}
- Apply this method to the data above.
- Explain the results and your reasoning in detail.
"#,
        stats = stats_section(summary),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{compute_summary, group_by_company};
    use crate::model::{Ticket, TicketId};

    fn sample_tickets() -> Vec<Ticket> {
        (0..3)
            .map(|i| Ticket {
                id: TicketId::Number(i),
                company: Some("Acme".into()),
                title: format!("Issue {i}"),
                description: Some("the printer\n\nwill not print anything at all".into()),
                priority: "high".into(),
                themes: Some("Hardware".into()),
                project: Some("Office".into()),
                tracked_hours: 1.5,
                date_creation: "15/03/2024 10:00".into(),
            })
            .collect()
    }

    #[test]
    fn test_report_prompt_contains_stats_and_tickets() {
        let tickets = sample_tickets();
        let groups = group_by_company(&tickets);
        let now = crate::config::parse_now("2024-04-01").unwrap();
        let summary = compute_summary(&groups[0].company, &groups[0].tickets, now, 180);

        let prompt = report_prompt("Acme", &summary, &groups[0].tickets);
        assert!(prompt.contains("Total tickets: 3"));
        assert!(prompt.contains("Hardware: 3"));
        assert!(prompt.contains("2024-03: 3"));
        assert!(prompt.contains("Ticket #0"));
        assert!(prompt.contains("Ticket #2"));
        // Sanitizer ran: no raw newlines inside the description block.
        assert!(prompt.contains("the printer will not print anything at all"));
    }

    #[test]
    fn test_causes_prompt_names_all_methods() {
        let tickets = sample_tickets();
        let groups = group_by_company(&tickets);
        let now = crate::config::parse_now("2024-04-01").unwrap();
        let summary = compute_summary(&groups[0].company, &groups[0].tickets, now, 180);
        let prompt = causes_prompt("Acme", &summary, &groups[0].tickets);
        for (_, desc) in ANALYSIS_METHODS {
            assert!(prompt.contains(desc), "missing method: {desc}");
        }
    }

    #[test]
    fn test_method_prompt_is_standalone() {
        let tickets = sample_tickets();
        let groups = group_by_company(&tickets);
        let now = crate::config::parse_now("2024-04-01").unwrap();
        let summary = compute_summary(&groups[0].company, &groups[0].tickets, now, 180);
        let prompt = method_prompt("Acme", &summary, "Pareto (80/20) analysis.");
        assert!(prompt.contains("Pareto"));
        assert!(prompt.contains("Total tickets: 3"));
        // Method prompts carry statistics only, not individual tickets.
        assert!(!prompt.contains("Ticket #0"));
    }

    #[test]
    fn test_batches_split() {
        let tickets = sample_tickets();
        let refs: Vec<&Ticket> = tickets.iter().collect();
        let chunks = batches(&refs, 2);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 2);
        assert_eq!(chunks[1].len(), 1);
        assert!(batches(&[], 50).is_empty());
    }
}
