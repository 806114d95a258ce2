use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ticket identifiers arrive as either numbers or strings depending on the
/// exporting system; both are accepted and used only for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TicketId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketId::Number(n) => write!(f, "{n}"),
            TicketId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One support ticket record from the JSON export.
///
/// `id`, `title`, `priority`, `trackedHours` and `dateCreation` are required:
/// a record missing one fails the load. The categorical fields (`company`,
/// `Themes`, `project`) and `description` are optional and mapped to sentinel
/// labels during aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    #[serde(default)]
    pub company: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: String,
    #[serde(rename = "Themes", default)]
    pub themes: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(rename = "trackedHours")]
    pub tracked_hours: f64,
    #[serde(rename = "dateCreation")]
    pub date_creation: String,
}

/// Load a flat JSON array of tickets. Missing files, unreadable content, and
/// malformed records are all fatal for the run.
pub fn load_tickets(path: &Path) -> Result<Vec<Ticket>> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let tickets: Vec<Ticket> = serde_json::from_str(&raw).map_err(|e| Error::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    log::info!("Loaded {} tickets from {}", tickets.len(), path.display());
    Ok(tickets)
}
