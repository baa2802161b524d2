use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::adapters::{LookupClient, LookupError};
use crate::models::{
    InvalidNumber, LinkButton, LookupResult, PhoneNumber, Reply, NAME_NOT_FOUND,
};
use crate::store::{ReportStore, StoreError};

/// User-visible text for input that does not normalize to a phone number
pub const INVALID_NUMBER_REPLY: &str = "❌ Invalid number";

/// User-visible text for any failed lookup; detail goes to the logs only
pub const LOOKUP_FAILED_REPLY: &str = "❌ Lookup failed";

const NO_REPORTS_PLACEHOLDER: &str = "No reports";

/// Everything that can end a request early. Converted to one of the two
/// short user-facing replies at the workflow boundary; nothing propagates
/// past it.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    InvalidNumber(#[from] InvalidNumber),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WorkflowError::InvalidNumber(_) => INVALID_NUMBER_REPLY,
            WorkflowError::Lookup(_) | WorkflowError::Store(_) => LOOKUP_FAILED_REPLY,
        }
    }
}

/// Orchestrates one inbound message: normalize, joined lookup, merge into
/// the report store, render the reply card.
pub struct Workflow<S: ReportStore> {
    lookup: LookupClient,
    store: S,
    // Serializes the load-mutate-save window so overlapping requests cannot
    // silently drop each other's reports.
    store_lock: Mutex<()>,
}

impl<S: ReportStore> Workflow<S> {
    pub fn new(lookup: LookupClient, store: S) -> Self {
        Self {
            lookup,
            store,
            store_lock: Mutex::new(()),
        }
    }

    /// Handle one inbound text. Never fails: errors become their short
    /// user-facing reply here.
    pub async fn handle_message(&self, text: &str) -> Reply {
        match self.lookup_number(text).await {
            Ok(reply) => reply,
            Err(err @ WorkflowError::InvalidNumber(_)) => {
                debug!(error = %err, "Rejected input");
                Reply::plain(err.user_message())
            }
            Err(err) => {
                warn!(error = %err, "Lookup workflow failed");
                Reply::plain(err.user_message())
            }
        }
    }

    async fn lookup_number(&self, text: &str) -> Result<Reply, WorkflowError> {
        let number = PhoneNumber::parse(text)?;

        let result = self.lookup.lookup(&number).await?;

        let reports = self.record_and_list(&number, &result.name).await?;

        info!(number = %number, reports = reports.len(), "Rendering reply");

        Ok(Reply {
            text: render_reply(&number, &result, &reports),
            links: action_links(&number),
        })
    }

    /// Load-mutate-save under the store lock, then read back the current
    /// report list. A failed save is logged and the in-memory state still
    /// answers the request.
    async fn record_and_list(
        &self,
        number: &PhoneNumber,
        name: &str,
    ) -> Result<Vec<String>, StoreError> {
        let _guard = self.store_lock.lock().await;

        let mut ledger = self.store.load()?;

        if name != NAME_NOT_FOUND && ledger.record_if_new(number, name) {
            info!(number = %number, "Recorded new community report");
            if let Err(err) = self.store.save(&ledger) {
                warn!(error = %err, "Failed to persist report, continuing with in-memory state");
            }
        }

        Ok(ledger.names_for(number).to_vec())
    }
}

/// Render the reply card for one lookup
pub fn render_reply(number: &PhoneNumber, result: &LookupResult, reports: &[String]) -> String {
    format!(
        "\n╭─── Phone Lookup ───╮\n\
         \n\
         📱 Number: +{number}\n\
         🌍 Country: {country}\n\
         \n\
         🔎 Caller ID:\n\
         Name: {name}\n\
         Carrier: {carrier}\n\
         Location: {location}\n\
         \n\
         🔎 Community Reports:\n\
         {reports}\n\
         \n\
         ╰────────────────────────╯\n",
        number = number,
        country = result.country,
        name = result.name,
        carrier = result.carrier,
        location = result.location,
        reports = render_report_tree(reports),
    )
}

/// Render the community list as a tree: interior branches `├ `, terminal
/// branch `└ `, insertion order preserved. An empty list renders a single
/// placeholder line.
fn render_report_tree(reports: &[String]) -> String {
    if reports.is_empty() {
        return format!("└ {NO_REPORTS_PLACEHOLDER}");
    }

    reports
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i == reports.len() - 1 {
                format!("└ {name}")
            } else {
                format!("├ {name}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Deep links offered alongside every successful lookup
pub fn action_links(number: &PhoneNumber) -> Vec<LinkButton> {
    vec![
        LinkButton {
            label: "💬 WhatsApp".to_string(),
            url: format!("https://wa.me/{number}"),
        },
        LinkButton {
            label: "📨 Telegram".to_string(),
            url: format!("https://t.me/+{number}"),
        },
    ]
}
