pub mod adapters;
pub mod config;
pub mod models;
pub mod server;
pub mod store;
pub mod telegram;
pub mod workflow;

pub use adapters::{IntelAdapter, LookupClient, LookupError, NameAdapter};
pub use config::Config;
pub use models::{InvalidNumber, LinkButton, LookupResult, PhoneNumber, Reply};
pub use store::{CommunityLedger, JsonStore, ReportStore, StoreError};
pub use telegram::TelegramClient;
pub use workflow::{action_links, render_reply, Workflow, WorkflowError};
