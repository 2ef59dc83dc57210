//! Jira integration: the search client, the shared registration contract, and
//! the two ingestion paths (recurring poller and push webhook).

pub mod client;
pub mod models;
pub mod poller;
pub mod registration;
pub mod webhook;
