use serde::Deserialize;

/// An issue as returned by the search API and embedded in webhook payloads.
/// Only the fields the deploy log needs are decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    pub summary: Option<String>,
    pub assignee: Option<JiraUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub display_name: Option<String>,
}

impl JiraIssue {
    /// Deploy name for this issue; falls back to the key when the summary is blank.
    pub fn deploy_name(&self) -> String {
        self.fields
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.key)
            .to_string()
    }

    pub fn assignee_name(&self) -> Option<String> {
        self.fields
            .assignee
            .as_ref()
            .and_then(|a| a.display_name.clone())
            .filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

/// Payload of a Jira webhook delivery. Fields are optional so that any
/// well-formed JSON object decodes and the handler decides what is relevant.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub webhook_event: Option<String>,
    pub issue: Option<JiraIssue>,
    pub changelog: Option<Changelog>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Changelog {
    #[serde(default)]
    pub items: Vec<ChangelogItem>,
}

#[derive(Debug, Deserialize)]
pub struct ChangelogItem {
    pub field: String,
    #[serde(rename = "fromString")]
    pub from_status: Option<String>,
    #[serde(rename = "toString")]
    pub to_status: Option<String>,
}

impl WebhookEvent {
    /// The changelog entry for a workflow status change, if any.
    pub fn status_change(&self) -> Option<&ChangelogItem> {
        self.changelog
            .as_ref()?
            .items
            .iter()
            .find(|item| item.field == "status")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_search_issue() {
        let issue: JiraIssue = serde_json::from_value(json!({
            "key": "OPS-12",
            "fields": {
                "summary": "Roll out payments v3",
                "assignee": { "displayName": "Priya N" },
                "statuscategorychangedate": "2026-03-10T09:00:00.000+0000"
            }
        }))
        .unwrap();
        assert_eq!(issue.deploy_name(), "Roll out payments v3");
        assert_eq!(issue.assignee_name().as_deref(), Some("Priya N"));
    }

    #[test]
    fn test_unassigned_issue_has_no_owner() {
        let issue: JiraIssue = serde_json::from_value(json!({
            "key": "OPS-13",
            "fields": { "summary": "Hotfix", "assignee": null }
        }))
        .unwrap();
        assert_eq!(issue.assignee_name(), None);
    }

    #[test]
    fn test_blank_summary_falls_back_to_key() {
        let issue: JiraIssue = serde_json::from_value(json!({
            "key": "OPS-14",
            "fields": { "summary": "  " }
        }))
        .unwrap();
        assert_eq!(issue.deploy_name(), "OPS-14");
    }

    #[test]
    fn test_status_change_ignores_other_fields() {
        let event: WebhookEvent = serde_json::from_value(json!({
            "webhookEvent": "jira:issue_updated",
            "changelog": { "items": [
                { "field": "assignee", "fromString": null, "toString": "Priya N" },
                { "field": "status", "fromString": "In Review", "toString": "In Production" }
            ]}
        }))
        .unwrap();
        let change = event.status_change().unwrap();
        assert_eq!(change.from_status.as_deref(), Some("In Review"));
        assert_eq!(change.to_status.as_deref(), Some("In Production"));
    }
}
