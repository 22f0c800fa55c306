use http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RFC 7807 problem details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: u16,
    pub title: String,
    pub instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Issue {
    /// Creates an issue for `status`; the instance is a time ordered UUID v7.
    pub fn new(status: StatusCode) -> Self {
        Self {
            kind: format!("https://httpstatuses.com/{}", status.as_u16()),
            status: status.as_u16(),
            title: status.canonical_reason().unwrap_or("Unknown").to_owned(),
            instance: Uuid::now_v7().to_string(),
            details: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_details(mut self, details: impl Into<serde_json::Value>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Issue;
    use http::StatusCode;
    use uuid::Uuid;

    #[test]
    fn test_issue_json() {
        let issue = Issue::new(StatusCode::NOT_IMPLEMENTED).with_details("NoMatch /a");
        let json = serde_json::to_value(&issue).unwrap();

        assert_eq!(json["type"], "https://httpstatuses.com/501");
        assert_eq!(json["status"], 501);
        assert_eq!(json["title"], "Not Implemented");
        assert_eq!(json["details"], "NoMatch /a");
        let instance = Uuid::parse_str(json["instance"].as_str().unwrap()).unwrap();
        assert_eq!(instance.get_version_num(), 7);
    }

    #[test]
    fn test_instances_are_unique() {
        let a = Issue::new(StatusCode::BAD_REQUEST);
        let b = Issue::new(StatusCode::BAD_REQUEST);
        assert_ne!(a.instance, b.instance);
    }

    #[test]
    fn test_details_are_optional() {
        let issue = Issue::new(StatusCode::UNAUTHORIZED).with_title("token expired");
        let json = serde_json::to_string(&issue).unwrap();
        assert!(!json.contains("details"));

        let decoded: Issue = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, issue);
    }
}
