//! Label domain model.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{TaskManagerError, TaskManagerResult};

/// A scope-global label, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// Hex colour without the leading `#`.
    pub color: String,
    pub description: Option<String>,
}

impl Label {
    pub fn validate(&self) -> TaskManagerResult<()> {
        if self.name.trim().is_empty() {
            return Err(TaskManagerError::malformed("label.name"));
        }
        Ok(())
    }
}

/// Find a label by exact name.
pub fn find_label<'a>(labels: &'a [Label], name: &str) -> Option<&'a Label> {
    labels.iter().find(|l| l.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_label_is_exact_match() {
        let labels = vec![
            Label {
                name: "bug".to_string(),
                color: "d73a4a".to_string(),
                description: None,
            },
            Label {
                name: "Bug report".to_string(),
                color: "e4e669".to_string(),
                description: Some("Reports".to_string()),
            },
        ];
        assert_eq!(find_label(&labels, "bug").map(|l| l.color.as_str()), Some("d73a4a"));
        assert!(find_label(&labels, "Bug").is_none());
    }
}
