//! Output formatting utilities for the CLI.

use serde::Serialize;

use crate::domain::models::{Comment, Label, Milestone, Ticket};

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate a string to a maximum number of characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

impl CommandOutput for Ticket {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("#{} {}", self.number, self.title),
            format!("  ID: {}", self.id),
            format!("  Status: {}", self.status),
        ];
        if let Some(assignee) = &self.assignee {
            lines.push(format!("  Assignee: {assignee}"));
        }
        if !self.labels.is_empty() {
            lines.push(format!("  Labels: {}", self.labels.join(", ")));
        }
        if let Some(milestone) = &self.milestone {
            lines.push(format!("  Milestone: {milestone}"));
        }
        lines.push(format!("  Created at: {}", self.created_at));
        lines.push(format!("  Updated at: {}", self.updated_at));
        if let Some(url) = &self.url {
            lines.push(format!("  URL: {url}"));
        }
        if let Some(body) = &self.body {
            lines.push(String::new());
            lines.push(body.clone());
        }
        lines.join("\n")
    }
}

/// A list of tickets.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct TicketList(pub Vec<Ticket>);

impl CommandOutput for TicketList {
    fn to_human(&self) -> String {
        if self.0.is_empty() {
            return "No tickets found.".to_string();
        }
        let mut lines: Vec<String> = self
            .0
            .iter()
            .map(|t| {
                format!(
                    "#{:<6} {:<7} {:<50} {}",
                    t.number,
                    t.status,
                    truncate(&t.title, 50),
                    t.assignee.as_deref().unwrap_or("-")
                )
            })
            .collect();
        lines.push(format!("\nShowing {} ticket(s)", self.0.len()));
        lines.join("\n")
    }
}

impl CommandOutput for Comment {
    fn to_human(&self) -> String {
        format!("{} commented at {}:\n{}", self.author, self.created_at, self.body)
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct CommentList(pub Vec<Comment>);

impl CommandOutput for CommentList {
    fn to_human(&self) -> String {
        if self.0.is_empty() {
            return "No comments.".to_string();
        }
        self.0
            .iter()
            .map(CommandOutput::to_human)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct LabelList(pub Vec<Label>);

impl CommandOutput for LabelList {
    fn to_human(&self) -> String {
        if self.0.is_empty() {
            return "No labels.".to_string();
        }
        self.0
            .iter()
            .map(|l| match &l.description {
                Some(desc) => format!("{:<24} #{}  {}", l.name, l.color, truncate(desc, 60)),
                None => format!("{:<24} #{}", l.name, l.color),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct MilestoneList(pub Vec<Milestone>);

impl CommandOutput for MilestoneList {
    fn to_human(&self) -> String {
        if self.0.is_empty() {
            return "No milestones.".to_string();
        }
        self.0
            .iter()
            .map(|m| {
                format!(
                    "{:<30} {:<7} {}",
                    m.title,
                    m.state.as_str(),
                    m.due_on.as_deref().unwrap_or("no due date")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Acknowledgement for operations that return nothing.
#[derive(Debug, Serialize)]
pub struct Done {
    pub ok: bool,
    pub message: String,
}

impl Done {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }
}

impl CommandOutput for Done {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TicketStatus;

    fn ticket() -> Ticket {
        Ticket {
            id: "I_1".to_string(),
            number: 7,
            title: "Fix login bug".to_string(),
            body: None,
            status: TicketStatus::Open,
            assignee: Some("mona".to_string()),
            labels: vec!["bug".to_string()],
            milestone: None,
            created_at: "2024-01-14T08:00:00Z".to_string(),
            updated_at: "2024-01-15T10:30:00Z".to_string(),
            url: None,
        }
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_ticket_human_output() {
        let text = ticket().to_human();
        assert!(text.starts_with("#7 Fix login bug"));
        assert!(text.contains("Status: open"));
        assert!(text.contains("Labels: bug"));
    }

    #[test]
    fn test_ticket_list_json_is_array() {
        let list = TicketList(vec![ticket()]);
        let json = list.to_json();
        assert!(json.is_array());
        assert_eq!(json[0]["number"], 7);
        assert_eq!(json[0]["status"], "open");
    }

    #[test]
    fn test_empty_list_message() {
        assert_eq!(TicketList(vec![]).to_human(), "No tickets found.");
    }
}
