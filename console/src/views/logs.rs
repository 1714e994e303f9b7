//! Activity log view
//!
//! Filterable, searchable feed of backend activity records with a
//! plain-text export.

use weaver_models::{ActivityLevel, ActivityLogEntry};

use crate::errors::ConsoleError;
use crate::filesys::file::File;
use crate::poll::{PollUpdate, Subscription};

pub struct LogsView {
    subscription: Subscription,
    entries: Vec<ActivityLogEntry>,
    level_filter: Option<ActivityLevel>,
    search: String,
}

impl LogsView {
    pub fn new(subscription: Subscription) -> Self {
        let mut view = Self {
            subscription,
            entries: Vec::new(),
            level_filter: None,
            search: String::new(),
        };
        if let Some(update) = view.subscription.latest() {
            view.apply(update);
        }
        view
    }

    fn apply(&mut self, update: PollUpdate) {
        if let PollUpdate::Logs(entries) = update {
            self.entries = entries;
        }
    }

    pub fn set_level_filter(&mut self, level: Option<ActivityLevel>) {
        self.level_filter = level;
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_lowercase();
    }

    fn matches(&self, entry: &ActivityLogEntry) -> bool {
        if let Some(level) = self.level_filter {
            if entry.level != level {
                return false;
            }
        }
        if self.search.is_empty() {
            return true;
        }
        entry.device.to_lowercase().contains(&self.search)
            || entry.action.to_lowercase().contains(&self.search)
            || entry.message.to_lowercase().contains(&self.search)
    }

    /// Entries passing the current filter and search
    pub fn filtered(&self) -> Vec<&ActivityLogEntry> {
        self.entries.iter().filter(|e| self.matches(e)).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Block until the next log report arrives
    pub async fn next_report(&mut self) -> Option<Vec<&ActivityLogEntry>> {
        let update = self.subscription.changed().await?;
        self.apply(update);
        Some(self.filtered())
    }

    fn export_line(entry: &ActivityLogEntry) -> String {
        format!(
            "[{}] {} | {} | {}: {}",
            entry.level.as_str().to_uppercase(),
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.device,
            entry.action,
            entry.message
        )
    }

    /// Currently visible entries as export lines
    pub fn export_lines(&self) -> Vec<String> {
        self.filtered().into_iter().map(Self::export_line).collect()
    }

    /// Write the currently visible entries to a file
    pub async fn export(&self, file: &File) -> Result<usize, ConsoleError> {
        let lines = self.export_lines();
        let mut body = lines.join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        file.write_string(&body).await?;
        Ok(lines.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(id: i64, level: ActivityLevel, device: &str, message: &str) -> ActivityLogEntry {
        ActivityLogEntry {
            id,
            timestamp: NaiveDate::from_ymd_opt(2026, 3, 14)
                .unwrap()
                .and_hms_opt(9, 26, 53)
                .unwrap(),
            level,
            device: device.to_string(),
            action: "deploy".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn export_line_format() {
        let line = LogsView::export_line(&entry(
            1,
            ActivityLevel::Error,
            "core-gw",
            "Deployment failed",
        ));
        assert_eq!(
            line,
            "[ERROR] 2026-03-14 09:26:53 | core-gw | deploy: Deployment failed"
        );
    }
}
