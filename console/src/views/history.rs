//! Deployment history view

use weaver_models::ConfigHistoryEntry;

use crate::poll::{PollUpdate, Subscription};

pub struct HistoryView {
    subscription: Subscription,
    entries: Vec<ConfigHistoryEntry>,
}

impl HistoryView {
    pub fn new(subscription: Subscription) -> Self {
        let mut view = Self {
            subscription,
            entries: Vec::new(),
        };
        if let Some(update) = view.subscription.latest() {
            view.apply(update);
        }
        view
    }

    fn apply(&mut self, update: PollUpdate) {
        if let PollUpdate::History(mut entries) = update {
            // Newest first, ties broken by record id
            entries.sort_by(|a, b| {
                b.timestamp
                    .cmp(&a.timestamp)
                    .then_with(|| b.log_id.cmp(&a.log_id))
            });
            self.entries = entries;
        }
    }

    /// Audit records, newest first
    pub fn entries(&self) -> &[ConfigHistoryEntry] {
        &self.entries
    }

    /// Records for one device, newest first
    pub fn entries_for(&self, device_id: i64) -> impl Iterator<Item = &ConfigHistoryEntry> {
        self.entries.iter().filter(move |e| e.device_id == device_id)
    }

    /// Block until the next history report arrives
    pub async fn next_report(&mut self) -> Option<&[ConfigHistoryEntry]> {
        let update = self.subscription.changed().await?;
        self.apply(update);
        Some(&self.entries)
    }
}
