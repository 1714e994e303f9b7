//! Dashboard view: fleet-wide reachability at a glance

use chrono::{DateTime, Utc};
use weaver_models::{DeviceStatusEntry, LinkStatus};

use crate::poll::{PollUpdate, Subscription};

/// Condensed reachability summary shown at the top of the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct AlertSummary {
    pub up: usize,
    pub down: usize,
    /// Unreachable devices, in report order
    pub down_devices: Vec<DeviceStatusEntry>,
    pub last_updated: DateTime<Utc>,
}

impl AlertSummary {
    pub fn all_clear(&self) -> bool {
        self.down == 0
    }
}

/// Collapse a status report into an alert summary
pub fn summarize(entries: &[DeviceStatusEntry]) -> AlertSummary {
    let mut up = 0;
    let mut down_devices = Vec::new();
    for entry in entries {
        match entry.status {
            LinkStatus::Up => up += 1,
            LinkStatus::Down => down_devices.push(entry.clone()),
        }
    }
    AlertSummary {
        up,
        down: down_devices.len(),
        down_devices,
        last_updated: Utc::now(),
    }
}

pub struct DashboardView {
    subscription: Subscription,
    summary: Option<AlertSummary>,
}

impl DashboardView {
    pub fn new(subscription: Subscription) -> Self {
        let mut view = Self {
            subscription,
            summary: None,
        };
        if let Some(update) = view.subscription.latest() {
            view.apply(update);
        }
        view
    }

    fn apply(&mut self, update: PollUpdate) {
        if let PollUpdate::Status(entries) = update {
            self.summary = Some(summarize(&entries));
        }
    }

    /// Pick up the latest committed report without waiting
    pub fn refresh_latest(&mut self) {
        if let Some(update) = self.subscription.latest() {
            self.apply(update);
        }
    }

    /// Block until the next status report arrives
    pub async fn next_report(&mut self) -> Option<&AlertSummary> {
        let update = self.subscription.changed().await?;
        self.apply(update);
        self.summary.as_ref()
    }

    pub fn summary(&self) -> Option<&AlertSummary> {
        self.summary.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, name: &str, status: LinkStatus) -> DeviceStatusEntry {
        DeviceStatusEntry {
            id,
            name: name.to_string(),
            ip_address: format!("10.0.0.{}", id),
            status,
        }
    }

    #[test]
    fn summarizes_mixed_fleet() {
        let entries = vec![
            entry(1, "core-gw", LinkStatus::Up),
            entry(2, "branch-a", LinkStatus::Down),
            entry(3, "branch-b", LinkStatus::Up),
            entry(4, "lab", LinkStatus::Down),
            entry(5, "edge", LinkStatus::Up),
        ];
        let summary = summarize(&entries);
        assert_eq!(summary.up, 3);
        assert_eq!(summary.down, 2);
        let names: Vec<&str> = summary
            .down_devices
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["branch-a", "lab"]);
        let addresses: Vec<&str> = summary
            .down_devices
            .iter()
            .map(|d| d.ip_address.as_str())
            .collect();
        assert_eq!(addresses, vec!["10.0.0.2", "10.0.0.4"]);
        assert!(!summary.all_clear());
    }

    #[test]
    fn empty_fleet_is_all_clear() {
        let summary = summarize(&[]);
        assert_eq!(summary.up, 0);
        assert!(summary.all_clear());
    }
}
