//! Resource metric interpretation
//!
//! RouterOS reports `/system/resource` counters as strings. This module
//! parses them into numbers, derives utilization percentages, and bands
//! them by severity for display.

use weaver_models::ResourceMetrics;

/// Display band of a utilization figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityBand {
    Success,
    Warning,
    Danger,
}

impl SeverityBand {
    /// Band a percentage: above 80 is danger, above 50 warning
    pub fn classify(percent: u8) -> Self {
        if percent > 80 {
            SeverityBand::Danger
        } else if percent > 50 {
            SeverityBand::Warning
        } else {
            SeverityBand::Success
        }
    }
}

/// Used share of a total, rounded to whole percent. Zero when the total
/// is zero or the figures are nonsensical.
pub fn utilization_percent(used: u64, total: u64) -> u8 {
    if total == 0 || used > total {
        return 0;
    }
    ((used as f64 / total as f64) * 100.0).round() as u8
}

/// Human-readable byte count with one decimal place
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let bytes = bytes as f64;
    if bytes >= GB {
        format!("{:.1} GB", bytes / GB)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes / KB)
    } else {
        format!("{} B", bytes as u64)
    }
}

fn parse_counter(value: &Option<String>) -> Option<u64> {
    value.as_deref().and_then(|s| s.trim().parse().ok())
}

/// Parsed, derived view over one device's raw counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cpu_percent: u8,
    pub memory_percent: u8,
    pub disk_percent: u8,
    pub total_memory: u64,
    pub free_memory: u64,
    pub total_disk: u64,
    pub free_disk: u64,
    pub uptime: String,
    pub version: String,
    pub board_name: String,
}

impl MetricsSnapshot {
    pub fn from_raw(raw: &ResourceMetrics) -> Self {
        let cpu_percent = raw
            .cpu_load
            .as_deref()
            .and_then(|s| s.trim().parse::<u8>().ok())
            .unwrap_or(0)
            .min(100);

        let total_memory = parse_counter(&raw.total_memory).unwrap_or(0);
        let free_memory = parse_counter(&raw.free_memory).unwrap_or(0);
        let total_disk = parse_counter(&raw.total_hdd_space).unwrap_or(0);
        let free_disk = parse_counter(&raw.free_hdd_space).unwrap_or(0);

        Self {
            cpu_percent,
            memory_percent: utilization_percent(total_memory.saturating_sub(free_memory), total_memory),
            disk_percent: utilization_percent(total_disk.saturating_sub(free_disk), total_disk),
            total_memory,
            free_memory,
            total_disk,
            free_disk,
            uptime: raw.uptime.clone().unwrap_or_else(|| "unknown".to_string()),
            version: raw.version.clone().unwrap_or_else(|| "unknown".to_string()),
            board_name: raw.board_name.clone().unwrap_or_else(|| "unknown".to_string()),
        }
    }

    pub fn cpu_band(&self) -> SeverityBand {
        SeverityBand::classify(self.cpu_percent)
    }

    pub fn memory_band(&self) -> SeverityBand {
        SeverityBand::classify(self.memory_percent)
    }

    pub fn disk_band(&self) -> SeverityBand {
        SeverityBand::classify(self.disk_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cpu: &str, total_mem: &str, free_mem: &str) -> ResourceMetrics {
        ResourceMetrics {
            cpu_load: Some(cpu.to_string()),
            total_memory: Some(total_mem.to_string()),
            free_memory: Some(free_mem.to_string()),
            total_hdd_space: Some("134217728".to_string()),
            free_hdd_space: Some("100663296".to_string()),
            uptime: Some("1w2d3h".to_string()),
            version: Some("7.14.2".to_string()),
            board_name: Some("RB5009".to_string()),
        }
    }

    #[test]
    fn derives_percentages_from_string_counters() {
        let snapshot = MetricsSnapshot::from_raw(&raw("12", "268435456", "67108864"));
        assert_eq!(snapshot.cpu_percent, 12);
        assert_eq!(snapshot.memory_percent, 75);
        assert_eq!(snapshot.disk_percent, 25);
    }

    #[test]
    fn malformed_counters_fall_back_to_zero() {
        let snapshot = MetricsSnapshot::from_raw(&ResourceMetrics::default());
        assert_eq!(snapshot.cpu_percent, 0);
        assert_eq!(snapshot.memory_percent, 0);
        assert_eq!(snapshot.uptime, "unknown");
    }

    #[test]
    fn severity_bands() {
        assert_eq!(SeverityBand::classify(0), SeverityBand::Success);
        assert_eq!(SeverityBand::classify(50), SeverityBand::Success);
        assert_eq!(SeverityBand::classify(51), SeverityBand::Warning);
        assert_eq!(SeverityBand::classify(80), SeverityBand::Warning);
        assert_eq!(SeverityBand::classify(81), SeverityBand::Danger);
        assert_eq!(SeverityBand::classify(100), SeverityBand::Danger);
    }

    #[test]
    fn byte_formatting() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(268435456), "256.0 MB");
        assert_eq!(format_bytes(1610612736), "1.5 GB");
    }

    #[test]
    fn utilization_guards_degenerate_inputs() {
        assert_eq!(utilization_percent(0, 0), 0);
        assert_eq!(utilization_percent(10, 5), 0);
        assert_eq!(utilization_percent(1, 3), 33);
    }
}
