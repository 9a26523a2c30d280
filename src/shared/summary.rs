use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::Record;
use crate::error::ValidationError;

/// Trailing alert window, in periods (one day of one-minute periods)
pub const DEFAULT_ALERT_WINDOW_PERIODS: u64 = 1440;

/// Overview counters for a batch of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub device_count: u64,
    pub total_records: u64,
    pub latest_period: u64,
    /// Alerts inside the trailing window ending at `latest_period`.
    /// The name is fixed by the response format whatever the window size.
    pub alerts_last_1440_period: u64,
    pub alerts_total: u64,
}

/// Computes [`SummaryResult`] over records already in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryReport {
    window: u64,
}

impl Default for SummaryReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryReport {
    pub fn new() -> Self {
        Self {
            window: DEFAULT_ALERT_WINDOW_PERIODS,
        }
    }

    /// Use a trailing window of `window` periods; 0 counts no recent alerts
    pub fn with_window(window: u64) -> Self {
        Self { window }
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    /// Lowest period inside the window ending at `latest_period`
    fn window_start(&self, latest_period: u64) -> u64 {
        latest_period.saturating_add(1).saturating_sub(self.window)
    }

    /// Summarize `items`
    ///
    /// Every item needs a valid `device_id` and `period_no`; the first one
    /// that lacks them fails the whole call.
    pub fn summarize(&self, items: &[Record]) -> Result<SummaryResult, ValidationError> {
        let mut devices = HashSet::new();
        let mut alert_periods = Vec::new();
        let mut latest_period: u64 = 0;

        for item in items {
            devices.insert(item.device_id()?);
            let period = item.period_no()?;
            latest_period = latest_period.max(period);
            if item.is_alert() {
                alert_periods.push(period);
            }
        }

        let low = self.window_start(latest_period);
        let recent = alert_periods.iter().filter(|&&p| p >= low).count();

        Ok(SummaryResult {
            device_count: devices.len() as u64,
            total_records: items.len() as u64,
            latest_period,
            alerts_last_1440_period: recent as u64,
            alerts_total: alert_periods.len() as u64,
        })
    }
}

/// Summarize with the default 1,440-period window
pub fn summarize(items: &[Record]) -> Result<SummaryResult, ValidationError> {
    SummaryReport::new().summarize(items)
}
