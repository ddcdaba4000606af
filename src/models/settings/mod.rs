// Settings module
// Static configuration for the countdown window

use serde::{Deserialize, Serialize};

use crate::services::countdown::TargetInstant;

pub const DEFAULT_TARGET: &str = "2025-08-25T00:00:00+05:30";
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Countdown configuration, read once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Deadline as ISO-8601 with an explicit UTC offset
    pub target: String,
    /// Human-readable deadline shown under the title
    pub target_readable: String,
    pub redirect_url: String,
    pub tick_interval_ms: u64,
    /// IANA zone used only for displaying the target
    pub timezone: String,
    pub timer_labels: [String; 4],
    pub title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            target_readable: "August 25, 2025 at 12:00 AM IST".to_string(),
            redirect_url: "https://www.google.com".to_string(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            timezone: "Asia/Kolkata".to_string(),
            timer_labels: [
                "DAYS".to_string(),
                "HOURS".to_string(),
                "MINUTES".to_string(),
                "SECONDS".to_string(),
            ],
            title: "Countdown".to_string(),
        }
    }
}

impl Settings {
    /// Validate every field; the message names the first offending one.
    pub fn validate(&self) -> Result<(), String> {
        TargetInstant::parse(&self.target).map_err(|e| e.to_string())?;

        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be greater than zero".to_string());
        }

        let url = self.redirect_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(format!(
                "redirect_url must be an http(s) URL, got '{}'",
                self.redirect_url
            ));
        }

        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| format!("Unknown timezone '{}': {}", self.timezone, e))?;

        if self.title.trim().is_empty() {
            return Err("title cannot be empty".to_string());
        }

        Ok(())
    }

    pub fn target_instant(&self) -> Result<TargetInstant, crate::services::countdown::CountdownError> {
        TargetInstant::parse(&self.target)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    /// Display zone, falling back to UTC for names that do not parse.
    pub fn display_timezone(&self) -> chrono_tz::Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}
