use chrono::{
  DateTime, FixedOffset, Locale, NaiveDateTime,
  format::{Item, StrftimeItems},
};
use chrono_tz::Tz;

use crate::{config::DisplayConfig, error::ConfigError};

const COMMON_DATE_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%z", // Prismic publication dates (+0000)
  "%Y-%m-%d %H:%M:%S %z", // Common format with timezone
  "%Y-%m-%d %H:%M:%S",    // Common format without timezone
];

/// Parse a timestamp as delivered by the content source. Timestamps
/// without an offset are taken as UTC.
pub fn parse_date(date_str: impl AsRef<str>) -> Option<DateTime<FixedOffset>> {
  let date_str = date_str.as_ref().trim();
  if date_str.is_empty() {
    return None;
  }

  if let Ok(parsed) = DateTime::parse_from_rfc3339(date_str) {
    return Some(parsed);
  }

  for fmt in COMMON_DATE_FORMATS {
    if let Ok(parsed) = DateTime::parse_from_str(date_str, fmt) {
      return Some(parsed);
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(date_str, fmt) {
      return Some(parsed.and_utc().fixed_offset());
    }
  }

  None
}

/// Turns timestamps into display strings for one locale and time zone.
#[derive(Clone, Debug)]
pub struct DateFormatter {
  locale: Locale,
  timezone: Tz,
  date_format: String,
  date_time_format: String,
}

impl DateFormatter {
  pub fn new(config: &DisplayConfig) -> Result<Self, ConfigError> {
    let locale = Locale::try_from(config.locale.as_str()).map_err(|_| {
      ConfigError::Message(format!("unknown locale: {}", config.locale))
    })?;
    let timezone = config.timezone.parse::<Tz>().map_err(|e| {
      ConfigError::Message(format!(
        "unknown time zone {}: {e}",
        config.timezone
      ))
    })?;

    validate_format(&config.date_format)?;
    validate_format(&config.date_time_format)?;

    Ok(Self {
      locale,
      timezone,
      date_format: config.date_format.clone(),
      date_time_format: config.date_time_format.clone(),
    })
  }

  /// Day, abbreviated month and year (e.g. "25 mar 2021").
  pub fn date(&self, date: &DateTime<FixedOffset>) -> String {
    self.format(date, &self.date_format)
  }

  /// Like [`DateFormatter::date`], followed by the time of day.
  pub fn date_time(&self, date: &DateTime<FixedOffset>) -> String {
    self.format(date, &self.date_time_format)
  }

  fn format(&self, date: &DateTime<FixedOffset>, fmt: &str) -> String {
    date
      .with_timezone(&self.timezone)
      .format_localized(fmt, self.locale)
      .to_string()
  }
}

// formatting with a bad specifier panics, so reject it up front
fn validate_format(fmt: &str) -> Result<(), ConfigError> {
  if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
    return Err(ConfigError::Message(format!("invalid date format: {fmt}")));
  }

  Ok(())
}
