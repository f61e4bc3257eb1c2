use chrono::NaiveDate;

/// YouTube-style view counts: `950`, `1.5K`, `2K`, `3.2M`.
pub fn format_view_count(views: u64) -> String {
  const UNITS: [(u64, &str); 3] = [(1_000_000_000, "B"), (1_000_000, "M"), (1_000, "K")];
  for (scale, suffix) in UNITS {
    if views >= scale {
      let tenths = (u128::from(views) * 10 + u128::from(scale / 2)) / u128::from(scale);
      return if tenths % 10 == 0 {
        format!("{}{}", tenths / 10, suffix)
      } else {
        format!("{}.{}{}", tenths / 10, tenths % 10, suffix)
      };
    }
  }
  views.to_string()
}

/// `h:mm:ss` when there are hours, `m:ss` otherwise.
pub fn format_duration(seconds: u32) -> String {
  let hours = seconds / 3600;
  let minutes = (seconds % 3600) / 60;
  let secs = seconds % 60;
  if hours > 0 { format!("{}:{:02}:{:02}", hours, minutes, secs) } else { format!("{}:{:02}", minutes, secs) }
}

/// Parse `mm:ss` or `hh:mm:ss` into seconds. Anything else, including a
/// value that does not fit in `u32`, is 0.
pub fn parse_duration(s: &str) -> u32 {
  let parts: Option<Vec<u32>> = s.trim().split(':').map(|p| p.parse().ok()).collect();
  let seconds = match parts.as_deref() {
    Some(&[m, s]) => m.checked_mul(60).and_then(|m| m.checked_add(s)),
    Some(&[h, m, s]) => h
      .checked_mul(3600)
      .and_then(|h| m.checked_mul(60).and_then(|m| h.checked_add(m)))
      .and_then(|hm| hm.checked_add(s)),
    _ => None,
  };
  seconds.unwrap_or(0)
}

/// ISO-comparable date to a display string: `Jun 4, 1995`, `Mar 1995`, `2016`.
pub fn format_date(date: &str) -> String {
  if let Ok(d) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
    return d.format("%b %-d, %Y").to_string();
  }
  if let Ok(d) = NaiveDate::parse_from_str(&format!("{}-01", date), "%Y-%m-%d") {
    return d.format("%b %Y").to_string();
  }
  date.to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn view_count_below_thousand() {
    assert_eq!(format_view_count(0), "0");
    assert_eq!(format_view_count(999), "999");
  }

  #[test]
  fn view_count_thousands() {
    assert_eq!(format_view_count(1000), "1K");
    assert_eq!(format_view_count(1500), "1.5K");
    assert_eq!(format_view_count(47388), "47.4K");
  }

  #[test]
  fn view_count_millions_and_billions() {
    assert_eq!(format_view_count(2_000_000), "2M");
    assert_eq!(format_view_count(3_250_000), "3.3M");
    assert_eq!(format_view_count(1_100_000_000), "1.1B");
  }

  #[test]
  fn view_count_near_u64_max() {
    assert_eq!(format_view_count(2 * 10u64.pow(18)), "2000000000B");
    assert_eq!(format_view_count(u64::MAX), "18446744073.7B");
  }

  #[test]
  fn duration_formatting() {
    assert_eq!(format_duration(65), "1:05");
    assert_eq!(format_duration(3725), "1:02:05");
    assert_eq!(format_duration(0), "0:00");
  }

  #[test]
  fn duration_parsing() {
    assert_eq!(parse_duration("41:05"), 2465);
    assert_eq!(parse_duration("1:02:05"), 3725);
    assert_eq!(parse_duration("90"), 0);
    assert_eq!(parse_duration("ab:cd"), 0);
  }

  #[test]
  fn duration_parsing_overflow_is_zero() {
    assert_eq!(parse_duration("99999999:00"), 0);
    assert_eq!(parse_duration("4294967295:00"), 0);
    assert_eq!(parse_duration("1193046:28:16"), 0);
    assert_eq!(parse_duration("71582788:15"), u32::MAX);
  }

  #[test]
  fn date_formatting() {
    assert_eq!(format_date("1995-06-04"), "Jun 4, 1995");
    assert_eq!(format_date("1995-03"), "Mar 1995");
    assert_eq!(format_date("2016"), "2016");
    assert_eq!(format_date("someday"), "someday");
  }
}
