use chrono::{DateTime, Local, TimeZone};
use std::time::Duration;

/// 將時長格式化為 ffmpeg `-t` 使用的 `HH:MM:SS.mmm`
///
/// 每個欄位都補零，毫秒即使為 0 也會輸出。
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// 輸出檔名使用的時間戳記 `YYYY-MM-DD_HH-MM-SS`
#[must_use]
pub fn run_timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y-%m-%d_%H-%M-%S").to_string()
}

#[must_use]
pub fn current_run_timestamp() -> String {
    run_timestamp(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, Utc};

    #[test]
    fn test_format_duration() {
        let cases = [
            (Duration::ZERO, "00:00:00.000"),
            (Duration::from_secs(1), "00:00:01.000"),
            (Duration::from_secs(60), "00:01:00.000"),
            (Duration::from_secs(3600), "01:00:00.000"),
            (
                Duration::from_millis(3 * 3_600_000 + 15 * 60_000 + 42_500),
                "03:15:42.500",
            ),
            (Duration::from_millis(900), "00:00:00.900"),
        ];

        for (input, expected) in cases {
            assert_eq!(format_duration(input), expected, "{input:?}");
        }
    }

    #[test]
    fn test_run_timestamp_fixed_time() {
        let time = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(run_timestamp(&time), "2024-03-07_09-05-01");
    }

    #[test]
    fn test_current_run_timestamp_parses_back() {
        let stamp = current_run_timestamp();
        assert!(NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d_%H-%M-%S").is_ok());
    }
}
