use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::selection::ScheduleMode;

#[derive(Debug, Deserialize)]
struct TimeApiResponse {
    utc_datetime: DateTime<Utc>,
}

/// Current UTC time from the time API, or the local clock when the API is
/// unreachable or answers with something unparseable.
pub async fn network_now(http: &Client, url: &str) -> DateTime<Utc> {
    let fetched = async {
        http.get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<TimeApiResponse>()
            .await
    }
    .await;

    match fetched {
        Ok(body) => body.utc_datetime,
        Err(e) => {
            tracing::debug!(error = %e, "Time API unavailable, using local clock");
            Utc::now()
        }
    }
}

/// Next occurrence of `at` strictly after `now`.
pub fn next_daily_run(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(at).and_utc();
    if now >= today {
        today + TimeDelta::days(1)
    } else {
        today
    }
}

/// Wait before the next cycle, measured from `now`.
pub fn next_delay(mode: ScheduleMode, config: &Config, now: DateTime<Utc>) -> Duration {
    match mode {
        ScheduleMode::FixedDelay => config.delay(),
        ScheduleMode::DailyUtc => {
            let at = config
                .daily_run_time()
                .unwrap_or_else(|_| NaiveTime::from_hms_opt(0, 30, 0).unwrap_or_default());
            (next_daily_run(now, at) - now).to_std().unwrap_or_default()
        }
    }
}

/// `"N minute(s)"` under an hour, `"N hour(s)"` otherwise.
pub fn describe_wait(delay: Duration) -> String {
    let minutes = delay.as_secs_f64() / 60.0;
    if minutes < 60.0 {
        format!("{:.0} minute(s)", minutes)
    } else {
        format!("{:.0} hour(s)", minutes / 60.0)
    }
}

pub fn local_time_label(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S %Z").to_string()
}
