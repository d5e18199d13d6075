use std::str::FromStr;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use tokio::time::sleep;
use tracing::{error, info, info_span, warn, Instrument};
use crate::domain::services::clock::today;
use crate::domain::services::sweeps::SweepKind;
use crate::error::AppError;
use crate::state::AppState;

/// Accepts the usual five-field form; the `cron` crate wants a leading seconds field.
pub fn parse_cron(expr: &str) -> Result<Schedule, AppError> {
    Schedule::from_str(&format!("0 {}", expr))
        .map_err(|e| AppError::InternalWithMsg(format!("Invalid cron expression '{}': {}", expr, e)))
}

pub fn next_run(schedule: &Schedule, tz: Tz, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule
        .after(&after.with_timezone(&tz))
        .next()
        .map(|next| next.with_timezone(&Utc))
}

/// Spawns one loop per sweep. Fails fast if any expression does not parse.
pub fn start_scheduler(state: Arc<AppState>) -> Result<(), AppError> {
    let tz = state.salon.timezone;

    for kind in SweepKind::ALL {
        let schedule = parse_cron(kind.cron_expression())?;
        let state = state.clone();
        info!("Scheduling {} sweep at '{}' ({})", kind, kind.cron_expression(), tz);

        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let Some(at) = next_run(&schedule, tz, now) else {
                    warn!("No upcoming run for {} sweep, stopping", kind);
                    return;
                };
                sleep((at - now).to_std().unwrap_or_default()).await;

                let span = info_span!("sweep", kind = %kind);
                async {
                    match state.sweeps().run(kind, today(Utc::now(), tz)).await {
                        Ok(report) => info!("Sweep report: {:?}", report),
                        Err(e) => error!("Sweep failed: {:?}", e),
                    }
                }
                .instrument(span)
                .await;
            }
        });
    }

    Ok(())
}
