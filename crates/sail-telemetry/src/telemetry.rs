use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use fastrace::collector::{Config, ConsoleReporter, Reporter, SpanRecord};
use log::debug;
use sail_common::config::TelemetryConfig;

use crate::error::{TelemetryError, TelemetryResult};

enum TelemetryStatus {
    Uninitialized,
    Initialized,
    Failed,
    Finalized,
}

static TELEMETRY_STATUS: Mutex<TelemetryStatus> = Mutex::new(TelemetryStatus::Uninitialized);

pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    let mut status = TELEMETRY_STATUS
        .lock()
        .map_err(|e| TelemetryError::internal(e.to_string()))?;

    match *status {
        TelemetryStatus::Uninitialized => {
            match init_logs().and_then(|()| init_traces(config)) {
                Ok(()) => {
                    debug!("telemetry initialized");
                    *status = TelemetryStatus::Initialized;
                    Ok(())
                }
                Err(e) => {
                    *status = TelemetryStatus::Failed;
                    Err(e)
                }
            }
        }
        TelemetryStatus::Initialized => {
            Err(TelemetryError::internal("telemetry already initialized"))
        }
        TelemetryStatus::Failed => Err(TelemetryError::internal(
            "telemetry failed to initialize previously",
        )),
        TelemetryStatus::Finalized => Err(TelemetryError::internal(
            "telemetry has been finalized and cannot be re-initialized",
        )),
    }
}

fn init_traces(config: &TelemetryConfig) -> TelemetryResult<()> {
    if config.trace_to_console {
        fastrace::set_reporter(ConsoleReporter, Config::default());
    } else {
        let reporter_config = Config::default().report_interval(Duration::MAX);
        fastrace::set_reporter(NoOpReporter, reporter_config);
    }
    Ok(())
}

fn init_logs() -> TelemetryResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(move |buf, record| {
            let level = record.level();
            let target = record.target();
            let style = buf.default_level_style(level);
            let timestamp = buf.timestamp();
            let args = record.args();
            writeln!(buf, "[{timestamp} {style}{level}{style:#} {target}] {args}")
        })
        .try_init()
        .map_err(|e| TelemetryError::internal(e.to_string()))
}

pub fn shutdown_telemetry() {
    debug!("shutting down telemetry...");
    fastrace::flush();
    if let Ok(mut status) = TELEMETRY_STATUS.lock() {
        if let TelemetryStatus::Initialized = *status {
            *status = TelemetryStatus::Finalized;
        }
    }
}

pub struct NoOpReporter;

impl Reporter for NoOpReporter {
    fn report(&mut self, _spans: Vec<SpanRecord>) {}
}
