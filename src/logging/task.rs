use super::{LoggingConfig, build_current_log_path};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, TimeZone, Utc};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};
use tracing::error;

pub(super) fn spawn_log_maintenance_task(config: LoggingConfig, rotate_requested: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let mut cleanup_interval =
            tokio::time::interval(Duration::from_secs(config.cleanup_interval_seconds));

        if let Err(err) = ensure_current_log_file(&config) {
            error!("初始化当前日志文件失败: {}", err);
        }
        if let Err(err) = cleanup_logs(&config) {
            error!("启动时清理日志失败: {}", err);
        }

        let mut next_rollover_at = match compute_next_rollover(Local::now()) {
            Ok(at) => at,
            Err(err) => {
                error!("计算下一次翻滚时间失败: {}", err);
                tokio::time::Instant::now() + Duration::from_secs(1)
            }
        };

        loop {
            tokio::select! {
                _ = cleanup_interval.tick() => {
                    if let Err(err) = cleanup_logs(&config) {
                        error!("清理日志失败: {}", err);
                    }
                }
                _ = tokio::time::sleep_until(next_rollover_at) => {
                    if let Err(err) = rotate_current_log(&config) {
                        error!("日志翻滚失败: {}", err);
                    } else {
                        rotate_requested.store(true, Ordering::Release);
                    }

                    if let Err(err) = cleanup_logs(&config) {
                        error!("翻滚后清理日志失败: {}", err);
                    }

                    next_rollover_at = match compute_next_rollover(Local::now()) {
                        Ok(at) => at,
                        Err(err) => {
                            error!("重新计算下一次翻滚时间失败: {}", err);
                            tokio::time::Instant::now() + Duration::from_secs(1)
                        }
                    };
                }
            }
        }
    });
}

fn ensure_current_log_file(config: &LoggingConfig) -> Result<()> {
    let directory = Path::new(&config.directory);
    fs::create_dir_all(directory)?;
    let today = Local::now().date_naive();
    let current_path = build_current_log_path(directory, &config.file_prefix, today);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&current_path)
        .with_context(|| format!("创建当前日志文件失败, path={}", current_path.display()))?;
    Ok(())
}

fn rotate_current_log(config: &LoggingConfig) -> Result<()> {
    let directory = Path::new(&config.directory);
    fs::create_dir_all(directory)?;

    let today = Local::now().date_naive();
    let current_path = build_current_log_path(directory, &config.file_prefix, today);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&current_path)
        .with_context(|| format!("创建当前日期日志文件失败, path={}", current_path.display()))?;

    Ok(())
}

fn cleanup_logs(config: &LoggingConfig) -> Result<()> {
    let directory = Path::new(&config.directory);
    if !directory.exists() {
        return Ok(());
    }

    let today = Local::now().date_naive();
    let cutoff = today - ChronoDuration::days(config.retention_days);

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        let file_path = entry.path();

        let date = match parse_rotated_log_name(&file_name, &config.file_prefix) {
            Some(date) => date,
            None => continue,
        };

        if date < cutoff {
            let _ = fs::remove_file(&file_path);
        }
    }

    Ok(())
}

fn parse_rotated_log_name(file_name: &str, prefix: &str) -> Option<NaiveDate> {
    let with_prefix = file_name.strip_prefix(prefix)?;
    let with_dot = with_prefix.strip_prefix('.')?;
    let date_part = with_dot.strip_suffix(".log")?;
    parse_date(date_part)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn compute_next_rollover(now: DateTime<Local>) -> Result<tokio::time::Instant> {
    let next_date = now.date_naive() + ChronoDuration::days(1);
    let next_midnight = next_date
        .and_hms_opt(0, 0, 0)
        .context("计算下一次日志翻滚时间失败")?;
    let next_local = Local
        .from_local_datetime(&next_midnight)
        .earliest()
        .context("转换本地时间失败")?;
    let system_time = SystemTime::from(next_local.with_timezone(&Utc));
    let duration = match system_time.duration_since(SystemTime::now()) {
        Ok(duration) => duration,
        Err(_) => Duration::from_secs(0),
    };
    Ok(tokio::time::Instant::now() + duration)
}
