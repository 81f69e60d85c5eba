//! 日志系统集成测试

use std::fs;

use liu::logging::{LoggingConfig, init};

// 注意: tracing 的全局订阅器每个进程只能初始化一次,
// 因此本文件中只有一个测试真正调用 init().

/// 获取当前日期的日志文件名
fn today_log_name(prefix: &str) -> String {
    let today = chrono::Local::now().date_naive();
    format!("{}.{}.log", prefix, today.format("%Y-%m-%d"))
}

#[tokio::test]
async fn test_logging_init_writes_filtered_file() {
    let temp_dir = tempfile::TempDir::new().expect("创建临时目录失败");
    let log_dir = temp_dir.path().join("logs");

    let config = LoggingConfig {
        level: "info".to_string(),
        directory: log_dir.to_string_lossy().to_string(),
        file_prefix: "liu-test".to_string(),
        retention_days: 7,
        cleanup_interval_seconds: 3600,
    };

    init(config).expect("日志初始化失败");
    assert!(log_dir.exists(), "日志目录应该被创建");

    // 写入不同级别的日志
    tracing::error!("错误日志_ERROR_MSG");
    tracing::warn!("警告日志_WARN_MSG");
    tracing::info!("信息日志_INFO_MSG");
    tracing::debug!("调试日志_DEBUG_MSG"); // 低于 info, 应被文件层过滤

    // 给非阻塞写入线程一点时间落盘
    std::thread::sleep(std::time::Duration::from_millis(300));

    let log_file = log_dir.join(today_log_name("liu-test"));
    assert!(log_file.exists(), "日志文件应该被创建: {:?}", log_file);

    let content = fs::read_to_string(&log_file).expect("读取日志文件失败");
    assert!(content.contains("错误日志_ERROR_MSG"), "应该包含错误日志");
    assert!(content.contains("警告日志_WARN_MSG"), "应该包含警告日志");
    assert!(content.contains("信息日志_INFO_MSG"), "应该包含信息日志");
    assert!(
        !content.contains("调试日志_DEBUG_MSG"),
        "debug 日志应该被文件层过滤掉"
    );

    // 文件格式化器输出级别标记
    assert!(content.contains("ERROR"), "日志应该包含 ERROR 级别标记");
    assert!(content.contains("INFO"), "日志应该包含 INFO 级别标记");
}

#[test]
fn test_logging_file_naming_format() {
    let today = chrono::Local::now().date_naive();
    for prefix in ["liu", "liu-parse"] {
        let name = today_log_name(prefix);
        assert!(name.starts_with(&format!("{prefix}.")));
        assert!(name.ends_with(".log"));
        assert_eq!(
            name,
            format!("{}.{}.log", prefix, today.format("%Y-%m-%d"))
        );
    }
}
