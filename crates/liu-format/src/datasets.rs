//! 示例素材获取.
//!
//! 从固定 URL 下载演示用的样本文件, 带本地缓存;
//! 并提供从容器文件抽取裸码流的辅助函数 (依赖外部 ffmpeg 命令).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use liu_core::{LiuError, LiuResult};

/// 缓存目录环境变量
///
/// 未设置时使用系统临时目录下的 `liu-datasets`.
const CACHE_DIR_ENV: &str = "LIU_DATASETS_DIR";

/// 获取缓存目录 (不存在时创建)
fn cache_dir() -> LiuResult<PathBuf> {
    let dir = match std::env::var_os(CACHE_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::temp_dir().join("liu-datasets"),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// 下载 URL 指向的文件并缓存到本地, 返回缓存路径
///
/// 文件名取 URL 的最后一段. 缓存命中时直接返回, 不发起网络请求.
pub fn cached(url: &str) -> LiuResult<PathBuf> {
    let file_name = url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| LiuError::InvalidArgument(format!("URL 中没有文件名: {}", url)))?;

    let path = cache_dir()?.join(file_name);
    if path.exists() {
        debug!("素材缓存命中: {}", path.display());
        return Ok(path);
    }

    info!("下载素材: {}", url);
    let mut response = ureq::get(url)
        .call()
        .map_err(|e| LiuError::Io(std::io::Error::other(format!("HTTP 请求失败: {}", e))))?;

    // 先写临时文件, 成功后改名, 避免留下半截缓存
    let tmp_path = path.with_extension("part");
    let mut tmp = std::fs::File::create(&tmp_path)?;
    let mut reader = response.body_mut().as_reader();
    let written = std::io::copy(&mut reader, &mut tmp)?;
    tmp.flush()?;
    std::fs::rename(&tmp_path, &path)?;

    info!("素材下载完成: {} ({} 字节)", path.display(), written);
    Ok(path)
}

/// 从容器文件中抽取视频裸码流
///
/// 调用外部 `ffmpeg` 命令做流拷贝 (`-vcodec copy -an`), 不做转码.
/// 输出格式由 `output` 的扩展名决定 (如 `.h264` / `.m4v`).
pub fn extract_raw_stream(container: &Path, output: &Path) -> LiuResult<()> {
    if output.exists() {
        debug!("裸码流已存在: {}", output.display());
        return Ok(());
    }

    info!(
        "抽取裸码流: {} -> {}",
        container.display(),
        output.display()
    );
    let status = Command::new("ffmpeg")
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(container)
        .arg("-vcodec")
        .arg("copy")
        .arg("-an")
        .arg(output)
        .status()
        .map_err(|e| LiuError::Io(std::io::Error::other(format!("启动 ffmpeg 失败: {}", e))))?;

    if !status.success() {
        return Err(LiuError::Format(format!(
            "ffmpeg 抽取失败, 退出码: {:?}",
            status.code()
        )));
    }
    Ok(())
}
