//! I/O 抽象层.
//!
//! 提供统一的读写接口, 支持文件、内存缓冲区等不同后端.
//! 核心读取模式是固定上限的数据块读取 (`read_chunk`):
//! 返回空块表示输入已耗尽, 这是 I/O 层的流结束哨兵.

use std::io::{self, Read, Seek, Write};

use liu_core::LiuResult;

/// I/O 上下文
///
/// 封装底层 I/O 操作, 为解析流水线提供统一的数据读写接口.
/// 文件句柄是作用域资源: 随上下文一起创建, 随 Drop 释放.
pub struct IoContext {
    /// 内部 I/O 实现
    inner: Box<dyn IoBackend>,
    /// 读缓冲区
    buffer: Vec<u8>,
    /// 缓冲区中的有效数据长度
    buf_len: usize,
    /// 缓冲区当前读取位置
    buf_pos: usize,
}

/// I/O 后端 trait
///
/// 实现此 trait 以支持不同的 I/O 来源 (文件、内存等).
pub trait IoBackend: Send {
    /// 读取数据到缓冲区
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// 全部写入
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;
    /// 定位 (seek)
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64>;
    /// 获取当前位置
    fn position(&mut self) -> io::Result<u64>;
    /// 获取总大小 (如果可知)
    fn size(&self) -> Option<u64>;
    /// 是否支持 seek
    fn is_seekable(&self) -> bool;
}

/// 默认缓冲区大小 (32 KB)
const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

impl IoContext {
    /// 从 I/O 后端创建上下文
    pub fn new(backend: Box<dyn IoBackend>) -> Self {
        Self {
            inner: backend,
            buffer: vec![0u8; DEFAULT_BUFFER_SIZE],
            buf_len: 0,
            buf_pos: 0,
        }
    }

    /// 从文件路径打开 (只读)
    pub fn open_read(path: &str) -> LiuResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    /// 从文件路径打开 (写入)
    pub fn open_write(path: &str) -> LiuResult<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    // ========================
    // 读取方法
    // ========================

    /// 读取最多 `max_len` 字节的一个数据块
    ///
    /// 返回的块长度可能小于 `max_len`; 返回空块表示输入已耗尽.
    /// 调用方应持续读取到空块为止, 再对下游做流结束处理.
    pub fn read_chunk(&mut self, max_len: usize) -> LiuResult<Vec<u8>> {
        if max_len == 0 {
            return Err(liu_core::LiuError::InvalidArgument(
                "read_chunk: max_len 不能为 0".into(),
            ));
        }

        // 优先消耗内部缓冲区中的数据
        let buffered = self.buf_len - self.buf_pos;
        if buffered > 0 {
            let to_copy = buffered.min(max_len);
            let chunk = self.buffer[self.buf_pos..self.buf_pos + to_copy].to_vec();
            self.buf_pos += to_copy;
            return Ok(chunk);
        }

        let mut chunk = vec![0u8; max_len];
        let n = self.inner.read(&mut chunk)?;
        chunk.truncate(n);
        Ok(chunk)
    }

    /// 读取指定字节数
    pub fn read_exact(&mut self, buf: &mut [u8]) -> LiuResult<()> {
        let mut total_read = 0;
        while total_read < buf.len() {
            let buffered = self.buf_len - self.buf_pos;
            if buffered > 0 {
                let to_copy = buffered.min(buf.len() - total_read);
                buf[total_read..total_read + to_copy]
                    .copy_from_slice(&self.buffer[self.buf_pos..self.buf_pos + to_copy]);
                self.buf_pos += to_copy;
                total_read += to_copy;
            } else {
                self.buf_pos = 0;
                self.buf_len = self.inner.read(&mut self.buffer)?;
                if self.buf_len == 0 {
                    return Err(liu_core::LiuError::Eof);
                }
            }
        }
        Ok(())
    }

    /// 读取指定数量的字节
    pub fn read_bytes(&mut self, count: usize) -> LiuResult<Vec<u8>> {
        let mut buf = vec![0u8; count];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    // ========================
    // 写入方法
    // ========================

    /// 写入全部数据
    pub fn write_all(&mut self, buf: &[u8]) -> LiuResult<()> {
        self.inner.write_all(buf)?;
        Ok(())
    }

    // ========================
    // 定位方法
    // ========================

    /// 定位 (seek)
    ///
    /// 注意: seek 会清空读缓冲区.
    pub fn seek(&mut self, pos: io::SeekFrom) -> LiuResult<u64> {
        self.buf_pos = 0;
        self.buf_len = 0;
        Ok(self.inner.seek(pos)?)
    }

    /// 获取当前位置
    ///
    /// 考虑读缓冲区中尚未消耗的数据量.
    pub fn position(&mut self) -> LiuResult<u64> {
        let raw_pos = self.inner.position()?;
        let buffered = (self.buf_len - self.buf_pos) as u64;
        Ok(raw_pos - buffered)
    }

    /// 是否支持随机访问
    pub fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }

    /// 获取总大小
    pub fn size(&self) -> Option<u64> {
        self.inner.size()
    }
}

/// 文件 I/O 后端
struct FileBackend {
    file: std::fs::File,
    size: Option<u64>,
}

impl FileBackend {
    fn new(file: std::fs::File) -> Self {
        let size = file.metadata().ok().map(|m| m.len());
        Self { file, size }
    }
}

impl IoBackend for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

/// 内存缓冲区 I/O 后端
///
/// 用于测试和内存中处理.
pub struct MemoryBackend {
    /// 数据缓冲区
    data: Vec<u8>,
    /// 当前位置
    pos: usize,
}

impl MemoryBackend {
    /// 从已有数据创建 (用于读取)
    pub fn from_data(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// 创建空缓冲区 (用于写入)
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            pos: 0,
        }
    }

    /// 获取内部数据的引用
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 消耗自身, 返回内部数据
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl IoBackend for MemoryBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.data.len().saturating_sub(self.pos);
        let to_read = buf.len().min(available);
        if to_read == 0 {
            return Ok(0);
        }
        buf[..to_read].copy_from_slice(&self.data[self.pos..self.pos + to_read]);
        self.pos += to_read;
        Ok(to_read)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        // seek 越过末尾留下的空洞用零填充, 保证 position 与内容一致
        if self.pos > self.data.len() {
            self.data.resize(self.pos, 0);
        }
        // 如果当前位置在数据末尾, 追加; 否则覆盖已有数据
        if self.pos >= self.data.len() {
            self.data.extend_from_slice(buf);
        } else {
            let overlap = (self.data.len() - self.pos).min(buf.len());
            self.data[self.pos..self.pos + overlap].copy_from_slice(&buf[..overlap]);
            if buf.len() > overlap {
                self.data.extend_from_slice(&buf[overlap..]);
            }
        }
        self.pos += buf.len();
        Ok(())
    }

    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            io::SeekFrom::Start(offset) => offset as i64,
            io::SeekFrom::End(offset) => self.data.len() as i64 + offset,
            io::SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek 位置不能为负",
            ));
        }
        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.pos as u64)
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn is_seekable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_chunk_返回空块表示结束() {
        let mut io = IoContext::new(Box::new(MemoryBackend::from_data(vec![1, 2, 3, 4, 5])));

        let c1 = io.read_chunk(4).unwrap();
        assert_eq!(c1, vec![1, 2, 3, 4]);
        let c2 = io.read_chunk(4).unwrap();
        assert_eq!(c2, vec![5]);
        let c3 = io.read_chunk(4).unwrap();
        assert!(c3.is_empty(), "输入耗尽后应返回空块");
        // 空块是稳定哨兵, 可以重复读取
        assert!(io.read_chunk(4).unwrap().is_empty());
    }

    #[test]
    fn test_read_chunk_拒绝零上限() {
        let mut io = IoContext::new(Box::new(MemoryBackend::from_data(vec![1])));
        assert!(io.read_chunk(0).is_err());
    }

    #[test]
    fn test_read_chunk_先消耗缓冲区() {
        let mut io = IoContext::new(Box::new(MemoryBackend::from_data(vec![1, 2, 3, 4])));
        // read_exact 会填充内部缓冲区
        let mut head = [0u8; 1];
        io.read_exact(&mut head).unwrap();
        assert_eq!(head, [1]);
        // 后续 chunk 先取缓冲区剩余数据
        let chunk = io.read_chunk(16).unwrap();
        assert_eq!(chunk, vec![2, 3, 4]);
    }

    #[test]
    fn test_memory_backend_写入与读取() {
        let mut backend = MemoryBackend::new();
        backend.write_all(&[1, 2, 3]).unwrap();
        assert_eq!(backend.data(), &[1, 2, 3]);
    }

    #[test]
    fn test_memory_backend_seek越过末尾后写入补零() {
        let mut backend = MemoryBackend::new();
        backend.seek(io::SeekFrom::Start(5)).unwrap();
        backend.write_all(&[1, 2]).unwrap();

        // 空洞补零, 写入位置与 position 一致
        assert_eq!(backend.data(), &[0, 0, 0, 0, 0, 1, 2]);
        assert_eq!(backend.position().unwrap(), 7);

        // 回头覆盖写不受影响
        backend.seek(io::SeekFrom::Start(1)).unwrap();
        backend.write_all(&[9]).unwrap();
        assert_eq!(backend.data(), &[0, 9, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_read_exact_到达末尾返回eof() {
        let mut io = IoContext::new(Box::new(MemoryBackend::from_data(vec![1, 2])));
        let mut buf = [0u8; 4];
        let err = io.read_exact(&mut buf).unwrap_err();
        assert!(matches!(err, liu_core::LiuError::Eof));
    }
}
