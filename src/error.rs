// error.rs — 错误类型定义模块
// 按处理策略分两类：Io 是致命错误（后续写入同样会失败，应中止整个运行），
// 其余都是单条记录级别的错误，上层跳过该记录并继续

use thiserror::Error;

/// 与壁纸归档交互过程中所有可能的错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// 网络层失败（无法连接、超时、传输中断），重跑工具即可重试
    #[error("network error: {0}")]
    Connection(#[source] reqwest::Error),

    /// 归档响应了非 2xx 状态码
    #[error("archive returned HTTP {0}")]
    Status(u16),

    /// 响应内容与预期结构不符
    #[error("unexpected archive response: {0}")]
    Parse(String),

    /// 实际收到的字节数与服务端声明的 Content-Length 不一致
    #[error("incomplete transfer: expected {expected} bytes, got {got}")]
    Truncated { expected: u64, got: u64 },

    /// 请求的日期范围为空或超出归档的保留窗口
    #[error("invalid date range: {0}")]
    Range(String),

    /// 本地文件系统错误
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// 把 reqwest 的请求错误归入网络错误
    pub(crate) fn connection(err: reqwest::Error) -> Self {
        Self::Connection(err)
    }

    /// 是否应中止整个运行
    ///
    /// 磁盘写入失败会在之后的每条记录上原样重现，没有继续的意义；
    /// 网络类错误只影响当前记录。
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
