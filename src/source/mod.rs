// source/mod.rs — 壁纸源模块入口
pub mod bing;

// 定义了所有壁纸归档（如 Bing）必须实现的通用 Trait

use crate::error::ArchiveError;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// 统一的壁纸元数据结构
/// 不论来自哪个归档，都转换成这个结构体供上层使用
///
/// 记录是一次性的瞬时值：由 fetch 产生、被 download 消费一次，
/// 真正持久化的是按日期和分辨率命名的下载文件本身。
#[derive(Debug, Clone)]
pub struct WallpaperRecord {
    /// 壁纸上线的日期
    pub date: NaiveDate,
    /// 壁纸原图的直接下载 URL（绝对 URI）
    pub url: String,
    /// 分辨率描述（如 "1920x1080"）
    pub resolution: String,
    /// 标题（可能为空字符串）
    pub title: String,
    /// 归档发布的版权/出处说明
    #[allow(dead_code)]
    pub copyright: String,
}

impl WallpaperRecord {
    /// 目标文件名：`<YYYY-MM-DD>_<分辨率>.<扩展名>`
    /// 扩展名取自图片 URL，取不到则用 jpg
    pub fn filename(&self) -> String {
        format!(
            "{}_{}.{}",
            self.date.format("%Y-%m-%d"),
            self.resolution,
            extension_of(&self.url)
        )
    }
}

/// 从图片 URL 猜测文件扩展名
///
/// Bing 的图片 URL 形如 `/th?id=OHR.Xxx_1920x1080.jpg&rf=...`，
/// 扩展名藏在 id 参数的末尾而不是路径里
fn extension_of(url: &str) -> &str {
    let candidate = url.split('&').next().unwrap_or(url);
    match candidate.rsplit('.').next() {
        Some(ext)
            if !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext
        }
        _ => "jpg",
    }
}

/// 判断文件名是否符合本工具的命名方案（clean 子命令用）
pub fn is_record_filename(name: &str) -> bool {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return false;
    };
    let Some((date, resolution)) = stem.split_once('_') else {
        return false;
    };
    NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() && !resolution.is_empty() && !ext.is_empty()
}

/// 抓取参数结构体
pub struct FetchOptions<'a> {
    /// 范围起始日期（含）
    pub start: NaiveDate,
    /// 范围结束日期（含）
    pub end: NaiveDate,
    pub resolution: &'a str,
    /// 市场/区域代码（如 "en-US"）
    pub market: &'a str,
}

/// 单条记录的下载结果
#[derive(Debug)]
pub enum DownloadOutcome {
    /// 新写入了文件
    Downloaded(PathBuf),
    /// 目标文件已存在，未发出任何网络请求
    AlreadyPresent(PathBuf),
}

/// 壁纸归档的抽象 Trait
/// 所有的归档客户端（如 BingClient）都应该实现这个 Trait
#[async_trait]
pub trait WallpaperSource {
    /// 抓取一段日期范围内的壁纸元数据
    /// 返回按日期升序、每天至多一条的 WallpaperRecord 列表
    async fn fetch(&self, options: FetchOptions<'_>) -> Result<Vec<WallpaperRecord>, ArchiveError>;

    /// 下载单条记录到指定目录
    /// 目标文件已存在时跳过抓取，直接返回 AlreadyPresent
    async fn download(
        &self,
        record: &WallpaperRecord,
        out_dir: &Path,
    ) -> Result<DownloadOutcome, ArchiveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str) -> WallpaperRecord {
        WallpaperRecord {
            date: NaiveDate::from_ymd_opt(2026, 8, 27).unwrap(),
            url: url.to_string(),
            resolution: "1920x1080".to_string(),
            title: String::new(),
            copyright: String::new(),
        }
    }

    #[test]
    fn filename_uses_date_resolution_and_url_extension() {
        let r = record("https://www.bing.com/th?id=OHR.Foo_EN-US1_1920x1080.jpg&rf=Foo.jpg");
        assert_eq!(r.filename(), "2026-08-27_1920x1080.jpg");

        let r = record("https://www.bing.com/th?id=OHR.Foo_EN-US1_1920x1080.png&rf=Foo.jpg");
        assert_eq!(r.filename(), "2026-08-27_1920x1080.png");
    }

    #[test]
    fn filename_falls_back_to_jpg() {
        let r = record("https://www.bing.com/th?id=no-extension-here");
        assert_eq!(r.filename(), "2026-08-27_1920x1080.jpg");
    }

    #[test]
    fn recognizes_own_naming_scheme() {
        assert!(is_record_filename("2026-08-27_1920x1080.jpg"));
        assert!(is_record_filename("2026-08-27_UHD.png"));

        assert!(!is_record_filename("vacation_photo.jpg"));
        assert!(!is_record_filename("2026-08-27.jpg"));
        assert!(!is_record_filename("2026-08-27_1920x1080"));
        assert!(!is_record_filename("notes.txt"));
    }
}
