// bing.rs — Bing 每日壁纸归档异步客户端模块
// 负责与 HPImageArchive 接口交互：抓取元数据和下载图片
//
// 接口按"距今多少天"寻址：idx 是范围结束日距今天的天数，n 是张数。
// 归档只保留最近一段时间的数据，idx 最大 7、单次最多返回 8 张。

use crate::error::ArchiveError;
use crate::source::{DownloadOutcome, FetchOptions, WallpaperRecord, WallpaperSource};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use rust_i18n::t;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// 归档支持的分辨率白名单
pub const SUPPORTED_RESOLUTIONS: &[&str] =
    &["UHD", "1920x1080", "1366x768", "1280x720", "1024x768"];

/// 归档的默认分辨率，请求了白名单之外的值时回退到它
pub const DEFAULT_RESOLUTION: &str = "1920x1080";

const MAX_IDX: i64 = 7;
const MAX_BATCH: i64 = 8;

/// 归档 JSON 响应的顶层结构
///
/// 只提取我们需要的字段，JSON 中多余的字段会被 serde 自动忽略
#[derive(Deserialize, Debug)]
pub struct ArchiveResponse {
    /// 按日期倒序排列的壁纸列表
    pub images: Vec<ArchiveImage>,
}

/// 归档里的单张壁纸
#[derive(Deserialize, Debug)]
pub struct ArchiveImage {
    /// 壁纸上线日期，格式 YYYYMMDD
    pub startdate: String,

    /// 不带分辨率后缀的相对 URL
    /// 形如 "/th?id=OHR.LoftedHome_EN-US1234567890"
    pub urlbase: String,

    #[serde(default)]
    pub title: String,

    /// 版权/出处说明（如 "© Jane Doe/Getty Images"）
    #[serde(default)]
    pub copyright: String,
}

/// Bing 归档异步客户端
///
/// 封装了 reqwest::Client 和接口地址，提供抓取和下载方法。
pub struct BingClient {
    /// HTTP 客户端（内部有连接池，应复用）
    client: reqwest::Client,

    /// 归档主机地址
    base_url: String,
}

impl Default for BingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BingClient {
    pub fn new() -> Self {
        Self::with_base_url("https://www.bing.com")
    }

    /// 指定主机地址构造客户端（测试时指向本地桩服务用）
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WallpaperSource for BingClient {
    async fn fetch(&self, options: FetchOptions<'_>) -> Result<Vec<WallpaperRecord>, ArchiveError> {
        let today = Local::now().date_naive();
        let (idx, n) = archive_window(options.start, options.end, today)?;
        let resolution = normalize_resolution(options.resolution);

        let url = format!("{}/HPImageArchive.aspx", self.base_url);
        let idx_str = idx.to_string();
        let n_str = n.to_string();
        let params: Vec<(&str, &str)> = vec![
            ("format", "js"),
            ("idx", &idx_str),
            ("n", &n_str),
            ("mkt", options.market),
        ];

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(ArchiveError::connection)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(ArchiveError::connection)?;

        parse_archive(&body, &self.base_url, resolution, options.start, options.end)
    }

    async fn download(
        &self,
        record: &WallpaperRecord,
        out_dir: &Path,
    ) -> Result<DownloadOutcome, ArchiveError> {
        let target = out_dir.join(record.filename());

        // 幂等：同名文件已存在则不再发出网络请求，也不覆盖
        if fs::try_exists(&target).await? {
            return Ok(DownloadOutcome::AlreadyPresent(target));
        }

        // 创建目录之前先校验 URL 是绝对 URI，坏记录不留下任何副作用
        let url = Url::parse(&record.url)
            .map_err(|e| ArchiveError::Parse(format!("bad image url {}: {}", record.url, e)))?;

        fs::create_dir_all(out_dir).await?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ArchiveError::connection)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::Status(status.as_u16()));
        }

        let declared = response.content_length();
        let bytes = response.bytes().await.map_err(ArchiveError::connection)?;

        // 服务端声明了长度时校验传输是否完整；不一致就不落盘
        ensure_complete(declared, bytes.len() as u64)?;

        let mut file = File::create(&target).await?;
        file.write_all(&bytes).await?;

        Ok(DownloadOutcome::Downloaded(target))
    }
}

/// 把请求的日期范围换算成归档接口的 (idx, n) 寻址
///
/// 范围为空、在未来、或超出归档保留窗口都在发请求之前报 Range 错误
fn archive_window(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<(i64, i64), ArchiveError> {
    if start > end {
        return Err(ArchiveError::Range(format!("{start} is after {end}")));
    }
    if end > today {
        return Err(ArchiveError::Range(format!("{end} is in the future")));
    }

    let idx = (today - end).num_days();
    let n = (end - start).num_days() + 1;

    if idx > MAX_IDX || n > MAX_BATCH {
        return Err(ArchiveError::Range(format!(
            "archive only keeps the last {} days, {} at a time",
            MAX_IDX + MAX_BATCH,
            MAX_BATCH
        )));
    }

    Ok((idx, n))
}

/// 分辨率白名单校验，不认识的值回退到归档默认
fn normalize_resolution(resolution: &str) -> &str {
    if SUPPORTED_RESOLUTIONS.contains(&resolution) {
        resolution
    } else {
        DEFAULT_RESOLUTION
    }
}

/// 校验实际收到的字节数与服务端声明的 Content-Length 一致
fn ensure_complete(declared: Option<u64>, got: u64) -> Result<(), ArchiveError> {
    match declared {
        Some(expected) if expected != got => Err(ArchiveError::Truncated { expected, got }),
        _ => Ok(()),
    }
}

/// 把归档的 JSON 响应解析成按日期升序的记录列表
///
/// 响应体整体不是预期的 JSON 结构时报 Parse；个别条目损坏只影响那一天，
/// 报告后跳过，批次里其余条目照常保留。范围之外的条目被丢弃；
/// 同一天出现多条时保留第一条
fn parse_archive(
    body: &str,
    base_url: &str,
    resolution: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<WallpaperRecord>, ArchiveError> {
    let response: ArchiveResponse =
        serde_json::from_str(body).map_err(|e| ArchiveError::Parse(e.to_string()))?;

    let mut records = Vec::with_capacity(response.images.len());
    for image in response.images {
        let record = match record_from(image, base_url, resolution) {
            Ok(record) => record,
            Err(reason) => {
                eprintln!("{}", t!("skip_malformed", reason => reason));
                continue;
            }
        };

        if record.date < start || record.date > end {
            continue;
        }

        records.push(record);
    }

    records.sort_by_key(|r| r.date);
    records.dedup_by_key(|r| r.date);

    Ok(records)
}

/// 把单个归档条目转换成记录，损坏的条目返回原因描述
fn record_from(
    image: ArchiveImage,
    base_url: &str,
    resolution: &str,
) -> Result<WallpaperRecord, String> {
    let date = NaiveDate::parse_from_str(&image.startdate, "%Y%m%d")
        .map_err(|e| format!("bad startdate {:?}: {}", image.startdate, e))?;

    let url = format!("{}{}_{}.jpg", base_url, image.urlbase, resolution);
    Url::parse(&url).map_err(|e| format!("bad image url {url}: {e}"))?;

    Ok(WallpaperRecord {
        date,
        url,
        resolution: resolution.to_string(),
        title: image.title,
        copyright: image.copyright,
    })
}
