// main.rs — 程序入口
// 负责初始化异步运行时、解析命令行参数、分发子命令

mod cli; // 声明 cli 模块，对应 src/cli.rs
mod config; // 声明 config 模块，对应 src/config.rs
mod error;
mod source;

// 初始化多语言支持，嵌入 locales 目录下的所有翻译
rust_i18n::i18n!("locales");

use chrono::{Duration, Local, NaiveDate};
use clap::{CommandFactory, Parser}; // 引入 Parser trait 的 parse() 方法; CommandFactory 用于生成补全脚本
use clap_complete::generate; // 引入补全脚本生成函数
use cli::{Cli, Commands}; // 引入 CLI 结构体和子命令枚举
use config::AppConfig; // 引入应用配置
use error::ArchiveError;
use rust_i18n::t; // 引入翻译宏
use source::bing::BingClient;
use source::{DownloadOutcome, FetchOptions, WallpaperRecord, WallpaperSource};
use std::path::{Path, PathBuf};

/// `#[tokio::main]` 宏将 async main 转换为同步 main + tokio 运行时
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 自动检测系统语言并设置
    let locale = std::env::var("LANG").unwrap_or_else(|_| "en".to_string());
    if locale.starts_with("zh") {
        rust_i18n::set_locale("zh-CN");
    } else {
        rust_i18n::set_locale("en");
    }

    // 解析命令行参数
    let cli = Cli::parse();

    // 创建应用配置（读取配置文件、设置路径）
    let mut config = AppConfig::new();

    // 确保配置目录存在
    config.ensure_dirs()?;

    // 根据子命令分发执行逻辑
    match &cli.command {
        Commands::Fetch {
            date,
            until,
            days,
            resolution,
            market,
            output,
        } => {
            handle_fetch(
                &config,
                *date,
                *until,
                *days,
                resolution.as_deref(),
                market.as_deref(),
                output.as_deref(),
            )
            .await?;
        }

        Commands::Completions { shell } => {
            generate(
                *shell,
                &mut Cli::command(),
                "bingwall",
                &mut std::io::stdout(),
            );
        }

        Commands::Config { action } => {
            handle_config(&mut config, action)?;
        }

        Commands::Clean => {
            handle_clean(&config)?;
        }
    }

    Ok(())
}

/// 把 CLI 的日期参数解析成闭区间 [start, end]
///
/// 优先级：--days > --date/--until > 配置的默认天数
fn resolve_range(
    date: Option<NaiveDate>,
    until: Option<NaiveDate>,
    days: Option<u8>,
    default_days: u8,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    if let Some(n) = days {
        let n = i64::from(n.max(1));
        return (today - Duration::days(n - 1), today);
    }

    match (date, until) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => (start, start),
        (None, Some(end)) => (end, end),
        (None, None) => {
            let n = i64::from(default_days.max(1));
            (today - Duration::days(n - 1), today)
        }
    }
}

/// 处理 fetch 子命令：抓取元数据并逐条下载
///
/// 错误策略：元数据抓取失败直接返回错误；单条记录的网络/解析失败
/// 计入 failed 并继续；文件系统错误中止整个运行。
async fn handle_fetch(
    config: &AppConfig,
    date: Option<NaiveDate>,
    until: Option<NaiveDate>,
    days: Option<u8>,
    resolution: Option<&str>,
    market: Option<&str>,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = BingClient::new();
    let today = Local::now().date_naive();

    let (start, end) = resolve_range(date, until, days, config.fetch_defaults.days, today);
    let resolution = resolution.unwrap_or(&config.fetch_defaults.resolution);
    let market = market.unwrap_or(&config.fetch_defaults.market);
    let out_dir = output
        .map(PathBuf::from)
        .unwrap_or_else(|| config.wallpaper_dir.clone());

    println!(
        "{}",
        t!("fetch_start", from => start, to => end, market => market)
    );

    let records = client
        .fetch(FetchOptions {
            start,
            end,
            resolution,
            market,
        })
        .await?;

    if records.is_empty() {
        println!("{}", t!("no_wallpapers"));
        return Ok(());
    }

    let summary = run_downloads(&client, &records, &out_dir).await?;

    println!(
        "{}",
        t!(
            "summary",
            fetched => records.len(),
            downloaded => summary.downloaded,
            skipped => summary.skipped,
            failed => summary.failed
        )
    );
    Ok(())
}

/// 单次运行的下载统计
#[derive(Debug, Default, PartialEq)]
struct FetchSummary {
    downloaded: usize,
    skipped: usize,
    failed: usize,
}

/// 逐条下载记录
///
/// 单条记录的网络/解析失败计入 failed 并继续下一条；
/// 文件系统错误直接返回，中止整个运行。
async fn run_downloads(
    source: &(impl WallpaperSource + Sync),
    records: &[WallpaperRecord],
    out_dir: &Path,
) -> Result<FetchSummary, ArchiveError> {
    let total = records.len();
    let mut summary = FetchSummary::default();

    for (i, record) in records.iter().enumerate() {
        println!(
            "{}",
            t!(
                "download_info",
                current => i + 1,
                total => total,
                date => record.date,
                title => record.title
            )
        );

        match source.download(record, out_dir).await {
            Ok(DownloadOutcome::Downloaded(path)) => {
                summary.downloaded += 1;
                println!("{}", t!("save_path", path => path.display()));
            }
            Ok(DownloadOutcome::AlreadyPresent(path)) => {
                summary.skipped += 1;
                println!("{}", t!("skip_exists", path => path.display()));
            }
            // 磁盘问题会在后续每条记录上原样重现，中止整个运行
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                summary.failed += 1;
                eprintln!("{}", t!("download_failed", date => record.date, reason => e));
            }
        }
    }

    Ok(summary)
}

/// 处理 clean 子命令：清理所有符合本工具命名方案的文件
fn handle_clean(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let dir = &config.wallpaper_dir;

    if !dir.exists() {
        println!("{}", t!("clean_done", count => 0));
        return Ok(());
    }

    println!("{}", t!("cleaning_dir", path => dir.display()));

    let mut deleted_count = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
                if source::is_record_filename(filename) {
                    std::fs::remove_file(&path)?;
                    deleted_count += 1;
                    println!("  {} {}", t!("deleted"), filename);
                }
            }
        }
    }

    println!("{}", t!("clean_done", count => deleted_count));
    Ok(())
}

/// 处理 config 子命令：查看或修改配置
fn handle_config(
    config: &mut AppConfig,
    action: &cli::ConfigAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        cli::ConfigAction::Show => {
            println!("{}", t!("config_title"));
            println!(
                "{}",
                t!("config_path", path => config.config_path.display())
            );
            println!(
                "{}",
                t!("config_wallpaper_dir", path => config.wallpaper_dir.display())
            );
            println!("{}", t!("config_fetch_defaults"));
            println!(
                "{}",
                t!("config_market", market => config.fetch_defaults.market)
            );
            println!(
                "{}",
                t!("config_res", res => config.fetch_defaults.resolution)
            );
            println!(
                "{}",
                t!("config_days", days => config.fetch_defaults.days)
            );
        }
        cli::ConfigAction::Schema => {
            println!("{}", AppConfig::get_schema());
        }
        cli::ConfigAction::Dump => {
            println!("{}", config.to_toml());
        }
        cli::ConfigAction::Set { key, value } => {
            match key.as_str() {
                "market" => config.fetch_defaults.market = value.clone(),
                "res" | "resolution" => config.fetch_defaults.resolution = value.clone(),
                "days" => {
                    config.fetch_defaults.days = value
                        .parse()
                        .map_err(|_| t!("config_error_bad_value", key => key, value => value))?;
                }
                _ => return Err(t!("config_error_unknown_key", key => key).into()),
            }
            config.save()?;
            println!("{}", t!("config_updated", key => key, value => value));
        }
    }
    Ok(())
}
