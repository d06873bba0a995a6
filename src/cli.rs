// cli.rs — 命令行接口定义模块
// 使用 clap 的 derive 模式定义所有子命令和参数

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Bing 每日壁纸下载工具
///
/// 从 Bing 壁纸归档抓取指定日期的元数据，
/// 把图片按 <日期>_<分辨率>.<扩展名> 保存到本地目录。
#[derive(Parser)]
#[command(name = "bingwall")]
#[command(version)] // 自动从 Cargo.toml 读取 version 字段
#[command(about = "Bing 每日壁纸下载工具 — 按日期抓取归档元数据并保存图片")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 抓取并下载指定日期（或日期范围）的壁纸
    ///
    /// 用法示例:
    ///   bingwall fetch
    ///   bingwall fetch --date 2026-08-25
    ///   bingwall fetch --date 2026-08-21 --until 2026-08-27
    ///   bingwall fetch -n 7 -r UHD -m zh-CN
    Fetch {
        /// 起始日期 (YYYY-MM-DD)，不指定则按配置的默认天数推算
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// 结束日期 (YYYY-MM-DD)，默认与起始日期相同
        #[arg(short, long)]
        until: Option<NaiveDate>,

        /// 抓取截至今天的最近 N 天，与 --date/--until 互斥
        #[arg(short = 'n', long, value_name = "N", conflicts_with_all = ["date", "until"])]
        days: Option<u8>,

        /// 壁纸分辨率 (UHD/1920x1080/1366x768/1280x720/1024x768)
        #[arg(short, long)]
        resolution: Option<String>,

        /// 市场/区域代码（如 en-US、zh-CN、ja-JP）
        #[arg(short, long)]
        market: Option<String>,

        /// 输出目录（不指定则使用配置中的 wallpaper_dir）
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 生成 shell 补全脚本（支持 bash, zsh, fish, elvish, powershell）
    ///
    /// 用法示例：
    ///   bingwall completions zsh > ~/.zsh/completions/_bingwall
    ///   bingwall completions fish > ~/.config/fish/completions/bingwall.fish
    Completions {
        /// 目标 shell 类型
        shell: Shell,
    },

    /// 配置管理操作
    ///
    /// 用法示例:
    ///   bingwall config show
    ///   bingwall config dump
    ///   bingwall config set market "zh-CN"
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// 清理输出目录中所有符合 <日期>_<分辨率> 命名方案的文件
    ///
    /// 用法示例:
    ///   bingwall clean
    Clean,
}

/// 配置管理操作
#[derive(Subcommand)]
pub enum ConfigAction {
    /// 查看当前所有配置简报
    Show,
    /// 生成配置文件对应的 JSON Schema
    Schema,
    /// 以 TOML 格式打印当前完整配置内容
    Dump,
    /// 设置配置项的值 (支持: market, resolution, days)
    Set {
        /// 要设置的键 (market, res, days)
        key: String,
        /// 要设置的值
        value: String,
    },
}
