// config.rs — 配置管理模块
// 遵循 Unix 风格：优先从 ~/.config/bingwall/config.toml 读取配置

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use shellexpand::tilde;

/// 展开路径中的 ~ 和环境变量 ($HOME, $XDG_CONFIG_HOME 等)
fn expand_path(path_str: &str) -> PathBuf {
    let expanded = tilde(path_str).into_owned();
    PathBuf::from(expanded)
}

/// 映射 config.toml 文件内容的嵌套结构体
#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct ConfigFile {
    #[serde(default)]
    common: CommonConfig,
}

#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct CommonConfig {
    /// 壁纸保存根目录 (支持 ~、$HOME 等环境变量，相对路径则相对于 $HOME)
    wallpaper_dir: Option<String>,
    /// 默认抓取参数
    #[serde(default)]
    fetch: FetchDefaults,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct FetchDefaults {
    /// 默认市场/区域代码
    #[serde(default = "default_market")]
    pub market: String,
    /// 默认分辨率
    #[serde(default = "default_resolution")]
    pub resolution: String,
    /// 不指定日期时默认抓取最近几天（截至今天）
    #[serde(default = "default_days")]
    pub days: u8,
}

impl Default for FetchDefaults {
    fn default() -> Self {
        Self {
            market: default_market(),
            resolution: default_resolution(),
            days: default_days(),
        }
    }
}

fn default_market() -> String {
    "en-US".to_string()
}
fn default_resolution() -> String {
    "1920x1080".to_string()
}
fn default_days() -> u8 {
    1
}

/// 应用全局配置项
pub struct AppConfig {
    /// 壁纸保存根目录
    pub wallpaper_dir: PathBuf,
    /// 配置文件所在路径
    pub config_path: PathBuf,
    /// 默认抓取参数
    pub fetch_defaults: FetchDefaults,
}

impl AppConfig {
    /// 初始化配置
    pub fn new() -> Self {
        let home = env::var("HOME").expect("无法获取 $HOME 环境变量");
        let home_path = PathBuf::from(&home);
        let config_dir = home_path.join(".config").join("bingwall");
        let config_path = config_dir.join("config.toml");

        let config_file = Self::load_config_from_file(&config_path).unwrap_or_default();

        // 壁纸目录：
        // 1. 如果配置了路径：展开 ~ 和环境变量，相对路径则相对于 $HOME
        // 2. 如果未配置：默认使用 $HOME/Pictures/bingwall
        let wallpaper_dir = if let Some(dir_str) = config_file.common.wallpaper_dir {
            let p = expand_path(&dir_str);
            if p.is_absolute() { p } else { home_path.join(p) }
        } else {
            home_path.join("Pictures").join("bingwall")
        };

        Self {
            wallpaper_dir,
            config_path,
            fetch_defaults: config_file.common.fetch,
        }
    }

    /// 辅助函数：解析 TOML 配置文件
    fn load_config_from_file(path: &Path) -> Option<ConfigFile> {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
    }

    /// 确保配置目录存在
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn to_config_file(&self) -> ConfigFile {
        ConfigFile {
            common: CommonConfig {
                wallpaper_dir: Some(self.wallpaper_dir.to_string_lossy().to_string()),
                fetch: FetchDefaults {
                    market: self.fetch_defaults.market.clone(),
                    resolution: self.fetch_defaults.resolution.clone(),
                    days: self.fetch_defaults.days,
                },
            },
        }
    }

    /// 将配置保存回文件
    pub fn save(&self) -> std::io::Result<()> {
        let toml_str = toml::to_string_pretty(&self.to_config_file())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        fs::write(&self.config_path, toml_str)
    }

    /// 获取配置文件的 JSON Schema
    pub fn get_schema() -> String {
        let schema = schemars::schema_for!(ConfigFile);
        serde_json::to_string_pretty(&schema).unwrap()
    }

    /// 将当前配置转换为 TOML 字符串
    pub fn to_toml(&self) -> String {
        let toml_str = toml::to_string_pretty(&self.to_config_file())
            .unwrap_or_else(|_| "# Error serializing config".to_string());

        // toml 库不支持带注释序列化，所以手动插入说明
        toml_str.replace(
            "[common.fetch]",
            "# 抓取默认值\n# resolution 可选: UHD, 1920x1080, 1366x768, 1280x720, 1024x768\n[common.fetch]",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(parsed.common.fetch.market, "en-US");
        assert_eq!(parsed.common.fetch.resolution, "1920x1080");
        assert_eq!(parsed.common.fetch.days, 1);
        assert!(parsed.common.wallpaper_dir.is_none());
    }

    #[test]
    fn partial_fetch_section_keeps_other_defaults() {
        let parsed: ConfigFile = toml::from_str(
            r#"
            [common]
            wallpaper_dir = "~/walls"

            [common.fetch]
            market = "ja-JP"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.common.wallpaper_dir.as_deref(), Some("~/walls"));
        assert_eq!(parsed.common.fetch.market, "ja-JP");
        assert_eq!(parsed.common.fetch.resolution, "1920x1080");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = AppConfig {
            wallpaper_dir: PathBuf::from("/tmp/walls"),
            config_path: PathBuf::from("/tmp/config.toml"),
            fetch_defaults: FetchDefaults {
                market: "zh-CN".to_string(),
                resolution: "UHD".to_string(),
                days: 3,
            },
        };

        let parsed: ConfigFile = toml::from_str(&config.to_toml()).unwrap();
        assert_eq!(parsed.common.wallpaper_dir.as_deref(), Some("/tmp/walls"));
        assert_eq!(parsed.common.fetch.market, "zh-CN");
        assert_eq!(parsed.common.fetch.resolution, "UHD");
        assert_eq!(parsed.common.fetch.days, 3);
    }
}
