//! 统一的环境变量管理系统
//!
//! 类型安全、可验证的环境变量访问；命令行参数总是覆盖这里读取到的值

use std::env;
use std::fmt;

use encoding_rs::Encoding;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "HTML_INCLUDER_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("warn".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid log level '{}'. Use: trace, debug, info, warn, error", value),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何非空值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 构建相关环境变量
pub mod build {
    use super::*;

    /// 模块目录
    pub struct ModuleDirs;
    impl EnvVar<Vec<String>> for ModuleDirs {
        const NAME: &'static str = "HTML_INCLUDER_MODULE_DIRS";
        const DEFAULT: Option<Vec<String>> = None;

        fn get() -> EnvResult<Vec<String>> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(vec![crate::host::filesystem::DEFAULT_MODULE_DIRECTORY.to_string()]),
            }
        }
        const DESCRIPTION: &'static str = "Module directories searched for bare requests (comma-separated)";

        fn parse(value: &str) -> EnvResult<Vec<String>> {
            let dirs: Vec<String> = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            if dirs.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "At least one module directory is required".to_string(),
                });
            }
            Ok(dirs)
        }
    }

    /// 输入文件字符集
    pub struct InputEncoding;
    impl EnvVar<String> for InputEncoding {
        const NAME: &'static str = "HTML_INCLUDER_ENCODING";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("utf-8".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Charset used to decode input files";

        fn parse(value: &str) -> EnvResult<String> {
            let label = value.trim();
            match Encoding::for_label_no_replacement(label.as_bytes()) {
                Some(_) => Ok(label.to_lowercase()),
                None => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Unknown encoding '{}'", value),
                }),
            }
        }
    }

    /// bundle 文件名；设置后进入 bundle 模式
    pub struct AssetFile;
    impl EnvVar<String> for AssetFile {
        const NAME: &'static str = "HTML_INCLUDER_ASSET_FILE";
        const DEFAULT: Option<String> = None; // 未设置时为内联模式
        const DESCRIPTION: &'static str = "Bundle file name; enables bundle mode when set";

        fn parse(value: &str) -> EnvResult<String> {
            let name = value.trim();
            if name.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Asset file name cannot be empty".to_string(),
                });
            }
            Ok(name.to_string())
        }
    }

    /// 导入循环检测
    pub struct DetectCycles;
    impl EnvVar<bool> for DetectCycles {
        const NAME: &'static str = "HTML_INCLUDER_DETECT_CYCLES";
        const DEFAULT: Option<bool> = Some(true);
        const DESCRIPTION: &'static str = "Fail on circular imports instead of recursing";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 忽略失败的入口
    pub struct IgnoreErrors;
    impl EnvVar<bool> for IgnoreErrors {
        const NAME: &'static str = "HTML_INCLUDER_IGNORE_ERRORS";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Log failed entries and keep building";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // 核心配置
    pub log_level: String,
    pub no_color: bool,

    // 构建配置
    pub module_directories: Vec<String>,
    pub encoding: String,
    pub asset_file: Option<String>,
    pub detect_cycles: bool,
    pub ignore_errors: bool,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,

            module_directories: build::ModuleDirs::get()?,
            encoding: build::InputEncoding::get()?,
            asset_file: match env::var(build::AssetFile::NAME) {
                Ok(value) => Some(build::AssetFile::parse(&value)?),
                Err(_) => None,
            },
            detect_cycles: build::DetectCycles::get()?,
            ignore_errors: build::IgnoreErrors::get()?,
        })
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");
    docs.push_str("| Variable | Description | Default |\n");
    docs.push_str("|---|---|---|\n");

    let mut row = |name: &str, description: &str, default: &str| {
        docs.push_str(&format!("| `{}` | {} | {} |\n", name, description, default));
    };

    row(core::LogLevel::NAME, core::LogLevel::DESCRIPTION, "`warn`");
    row(core::NoColor::NAME, core::NoColor::DESCRIPTION, "unset");
    row(build::ModuleDirs::NAME, build::ModuleDirs::DESCRIPTION, "`node_modules`");
    row(build::InputEncoding::NAME, build::InputEncoding::DESCRIPTION, "`utf-8`");
    row(build::AssetFile::NAME, build::AssetFile::DESCRIPTION, "unset");
    row(build::DetectCycles::NAME, build::DetectCycles::DESCRIPTION, "`true`");
    row(build::IgnoreErrors::NAME, build::IgnoreErrors::DESCRIPTION, "`false`");

    docs
}
