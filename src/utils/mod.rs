//! # 工具模块
//!
//! - `url` - 远程引用识别
//! - `path` - 路径规范化与解析上下文

pub mod path;
pub mod url;

// Re-export commonly used items for convenience
pub use path::{normalize_path, resolution_context};
pub use url::is_remote_reference;
