//! # HTML Includer
//!
//! 递归内联 HTML 依赖：`<link rel="import">` 导入的片段、`<link rel="stylesheet">` 样式表
//! 以及 `<script src>` 脚本都会被解析、移除，并以内联片段的形式汇总到最终文档中。
//!
//! ## 模块组织
//!
//! - `core` - 构建会话、错误类型与配置
//! - `resolver` - 依赖解析器
//! - `aggregator` - 构建范围内的片段聚合器
//! - `host` - 宿主能力（路径解析、文件读取）
//! - `parsers` - HTML 解析、DOM 操作与序列化
//! - `utils` - 工具函数和实用程序
//! - `env` - 环境变量配置

pub mod aggregator;
pub mod core;
pub mod env;
pub mod host;
pub mod parsers;
pub mod resolver;
pub mod utils;

// Re-export commonly used items for convenience
pub use crate::aggregator::FragmentAggregator;
pub use crate::core::{
    print_error_message, print_info_message, EntryRequest, HtmlIncluder, IncluderError,
    IncluderOptions,
};
pub use crate::host::{FsHost, Host, MemoryHost};
pub use crate::resolver::{resolve_html_dependencies, DependencyResolver};
