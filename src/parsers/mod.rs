//! # 解析器模块
//!
//! 这个模块包含解析和改写 HTML 片段所需的全部功能：
//!
//! - HTML解析和DOM操作
//! - 引用元素（导入、样式表、脚本）识别
//! - 片段与文档序列化

pub mod html;

// Re-export commonly used items for convenience
pub use html::{
    html_to_dom, parse_link_type, serialize_document, serialize_fragment, wrap_in_tag, LinkType,
    ReferenceKind,
};
