//! HTML解析和处理模块
//!
//! - `utils`: 基础工具函数和常量
//! - `parser`: 链接类型与引用种类识别
//! - `dom`: 基础DOM操作（解析、查询、移除、追加）
//! - `serializer`: 片段与文档的序列化

pub mod dom;
pub mod parser;
pub mod serializer;
pub mod utils;

pub use dom::{
    append_node, find_all, find_nodes, flatten_template_contents, fragment_nodes,
    get_child_node_by_name, get_node_attr, get_node_name, html_to_dom, remove_node,
    take_fragment_nodes,
};
pub use parser::{parse_link_type, LinkType, ReferenceKind};
pub use serializer::{encode_document, serialize_document, serialize_fragment};
pub use utils::{is_valid_tag_name, wrap_in_tag, DOCUMENT_TEMPLATE, WHITESPACES};
