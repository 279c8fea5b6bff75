//! HTML 引用解析模块
//!
//! 该模块负责识别片段中指向外部文件的元素：
//!
//! - **链接类型解析**: 解析 `<link>` 元素的 `rel` 属性，识别 `import` 与 `stylesheet`
//! - **引用分类**: 根据元素名与属性判断一个节点属于哪种引用（导入、样式表、脚本）
//!
//! ## 使用示例
//!
//! ```rust
//! use html_includer::parsers::html::parser::{parse_link_type, LinkType};
//!
//! let link_types = parse_link_type("preload stylesheet");
//! assert_eq!(link_types, vec![LinkType::Stylesheet]);
//! ```

use std::fmt;

use markup5ever_rcdom::Handle;

use super::dom::{get_node_attr, get_node_name};

/// HTML链接类型枚举
///
/// 表示HTML `<link>` 元素中会被内联的 `rel` 类型值。
#[derive(Debug, PartialEq, Eq)]
pub enum LinkType {
    /// HTML 导入 - 链接到另一个 HTML 片段
    Import,
    /// CSS样式表 - 链接到外部CSS文件
    Stylesheet,
}

/// 解析HTML链接的rel属性值
///
/// 支持多个空格分隔的rel值，并且不区分大小写。不支持的rel值会被忽略。
///
/// ```rust
/// # use html_includer::parsers::html::parser::{parse_link_type, LinkType};
/// assert_eq!(parse_link_type("IMPORT"), vec![LinkType::Import]);
/// assert!(parse_link_type("icon").is_empty());
/// ```
pub fn parse_link_type(link_attr_rel_value: &str) -> Vec<LinkType> {
    let mut types: Vec<LinkType> = vec![];

    for link_attr_rel_type in link_attr_rel_value.split_whitespace() {
        if link_attr_rel_type.eq_ignore_ascii_case("import") {
            types.push(LinkType::Import);
        } else if link_attr_rel_type.eq_ignore_ascii_case("stylesheet") {
            types.push(LinkType::Stylesheet);
        }
    }

    types
}

/// 引用种类
///
/// 解析分三轮进行，顺序即为 [`ReferenceKind::PASSES`] 的顺序。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `<link rel="import" href=…>`
    Import,
    /// `<link rel="stylesheet" href=…>`
    Stylesheet,
    /// `<script src=…>`
    Script,
}

impl ReferenceKind {
    pub const PASSES: [ReferenceKind; 3] = [
        ReferenceKind::Import,
        ReferenceKind::Stylesheet,
        ReferenceKind::Script,
    ];

    /// 保存文件路径的属性名
    pub fn path_attr(self) -> &'static str {
        match self {
            ReferenceKind::Import | ReferenceKind::Stylesheet => "href",
            ReferenceKind::Script => "src",
        }
    }

    /// 内联内容时使用的包裹标签；导入不包裹
    pub fn wrap_tag(self) -> Option<&'static str> {
        match self {
            ReferenceKind::Import => None,
            ReferenceKind::Stylesheet => Some("style"),
            ReferenceKind::Script => Some("script"),
        }
    }

    /// 判断节点是否为该种类的引用（元素名 + 属性存在性）
    pub fn matches(self, node: &Handle) -> bool {
        let Some(node_name) = get_node_name(node) else {
            return false;
        };

        match self {
            ReferenceKind::Import | ReferenceKind::Stylesheet => {
                if node_name != "link" || get_node_attr(node, "href").is_none() {
                    return false;
                }
                let wanted = if self == ReferenceKind::Import {
                    LinkType::Import
                } else {
                    LinkType::Stylesheet
                };
                parse_link_type(&get_node_attr(node, "rel").unwrap_or_default()).contains(&wanted)
            }
            ReferenceKind::Script => node_name == "script" && get_node_attr(node, "src").is_some(),
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReferenceKind::Import => write!(f, "import"),
            ReferenceKind::Stylesheet => write!(f, "stylesheet"),
            ReferenceKind::Script => write!(f, "script"),
        }
    }
}
