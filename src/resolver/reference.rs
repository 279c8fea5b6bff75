//! 引用收集与路径解析
//!
//! 每一轮解析开始前先对匹配的元素做快照，之后才修改 DOM，
//! 因此遍历结果不会因为节点被移除而跳过元素。

use std::path::{Path, PathBuf};

use markup5ever_rcdom::{Handle, RcDom};

use crate::core::IncluderError;
use crate::host::Host;
use crate::parsers::html::{find_all, get_node_attr, ReferenceKind};
use crate::utils::path::normalize_path;
use crate::utils::url::is_remote_reference;

/// 单轮解析中的一个引用
pub struct Reference {
    pub node: Handle,
    pub kind: ReferenceKind,
    /// `href` / `src` 的原始值
    pub request: String,
}

/// 收集文档中某一种类的全部本地引用（远程引用被跳过）
pub fn collect_references(dom: &RcDom, kind: ReferenceKind) -> Vec<Reference> {
    find_all(&dom.document, &|node: &Handle| kind.matches(node))
        .into_iter()
        .filter_map(|node| {
            let request = get_node_attr(&node, kind.path_attr())?;

            if is_remote_reference(&request) {
                tracing::debug!("Leaving remote {} reference '{}' untouched", kind, request);
                return None;
            }

            Some(Reference {
                node,
                kind,
                request,
            })
        })
        .collect()
}

/// 两阶段路径解析
///
/// 先按模块规则解析；失败时检查上下文目录下的字面路径是否存在；
/// 两者都失败则返回模块解析的原始错误。
pub async fn resolve_path<H: Host>(
    host: &H,
    context: &Path,
    request: &str,
) -> Result<PathBuf, IncluderError> {
    match host.resolve_module(context, request).await {
        Ok(path) => Ok(normalize_path(&path)),
        Err(module_error) => {
            let literal = normalize_path(&context.join(request.trim()));

            if host.path_exists(&literal).await {
                tracing::debug!(
                    "Module resolution of '{}' failed, using {}",
                    request,
                    literal.display()
                );
                Ok(literal)
            } else {
                Err(IncluderError::PathResolution {
                    request: request.to_string(),
                    context: context.to_path_buf(),
                    source: module_error,
                })
            }
        }
    }
}
