//! # 依赖解析器
//!
//! 解析一个 HTML 片段中的全部本地引用，并将其从片段中移除：
//!
//! 1. **导入** `<link rel="import" href=…>` - 递归解析被导入的文件，结果交给 `emit`
//! 2. **样式表** `<link rel="stylesheet" href=…>` - 内容包裹为 `<style>` 后交给 `emit`
//! 3. **脚本** `<script src=…>` - 内容包裹为 `<script>` 后交给 `emit`
//!
//! 三轮按顺序执行；同一轮内的所有引用并发解析，全部完成（或第一个失败）后才进入下一轮。
//! 每个解析成功的文件路径都会通过 `track` 报告给宿主。
//!
//! 失败不会回滚：已经交给 `emit` / `track` 的内容保持不变。
//!
//! # 使用示例
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::path::Path;
//!
//! use html_includer::host::MemoryHost;
//! use html_includer::resolver::DependencyResolver;
//!
//! # tokio_test_block_on(async {
//! let host = MemoryHost::new().with_file("/site/s.css", "#x{color:red}");
//! let emitted = RefCell::new(Vec::new());
//! let emit = |fragment: String| emitted.borrow_mut().push(fragment);
//! let track = |_: &Path| {};
//!
//! let resolver = DependencyResolver::new(&host, &emit, &track);
//! let output = resolver
//!     .resolve(r#"<link rel="stylesheet" href="s.css"><p>hi</p>"#, Path::new("/site"))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(output, "<p>hi</p>");
//! assert_eq!(emitted.borrow()[0], "<style>#x{color:red}</style>");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(future: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(future)
//! # }
//! ```

pub mod reference;

use std::path::{Path, PathBuf};

use futures::future::{try_join_all, FutureExt, LocalBoxFuture};
use markup5ever_rcdom::RcDom;

use crate::core::IncluderError;
use crate::host::Host;
use crate::parsers::html::{
    html_to_dom, remove_node, serialize_fragment, wrap_in_tag, ReferenceKind,
};
use crate::utils::path::resolution_context;

pub use reference::{collect_references, resolve_path, Reference};

/// 递归依赖解析器
///
/// 自身不保存任何状态；片段通过 `emit` 流出，路径通过 `track` 流出。
pub struct DependencyResolver<'a, H> {
    host: &'a H,
    emit: &'a dyn Fn(String),
    track: &'a dyn Fn(&Path),
    detect_cycles: bool,
}

impl<'a, H: Host> DependencyResolver<'a, H> {
    pub fn new(host: &'a H, emit: &'a dyn Fn(String), track: &'a dyn Fn(&Path)) -> Self {
        Self {
            host,
            emit,
            track,
            detect_cycles: true,
        }
    }

    /// 是否在导入链上检测循环（默认开启）
    ///
    /// 关闭后，循环导入会无限递归。
    pub fn detect_cycles(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    /// 解析片段，`context` 为片段中相对引用的解析目录
    pub async fn resolve(&self, fragment: &str, context: &Path) -> Result<String, IncluderError> {
        self.resolve_nested(fragment.to_string(), context.to_path_buf(), Vec::new())
            .await
    }

    /// 解析来自 `origin` 文件的片段；`origin` 本身计入导入链
    pub async fn resolve_file_content(
        &self,
        fragment: &str,
        origin: &Path,
    ) -> Result<String, IncluderError> {
        self.resolve_nested(
            fragment.to_string(),
            resolution_context(origin),
            vec![origin.to_path_buf()],
        )
        .await
    }

    fn resolve_nested(
        &self,
        fragment: String,
        context: PathBuf,
        chain: Vec<PathBuf>,
    ) -> LocalBoxFuture<'_, Result<String, IncluderError>> {
        async move {
            let dom = html_to_dom(&fragment);

            for kind in ReferenceKind::PASSES {
                self.resolve_pass(&dom, kind, &context, &chain).await?;
            }

            Ok(serialize_fragment(&dom)?)
        }
        .boxed_local()
    }

    async fn resolve_pass(
        &self,
        dom: &RcDom,
        kind: ReferenceKind,
        context: &Path,
        chain: &[PathBuf],
    ) -> Result<(), IncluderError> {
        let references = collect_references(dom, kind);

        if references.is_empty() {
            return Ok(());
        }

        try_join_all(
            references
                .iter()
                .map(|reference| self.resolve_reference(reference, context, chain)),
        )
        .await?;

        for reference in &references {
            remove_node(&reference.node);
        }

        Ok(())
    }

    async fn resolve_reference(
        &self,
        reference: &Reference,
        context: &Path,
        chain: &[PathBuf],
    ) -> Result<(), IncluderError> {
        let path = resolve_path(self.host, context, &reference.request).await?;

        if reference.kind == ReferenceKind::Import && self.detect_cycles && chain.contains(&path) {
            let mut cycle = chain.to_vec();
            cycle.push(path);
            return Err(IncluderError::ImportCycle { chain: cycle });
        }

        let content = self
            .host
            .read_file(&path)
            .await
            .map_err(|source| IncluderError::Read {
                path: path.clone(),
                source,
            })?;

        let fragment = match reference.kind.wrap_tag() {
            Some(tag) => wrap_in_tag(tag, &content),
            None => {
                let mut nested_chain = chain.to_vec();
                nested_chain.push(path.clone());
                self.resolve_nested(content, resolution_context(&path), nested_chain)
                    .await?
            }
        };

        tracing::debug!(
            "Resolved {} '{}' to {}",
            reference.kind,
            reference.request,
            path.display()
        );

        (self.track)(path.as_path());
        (self.emit)(fragment);

        Ok(())
    }
}

/// 便捷函数：用给定宿主与回调解析一个片段
pub async fn resolve_html_dependencies<H: Host>(
    host: &H,
    fragment: &str,
    context: &Path,
    emit: &dyn Fn(String),
    track: &dyn Fn(&Path),
) -> Result<String, IncluderError> {
    DependencyResolver::new(host, emit, track)
        .resolve(fragment, context)
        .await
}
