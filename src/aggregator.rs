//! # 片段聚合器
//!
//! 整个构建过程共享的有序片段集合：
//!
//! - 按解析完成的顺序保存片段，完全相同的内容只保存一次
//! - 构建结束时将所有片段追加到目标文档的 `<body>` 中，
//!   或者只追加一个指向独立 bundle 文件的 `<link rel="import">`
//!
//! 聚合器由构建会话显式持有并以引用传递，不存在全局状态。

use std::collections::HashSet;
use std::io;
use std::sync::{Mutex, MutexGuard};

use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::format_tendril;
use html5ever::tree_builder::create_element;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, RcDom};

use crate::parsers::html::{
    append_node, find_nodes, html_to_dom, serialize_document, take_fragment_nodes,
    DOCUMENT_TEMPLATE,
};

#[derive(Default)]
struct FragmentSet {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

/// 构建范围内的有序、去重片段集合
#[derive(Default)]
pub struct FragmentAggregator {
    fragments: Mutex<FragmentSet>,
}

impl FragmentAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FragmentSet> {
        // A poisoned set is still a valid set
        self.fragments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 追加片段；内容已存在时什么也不做
    ///
    /// 返回片段是否被新追加。检查与插入在同一把锁内完成。
    pub fn add_fragment(&self, fragment: impl Into<String>) -> bool {
        let fragment = fragment.into();
        let mut set = self.lock();

        if set.seen.contains(&fragment) {
            tracing::trace!("Skipping duplicate fragment ({} bytes)", fragment.len());
            return false;
        }

        tracing::trace!("Collected fragment #{} ({} bytes)", set.ordered.len() + 1, fragment.len());
        set.seen.insert(fragment.clone());
        set.ordered.push(fragment);
        true
    }

    /// 当前收集到的片段（按收集顺序）
    pub fn fragments(&self) -> Vec<String> {
        self.lock().ordered.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().ordered.is_empty()
    }

    /// 将所有片段按顺序追加到目标文档的 `<body>` 中，返回改写后的文档
    pub fn finalize(&self, target_document: &str) -> io::Result<String> {
        let dom = html_to_dom(target_document);
        let body = document_body(&dom)?;

        for fragment in self.fragments() {
            let fragment_dom = html_to_dom(&fragment);
            for node in take_fragment_nodes(&fragment_dom) {
                append_node(&body, node);
            }
        }

        serialize_document(&dom)
    }

    /// 在目标文档的 `<body>` 末尾追加指向 `asset_path` 的导入链接
    pub fn reference(&self, target_document: &str, asset_path: &str) -> io::Result<String> {
        let dom = html_to_dom(target_document);
        let body = document_body(&dom)?;

        let link_node = create_element(
            &dom,
            QualName::new(None, ns!(), LocalName::from("link")),
            vec![
                Attribute {
                    name: QualName::new(None, ns!(), LocalName::from("rel")),
                    value: format_tendril!("import"),
                },
                Attribute {
                    name: QualName::new(None, ns!(), LocalName::from("href")),
                    value: format_tendril!("{}", asset_path),
                },
            ],
        );
        append_node(&body, link_node);

        serialize_document(&dom)
    }

    /// 以空模板生成独立的 bundle 文档
    pub fn bundle_document(&self) -> io::Result<String> {
        self.finalize(DOCUMENT_TEMPLATE)
    }
}

fn document_body(dom: &RcDom) -> io::Result<Handle> {
    // The HTML parser always synthesizes <body>
    find_nodes(&dom.document, vec!["html", "body"])
        .into_iter()
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "document has no <body>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_fragment_is_idempotent() {
        let aggregator = FragmentAggregator::new();
        assert!(aggregator.add_fragment("<div>a</div>"));
        assert!(!aggregator.add_fragment("<div>a</div>"));
        assert_eq!(aggregator.fragments(), vec!["<div>a</div>"]);
    }

    #[test]
    fn test_add_fragment_keeps_insertion_order() {
        let aggregator = FragmentAggregator::new();
        aggregator.add_fragment("b");
        aggregator.add_fragment("a");
        aggregator.add_fragment("b");
        assert_eq!(aggregator.fragments(), vec!["b", "a"]);
        assert_eq!(aggregator.len(), 2);
    }

    #[test]
    fn test_finalize_appends_to_body() {
        let aggregator = FragmentAggregator::new();
        aggregator.add_fragment("<div>From includefile.html</div>");
        aggregator.add_fragment("<style>#x {color: green;}</style>");

        let output = aggregator
            .finalize("<html><head><title>t</title></head><body><main></main></body></html>")
            .unwrap();

        assert_eq!(
            output,
            "<html><head><title>t</title></head><body><main></main>\
             <div>From includefile.html</div><style>#x {color: green;}</style></body></html>"
        );
    }

    #[test]
    fn test_finalize_keeps_template_contents() {
        let aggregator = FragmentAggregator::new();
        aggregator.add_fragment("<p>f</p>");
        aggregator.add_fragment(r#"<dom-module id="x"><template><div>hi</div></template></dom-module>"#);

        let output = aggregator
            .finalize("<!DOCTYPE html><html><body><template id=t><b>row</b></template></body></html>")
            .unwrap();

        assert_eq!(
            output,
            "<!DOCTYPE html><html><head></head><body><template id=\"t\"><b>row</b></template>\
             <p>f</p><dom-module id=\"x\"><template><div>hi</div></template></dom-module></body></html>"
        );
    }

    #[test]
    fn test_finalize_keeps_fragment_comments() {
        let aggregator = FragmentAggregator::new();
        aggregator.add_fragment("<!-- license --><div>x</div>");

        let output = aggregator.finalize("<p>i</p>").unwrap();

        assert_eq!(
            output,
            "<html><head></head><body><p>i</p><!-- license --><div>x</div></body></html>"
        );
    }

    #[test]
    fn test_finalize_empty_aggregator_leaves_document() {
        let aggregator = FragmentAggregator::new();
        assert!(aggregator.is_empty());
        assert_eq!(
            aggregator.finalize("<p>x</p>").unwrap(),
            "<html><head></head><body><p>x</p></body></html>"
        );
    }

    #[test]
    fn test_reference_appends_import_link() {
        let aggregator = FragmentAggregator::new();
        aggregator.add_fragment("<div>not inlined</div>");

        let output = aggregator.reference("<p>x</p>", "bundle.html").unwrap();

        assert!(output.contains(r#"<link rel="import" href="bundle.html">"#));
        assert!(!output.contains("not inlined"));
    }

    #[test]
    fn test_bundle_document_uses_template() {
        let aggregator = FragmentAggregator::new();
        aggregator.add_fragment("<p>x</p>");

        assert_eq!(
            aggregator.bundle_document().unwrap(),
            "<!DOCTYPE html><html><head></head><body><p>x</p></body></html>"
        );
    }
}
