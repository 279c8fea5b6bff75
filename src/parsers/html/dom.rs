use std::rc::Rc;

use html5ever::parse_document;
use html5ever::tendril::{StrTendril, TendrilSink};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// 将 HTML 文本解析为 DOM
///
/// 片段同样按完整文档解析：位于开头的 `<link>`、`<style>`、`<script>` 会落入
/// `<head>`，其余内容落入 `<body>`。序列化片段时两者会按顺序拼接回去。
pub fn html_to_dom(source: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(StrTendril::from_slice(source))
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: Vec<&str>) -> Vec<Handle> {
    assert!(!node_names.is_empty());

    let mut found_nodes = Vec::new();
    let node_name = node_names[0];

    if node_names.len() == 1 {
        if let NodeData::Element { ref name, .. } = node.data {
            if &*name.local == node_name {
                found_nodes.push(node.clone());
            }
        }

        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    } else if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == node_name {
            let mut new_node_names = node_names;
            new_node_names.remove(0);
            found_nodes.append(&mut find_nodes(node, new_node_names));
        } else {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
            }
        }
    } else {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    }

    found_nodes
}

/// 按谓词收集所有匹配的元素节点（文档顺序）
///
/// 返回的是快照：调用方可以在遍历结果时安全地移除节点。
/// `<template>` 的内容片段也会被搜索。
pub fn find_all<P>(node: &Handle, predicate: &P) -> Vec<Handle>
where
    P: Fn(&Handle) -> bool,
{
    let mut found_nodes = Vec::new();
    collect_matching(node, predicate, &mut found_nodes);
    found_nodes
}

fn collect_matching<P>(node: &Handle, predicate: &P, found_nodes: &mut Vec<Handle>)
where
    P: Fn(&Handle) -> bool,
{
    if let NodeData::Element {
        ref template_contents,
        ..
    } = node.data
    {
        if predicate(node) {
            found_nodes.push(node.clone());
        }

        if let Some(contents) = template_contents.borrow().as_ref() {
            collect_matching(contents, predicate, found_nodes);
        }
    }

    for child_node in node.children.borrow().iter() {
        collect_matching(child_node, predicate, found_nodes);
    }
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 将节点从其父节点中移除
///
/// 没有父节点的节点保持不变。
pub fn remove_node(node: &Handle) {
    if let Some(parent) = node.parent.take().and_then(|weak| weak.upgrade()) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
}

/// 将节点追加为 `parent` 的最后一个子节点
pub fn append_node(parent: &Handle, child: Handle) {
    remove_node(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 片段 DOM 的全部顶层节点（文档顺序）
///
/// 包括 `<head>` 与 `<body>` 的子节点，以及落在它们之外的注释
/// （文件开头的许可证注释、`</body>` 之后的注释等）。doctype 不算在内。
pub fn fragment_nodes(dom: &RcDom) -> Vec<Handle> {
    let mut nodes = Vec::new();
    collect_fragment_nodes(&dom.document, &mut nodes);
    nodes
}

fn collect_fragment_nodes(parent: &Handle, nodes: &mut Vec<Handle>) {
    for child in parent.children.borrow().iter() {
        match child.data {
            NodeData::Comment { .. } => nodes.push(child.clone()),
            NodeData::Element { ref name, .. } => match &*name.local {
                "html" => collect_fragment_nodes(child, nodes),
                "head" | "body" => nodes.extend(child.children.borrow().iter().cloned()),
                _ => {}
            },
            _ => {}
        }
    }
}

/// 取出片段 DOM 中的全部顶层节点，顺序同 [`fragment_nodes`]
///
/// 节点会脱离原来的树，可以直接追加到其他文档中。
pub fn take_fragment_nodes(dom: &RcDom) -> Vec<Handle> {
    let nodes = fragment_nodes(dom);
    for node in &nodes {
        remove_node(node);
    }
    nodes
}

/// 把 `<template>` 的内容片段移回元素自身的子节点（递归）
///
/// html5ever 将模板内容放在 `template_contents` 中，而序列化只遍历
/// `children`；序列化之前调用，模板内容才不会丢失。
pub fn flatten_template_contents(node: &Handle) {
    if let NodeData::Element {
        ref template_contents,
        ..
    } = node.data
    {
        if let Some(contents) = template_contents.borrow().as_ref() {
            let moved = std::mem::take(&mut *contents.children.borrow_mut());
            let mut children = node.children.borrow_mut();
            for child in moved {
                child.parent.set(Some(Rc::downgrade(node)));
                children.push(child);
            }
        }
    }

    let children = node.children.borrow().clone();
    for child in children.iter() {
        flatten_template_contents(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_all_returns_document_order() {
        let dom = html_to_dom("<p id=a></p><div><p id=b></p></div><p id=c></p>");
        let found = find_all(&dom.document, &|node: &Handle| get_node_name(node) == Some("p"));
        let ids: Vec<String> = found
            .iter()
            .filter_map(|node| get_node_attr(node, "id"))
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_find_all_searches_template_contents() {
        let dom = html_to_dom("<template><link rel=import href=x.html></template>");
        let found = find_all(&dom.document, &|node: &Handle| {
            get_node_name(node) == Some("link")
        });
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_remove_node_detaches_from_parent() {
        let dom = html_to_dom("<div><span></span><b></b></div>");
        let div = find_nodes(&dom.document, vec!["html", "body", "div"]).remove(0);
        let span = get_child_node_by_name(&div, "span").unwrap();

        remove_node(&span);

        assert_eq!(div.children.borrow().len(), 1);
        assert!(span.parent.take().is_none());
    }

    #[test]
    fn test_fragment_nodes_keep_comments_outside_body() {
        let dom = html_to_dom("<!-- license --><style>a{}</style><div>x</div></body><!-- tail -->");
        let nodes = fragment_nodes(&dom);

        assert_eq!(nodes.len(), 4);
        assert!(matches!(nodes[0].data, NodeData::Comment { ref contents } if &**contents == " license "));
        assert_eq!(get_node_name(&nodes[1]), Some("style"));
        assert_eq!(get_node_name(&nodes[2]), Some("div"));
        assert!(matches!(nodes[3].data, NodeData::Comment { ref contents } if &**contents == " tail "));
    }

    #[test]
    fn test_take_fragment_nodes_detaches_comments() {
        let dom = html_to_dom("<!-- license --><div>x</div>");
        let nodes = take_fragment_nodes(&dom);

        assert_eq!(nodes.len(), 2);
        assert!(dom.document.children.borrow().iter().all(|child| !matches!(
            child.data,
            NodeData::Comment { .. }
        )));
    }

    #[test]
    fn test_flatten_template_contents_moves_children() {
        let dom = html_to_dom("<template id=t><b>row</b></template>");
        let template = find_nodes(&dom.document, vec!["html", "head", "template"]).remove(0);
        assert!(template.children.borrow().is_empty());

        flatten_template_contents(&dom.document);

        let children = template.children.borrow();
        assert_eq!(children.len(), 1);
        assert_eq!(get_node_name(&children[0]), Some("b"));
        drop(children);

        // 再次调用不会重复移动
        flatten_template_contents(&dom.document);
        assert_eq!(template.children.borrow().len(), 1);
    }

    #[test]
    fn test_append_node_moves_between_documents() {
        let source = html_to_dom("<em>x</em>");
        let target = html_to_dom("<body></body>");
        let body = find_nodes(&target.document, vec!["html", "body"]).remove(0);

        for node in take_fragment_nodes(&source) {
            append_node(&body, node);
        }

        assert_eq!(body.children.borrow().len(), 1);
        assert_eq!(get_node_name(&body.children.borrow()[0]), Some("em"));
    }
}
