use std::io;

use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, RcDom, SerializableHandle};

use super::dom::{flatten_template_contents, fragment_nodes};

/// 序列化文档
pub fn serialize_document(dom: &RcDom) -> io::Result<String> {
    let mut buf: Vec<u8> = Vec::new();

    flatten_template_contents(&dom.document);
    let serializable: SerializableHandle = dom.document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// 序列化片段
///
/// 按文档顺序输出 `<head>` 与 `<body>` 的子节点以及它们之外的注释，
/// 不包含 `html`/`head`/`body` 标签本身。
pub fn serialize_fragment(dom: &RcDom) -> io::Result<String> {
    let mut buf: Vec<u8> = Vec::new();

    flatten_template_contents(&dom.document);
    for node in fragment_nodes(dom) {
        serialize_node(&mut buf, &node)?;
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn serialize_node(buf: &mut Vec<u8>, node: &Handle) -> io::Result<()> {
    let serializable: SerializableHandle = node.clone().into();
    serialize(
        buf,
        &serializable,
        SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        },
    )
}

/// 按给定字符集编码输出文本；未知字符集时原样返回 UTF-8 字节
pub fn encode_document(document: &str, document_encoding: &str) -> Vec<u8> {
    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let (data, _, _) = encoding.encode(document);
            return data.into_owned();
        }
    }

    document.as_bytes().to_vec()
}
