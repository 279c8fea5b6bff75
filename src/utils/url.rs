use std::sync::LazyLock;

use regex::Regex;

// scheme://host, //host, www.host, user@host:path, user@host/path
//
// user@host 形式要求主机名以字母开头、至少含一个点，并且后面紧跟 `:` 或 `/`；
// 因此 `icon@2x.css`、`lib@1.2.0.html` 这类本地文件名不算远程引用。
static REMOTE_REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[a-zA-Z][a-zA-Z0-9+.\-]*://[^\s/?#]+|//[^\s/?#]+|www\.[^\s/?#]+|[^\s@/:]+@[a-zA-Z][a-zA-Z0-9\-]*(?:\.[a-zA-Z0-9\-]+)+[:/])",
    )
    .unwrap()
});

/// 判断引用值是否指向远程资源
///
/// 远程引用不会被解析、内联或追踪，原样保留在输出中。
pub fn is_remote_reference(value: &str) -> bool {
    REMOTE_REFERENCE_RE.is_match(value.trim())
}
