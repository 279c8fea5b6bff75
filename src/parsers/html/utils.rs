/// 独立 bundle 文档使用的空模板
pub const DOCUMENT_TEMPLATE: &str =
    "<!DOCTYPE html><html><head></head><body></body></html>";

/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// 将内容包裹在指定标签中
pub fn wrap_in_tag(tag: &str, content: &str) -> String {
    format!("<{tag}>{content}</{tag}>")
}

/// 检查是否为可用作包裹标签的名称
pub fn is_valid_tag_name(tag: &str) -> bool {
    !tag.is_empty()
        && tag.starts_with(|c: char| c.is_ascii_alphabetic())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_in_tag() {
        assert_eq!(wrap_in_tag("style", "#x{}"), "<style>#x{}</style>");
    }

    #[test]
    fn test_is_valid_tag_name() {
        assert!(is_valid_tag_name("script"));
        assert!(is_valid_tag_name("dom-module"));
        assert!(!is_valid_tag_name(""));
        assert!(!is_valid_tag_name("1h"));
        assert!(!is_valid_tag_name("a b"));
        assert!(!is_valid_tag_name("<b>"));
    }
}
