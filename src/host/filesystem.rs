use std::io;
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};

use crate::core::{IncluderError, IncluderOptions};
use crate::utils::path::normalize_path;

use super::Host;

/// 默认的模块目录
pub const DEFAULT_MODULE_DIRECTORY: &str = "node_modules";

/// 基于本地文件系统的宿主实现
///
/// 模块解析规则：
///
/// - 开头的 `~` 表示"按模块解析"，会被去掉
/// - 以 `./`、`../` 开头或绝对路径的请求相对于上下文目录解析，文件必须存在
/// - 其余（裸模块名）在上下文目录及其所有祖先目录下的每个模块目录中查找
#[derive(Clone, Debug)]
pub struct FsHost {
    module_directories: Vec<String>,
    encoding: &'static Encoding,
}

impl Default for FsHost {
    fn default() -> Self {
        Self {
            module_directories: vec![DEFAULT_MODULE_DIRECTORY.to_string()],
            encoding: UTF_8,
        }
    }
}

impl FsHost {
    pub fn new(module_directories: Vec<String>, encoding: &'static Encoding) -> Self {
        Self {
            module_directories,
            encoding,
        }
    }

    pub fn from_options(options: &IncluderOptions) -> Result<Self, IncluderError> {
        let encoding = match options.encoding.as_deref() {
            Some(label) => Encoding::for_label_no_replacement(label.as_bytes())
                .ok_or_else(|| IncluderError::UnknownEncoding(label.to_string()))?,
            None => UTF_8,
        };

        let module_directories = if options.module_directories.is_empty() {
            vec![DEFAULT_MODULE_DIRECTORY.to_string()]
        } else {
            options.module_directories.clone()
        };

        Ok(Self::new(module_directories, encoding))
    }

    pub fn module_directories(&self) -> &[String] {
        &self.module_directories
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }
}

fn is_relative_request(request: &str) -> bool {
    request == "."
        || request == ".."
        || request.starts_with("./")
        || request.starts_with("../")
}

fn unresolved(request: &str, context: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("Can't resolve '{}' in '{}'", request, context.display()),
    )
}

impl Host for FsHost {
    async fn resolve_module(&self, context: &Path, request: &str) -> io::Result<PathBuf> {
        let original_request = request;
        let request = request.trim();
        let request = request.strip_prefix('~').unwrap_or(request);

        if request.is_empty() {
            return Err(unresolved(original_request, context));
        }

        if is_relative_request(request) || Path::new(request).is_absolute() {
            let candidate = normalize_path(&context.join(request));
            if self.path_exists(&candidate).await {
                return Ok(candidate);
            }
            return Err(unresolved(original_request, context));
        }

        for directory in context.ancestors() {
            for module_directory in &self.module_directories {
                let candidate = normalize_path(&directory.join(module_directory).join(request));
                if self.path_exists(&candidate).await {
                    tracing::trace!(
                        "Resolved module '{}' to {}",
                        original_request,
                        candidate.display()
                    );
                    return Ok(candidate);
                }
            }
        }

        Err(unresolved(original_request, context))
    }

    async fn read_file(&self, path: &Path) -> io::Result<String> {
        let data = tokio::fs::read(path).await?;
        let (content, _, _) = self.encoding.decode(&data);
        Ok(content.into_owned())
    }

    async fn path_exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_resolves_relative_request() {
        let root = tempfile::tempdir().unwrap();
        let expected = write(root.path(), "src/a.html", "");
        let host = FsHost::default();

        let resolved = host
            .resolve_module(&root.path().join("src/test"), "../a.html")
            .await
            .unwrap();

        assert_eq!(resolved, normalize_path(&expected));
    }

    #[tokio::test]
    async fn test_resolves_bare_request_from_ancestor_node_modules() {
        let root = tempfile::tempdir().unwrap();
        let expected = write(root.path(), "node_modules/widget/widget.html", "");
        let host = FsHost::default();

        let resolved = host
            .resolve_module(&root.path().join("src/deep/er"), "widget/widget.html")
            .await
            .unwrap();

        assert_eq!(resolved, normalize_path(&expected));
    }

    #[tokio::test]
    async fn test_tilde_prefix_is_module_request() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "node_modules/theme/main.css", "");
        let host = FsHost::default();

        assert!(host
            .resolve_module(root.path(), "~theme/main.css")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_bare_request_is_not_resolved_relative_to_context() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "a.html", "");
        let host = FsHost::default();

        let error = host.resolve_module(root.path(), "a.html").await.unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
        assert!(host.path_exists(&root.path().join("a.html")).await);
    }

    #[tokio::test]
    async fn test_custom_module_directories() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "bower_components/lib/lib.html", "");
        let host = FsHost::new(vec!["bower_components".to_string()], UTF_8);

        assert!(host
            .resolve_module(root.path(), "lib/lib.html")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_path_exists_rejects_directories() {
        let root = tempfile::tempdir().unwrap();
        let host = FsHost::default();
        assert!(!host.path_exists(root.path()).await);
    }

    #[tokio::test]
    async fn test_read_file_decodes_configured_encoding() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("latin1.html");
        fs::write(&path, [b'<', b'p', b'>', 0xE9, b'<', b'/', b'p', b'>']).unwrap();
        let host = FsHost::new(
            vec![DEFAULT_MODULE_DIRECTORY.to_string()],
            Encoding::for_label(b"iso-8859-1").unwrap(),
        );

        assert_eq!(host.read_file(&path).await.unwrap(), "<p>é</p>");
    }

    #[test]
    fn test_from_options_rejects_unknown_encoding() {
        let options = IncluderOptions {
            encoding: Some("utf-42".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            FsHost::from_options(&options),
            Err(IncluderError::UnknownEncoding(_))
        ));
    }
}
