use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use crate::utils::path::normalize_path;

use super::Host;

/// 内存中的宿主实现
///
/// 适用于文件保存在虚拟文件系统中的宿主。模块解析只认显式注册的别名
/// 和以 `./`、`../` 开头且文件存在的相对请求。
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    files: HashMap<PathBuf, String>,
    modules: HashMap<String, PathBuf>,
    unreadable: HashSet<PathBuf>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册文件
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.files
            .insert(normalize_path(path.as_ref()), content.into());
        self
    }

    /// 注册模块别名：`request` 总是解析到 `path`
    pub fn with_module(mut self, request: impl Into<String>, path: impl AsRef<Path>) -> Self {
        self.modules
            .insert(request.into(), normalize_path(path.as_ref()));
        self
    }

    /// 注册一个存在但无法读取的文件
    pub fn with_unreadable(mut self, path: impl AsRef<Path>) -> Self {
        let path = normalize_path(path.as_ref());
        self.files.entry(path.clone()).or_default();
        self.unreadable.insert(path);
        self
    }
}

impl Host for MemoryHost {
    async fn resolve_module(&self, context: &Path, request: &str) -> io::Result<PathBuf> {
        if let Some(path) = self.modules.get(request) {
            return Ok(path.clone());
        }

        if request.starts_with("./") || request.starts_with("../") {
            let candidate = normalize_path(&context.join(request));
            if self.files.contains_key(&candidate) {
                return Ok(candidate);
            }
        }

        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Can't resolve '{}' in '{}'", request, context.display()),
        ))
    }

    async fn read_file(&self, path: &Path) -> io::Result<String> {
        let path = normalize_path(path);

        if self.unreadable.contains(&path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            ));
        }

        self.files.get(&path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }

    async fn path_exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_path(path))
    }
}
