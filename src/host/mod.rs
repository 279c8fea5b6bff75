//! # 宿主能力模块
//!
//! 解析器本身不直接访问文件系统，而是通过 [`Host`] 使用宿主提供的三种能力：
//!
//! - `resolve_module` - 模块风格的路径解析（例如 `node_modules` 查找）
//! - `read_file` - 读取文件文本内容
//! - `path_exists` - 仅在模块解析失败时作为回退检查
//!
//! # 模块组织
//!
//! - `filesystem` - 基于 tokio 文件系统的默认实现 [`FsHost`]
//! - `memory` - 内存中的实现 [`MemoryHost`]，用于虚拟文件系统

pub mod filesystem;
pub mod memory;

use std::io;
use std::path::{Path, PathBuf};

pub use filesystem::FsHost;
pub use memory::MemoryHost;

/// 解析器所需的宿主能力
///
/// 解析在单线程协作式调度上运行（DOM 基于 `Rc`），因此返回的 future 不要求 `Send`。
#[allow(async_fn_in_trait)]
pub trait Host {
    /// 以模块规则解析 `request`，返回绝对路径
    async fn resolve_module(&self, context: &Path, request: &str) -> io::Result<PathBuf>;

    /// 读取文件的文本内容
    async fn read_file(&self, path: &Path) -> io::Result<String>;

    /// 路径是否指向一个存在的文件
    async fn path_exists(&self, path: &Path) -> bool;
}

