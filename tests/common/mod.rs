// 集成测试公共模块
//
// 提供临时目录夹具、标准站点夹具以及记录 emit/track 回调的工具

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// 临时目录夹具
#[allow(dead_code)]
pub struct Fixture {
    dir: TempDir,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// 写入文件，自动创建父目录
    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture directory");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("failed to read fixture file")
    }
}

/// 标准站点夹具
///
/// ```text
/// src/test/includefile.html   导入 includefile2.html，引用样式表和脚本
/// src/test/includefile2.html
/// src/test/includestyle.css
/// src/test/includescript2.js
/// src/test/test.html          再次导入 includefile.html
/// src/test/urls.html          只包含远程引用
/// src/foo.js
/// ```
#[allow(dead_code)]
pub fn site_fixture() -> Fixture {
    let fixture = Fixture::new();

    fixture.write(
        "src/test/includefile.html",
        r#"<link rel="import" href="includefile2.html"><link rel="stylesheet" href="includestyle.css"><script src="includescript2.js"></script><div>From includefile.html</div>"#,
    );
    fixture.write("src/test/includefile2.html", "<p>From includefile2.html</p>");
    fixture.write("src/test/includestyle.css", "#from-includestylecss {color: green;}");
    fixture.write("src/test/includescript2.js", "console.log('From includescript2.js');");
    fixture.write(
        "src/test/test.html",
        r#"<link rel="import" href="./includefile.html">"#,
    );
    fixture.write(
        "src/test/urls.html",
        r#"<link rel="import" href="https://example.com/remote.html"><script src="//cdn.example.com/lib.js"></script><div>From urls.html</div>"#,
    );
    fixture.write("src/foo.js", r#"console.log("From includescript.js");"#);

    fixture
}

/// 记录解析器回调
#[allow(dead_code)]
#[derive(Default)]
pub struct Recorder {
    pub emitted: RefCell<Vec<String>>,
    pub tracked: RefCell<Vec<PathBuf>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, fragment: String) {
        self.emitted.borrow_mut().push(fragment);
    }

    pub fn track(&self, path: &Path) {
        self.tracked.borrow_mut().push(path.to_path_buf());
    }

    pub fn emitted(&self) -> Vec<String> {
        self.emitted.borrow().clone()
    }

    pub fn tracked(&self) -> Vec<PathBuf> {
        self.tracked.borrow().clone()
    }
}

/// 子串出现次数
#[allow(dead_code)]
pub fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
