use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use futures::future::join_all;
use thiserror::Error;

use crate::aggregator::FragmentAggregator;
use crate::env::{EnvConfig, EnvVar};
use crate::host::{FsHost, Host};
use crate::parsers::html::{is_valid_tag_name, wrap_in_tag, WHITESPACES};
use crate::resolver::DependencyResolver;
use crate::utils::path::{normalize_path, resolution_context};

/// Represents errors that can occur while including HTML dependencies
#[derive(Error, Debug)]
pub enum IncluderError {
    /// Neither module resolution nor the literal path found the file.
    /// `source` is the error of the module resolution attempt.
    #[error("unable to resolve '{request}' from {}: {source}", .context.display())]
    PathResolution {
        request: String,
        context: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("import cycle detected: {}", format_chain(.chain))]
    ImportCycle { chain: Vec<PathBuf> },

    #[error("invalid entry \"{0}\"")]
    InvalidEntry(String),

    #[error("unknown encoding \"{0}\"")]
    UnknownEncoding(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Configuration options for one build
#[derive(Clone, Debug)]
pub struct IncluderOptions {
    /// Bundle mode: collected fragments go to a standalone document with this
    /// name and the index only references it
    pub asset_file: Option<String>,
    pub detect_cycles: bool,
    pub encoding: Option<String>,
    pub ignore_errors: bool,
    pub module_directories: Vec<String>,
}

impl Default for IncluderOptions {
    fn default() -> Self {
        Self {
            asset_file: None,
            detect_cycles: true,
            encoding: None,
            ignore_errors: false,
            module_directories: vec![crate::host::filesystem::DEFAULT_MODULE_DIRECTORY.to_string()],
        }
    }
}

impl IncluderOptions {
    pub fn from_env(config: &EnvConfig) -> Self {
        Self {
            asset_file: config.asset_file.clone(),
            detect_cycles: config.detect_cycles,
            encoding: Some(config.encoding.clone()),
            ignore_errors: config.ignore_errors,
            module_directories: config.module_directories.clone(),
        }
    }

    pub fn is_bundle_mode(&self) -> bool {
        self.asset_file.is_some()
    }
}

/// One entry of a build: a file, optionally wrapped in a tag before resolution
///
/// The textual form is `path/to/file.js?script`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryRequest {
    pub path: PathBuf,
    pub wrap: Option<String>,
}

impl EntryRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            wrap: None,
        }
    }

    pub fn wrapped(path: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            wrap: Some(tag.into()),
        }
    }

    pub fn parse(value: &str) -> Result<Self, IncluderError> {
        let value = value.trim_matches(WHITESPACES);
        let (path, wrap) = match value.split_once('?') {
            Some((path, tag)) => (path, Some(tag)),
            None => (value, None),
        };

        if path.is_empty() {
            return Err(IncluderError::InvalidEntry(value.to_string()));
        }

        match wrap {
            Some(tag) if !is_valid_tag_name(tag) => Err(IncluderError::InvalidEntry(value.to_string())),
            Some(tag) => Ok(Self::wrapped(path, tag)),
            None => Ok(Self::new(path)),
        }
    }
}

impl FromStr for EntryRequest {
    type Err = IncluderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// One build: owns the host, the fragment aggregator and the tracked dependencies
///
/// Every entry included through the same `HtmlIncluder` shares one aggregator,
/// so a fragment reached from several entries ends up in the output once.
pub struct HtmlIncluder<H = FsHost> {
    host: H,
    options: IncluderOptions,
    aggregator: FragmentAggregator,
    dependencies: Mutex<BTreeSet<PathBuf>>,
}

impl HtmlIncluder<FsHost> {
    pub fn new(options: IncluderOptions) -> Result<Self, IncluderError> {
        let host = FsHost::from_options(&options)?;
        Ok(Self::with_host(host, options))
    }
}

impl<H: Host> HtmlIncluder<H> {
    pub fn with_host(host: H, options: IncluderOptions) -> Self {
        Self {
            host,
            options,
            aggregator: FragmentAggregator::new(),
            dependencies: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn options(&self) -> &IncluderOptions {
        &self.options
    }

    pub fn aggregator(&self) -> &FragmentAggregator {
        &self.aggregator
    }

    /// Every path read during this build, sorted
    pub fn dependencies(&self) -> Vec<PathBuf> {
        self.dependencies
            .lock()
            .map(|dependencies| dependencies.iter().cloned().collect())
            .unwrap_or_else(|poisoned| poisoned.into_inner().iter().cloned().collect())
    }

    fn track_dependency(&self, path: &Path) {
        let mut dependencies = self
            .dependencies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        dependencies.insert(path.to_path_buf());
    }

    /// Resolves `source` and adds the rewritten fragment to the aggregator
    pub async fn include_source(
        &self,
        source: &str,
        context: &Path,
        wrap: Option<&str>,
    ) -> Result<String, IncluderError> {
        self.include(source, context, None, wrap).await
    }

    /// Reads `path` through the host, then behaves like [`Self::include_source`]
    pub async fn include_file(&self, path: &Path, wrap: Option<&str>) -> Result<String, IncluderError> {
        let path = if path.is_relative() {
            normalize_path(&std::env::current_dir()?.join(path))
        } else {
            normalize_path(path)
        };

        let source = self
            .host
            .read_file(&path)
            .await
            .map_err(|source| IncluderError::Read {
                path: path.clone(),
                source,
            })?;
        self.track_dependency(&path);

        self.include(&source, &resolution_context(&path), Some(&path), wrap)
            .await
    }

    pub async fn include_entry(&self, entry: &EntryRequest) -> Result<String, IncluderError> {
        self.include_file(&entry.path, entry.wrap.as_deref()).await
    }

    /// Includes all entries concurrently; one result per entry, in entry order
    pub async fn include_all(&self, entries: &[EntryRequest]) -> Vec<Result<String, IncluderError>> {
        join_all(entries.iter().map(|entry| self.include_entry(entry))).await
    }

    async fn include(
        &self,
        source: &str,
        context: &Path,
        origin: Option<&Path>,
        wrap: Option<&str>,
    ) -> Result<String, IncluderError> {
        let source = match wrap {
            Some(tag) if !is_valid_tag_name(tag) => {
                return Err(IncluderError::InvalidEntry(format!("?{tag}")));
            }
            Some(tag) => wrap_in_tag(tag, source),
            None => source.to_string(),
        };

        let emit = |fragment: String| {
            self.aggregator.add_fragment(fragment);
        };
        let track = |path: &Path| self.track_dependency(path);
        let resolver = DependencyResolver::new(&self.host, &emit, &track)
            .detect_cycles(self.options.detect_cycles);

        let resolved = match origin {
            Some(origin) => resolver.resolve_file_content(&source, origin).await?,
            None => resolver.resolve(&source, context).await?,
        };

        self.aggregator.add_fragment(resolved.clone());
        tracing::info!(
            "Included {} ({} fragments collected)",
            origin.unwrap_or(context).display(),
            self.aggregator.len()
        );

        Ok(resolved)
    }

    /// Inline mode: appends every collected fragment to the index body.
    /// Bundle mode: appends `<link rel="import">` pointing at the asset file.
    pub fn process_index(&self, index_document: &str) -> Result<String, IncluderError> {
        let output = match &self.options.asset_file {
            Some(asset_file) => self.aggregator.reference(index_document, asset_file)?,
            None => self.aggregator.finalize(index_document)?,
        };
        Ok(output)
    }

    /// The standalone bundle document; `None` in inline mode
    pub fn bundle_document(&self) -> Result<Option<String>, IncluderError> {
        if self.options.is_bundle_mode() {
            Ok(Some(self.aggregator.bundle_document()?))
        } else {
            Ok(None)
        }
    }
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    if crate::env::core::NoColor::get_or_default(false) {
        eprintln!("{msg}");
    } else {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    }
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}
