use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::Level;

use html_includer::env::{generate_env_docs, EnvConfig};
use html_includer::parsers::html::{encode_document, DOCUMENT_TEMPLATE};
use html_includer::{
    print_error_message, print_info_message, EntryRequest, Host, HtmlIncluder, IncluderError,
    IncluderOptions,
};

#[derive(Parser, Debug)]
#[command(
    name = "html-includer",
    version,
    about = "Inline HTML imports, stylesheets and scripts into a single document"
)]
struct Cli {
    /// Entry files; `file.js?script` wraps the file content in a <script> tag
    #[arg(required_unless_present = "env_help", value_name = "ENTRY")]
    entries: Vec<EntryRequest>,

    /// Index document to rewrite (default: an empty document)
    #[arg(short, long, value_name = "FILE")]
    index: Option<PathBuf>,

    /// Write the rewritten index here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Collect fragments into a separate document and reference it from the index
    #[arg(short, long, value_name = "NAME")]
    bundle: Option<String>,

    /// Directory for the bundle document (default: next to the output)
    #[arg(long, value_name = "DIR")]
    bundle_dir: Option<PathBuf>,

    /// Additional module directory (repeatable)
    #[arg(short = 'm', long = "module-dir", value_name = "DIR")]
    module_dirs: Vec<String>,

    /// Charset of input files
    #[arg(short, long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Recurse into circular imports instead of failing
    #[arg(long)]
    no_cycle_check: bool,

    /// Report failed entries and keep building
    #[arg(long)]
    ignore_errors: bool,

    /// Only log errors
    #[arg(short, long)]
    silent: bool,

    /// Print every file read during the build to stderr
    #[arg(long)]
    list_dependencies: bool,

    /// Describe the environment variables and exit
    #[arg(long)]
    env_help: bool,
}

impl Cli {
    fn options(&self, config: &EnvConfig) -> IncluderOptions {
        let mut options = IncluderOptions::from_env(config);

        for dir in &self.module_dirs {
            if !options.module_directories.contains(dir) {
                options.module_directories.push(dir.clone());
            }
        }
        if let Some(encoding) = &self.encoding {
            options.encoding = Some(encoding.clone());
        }
        if let Some(bundle) = &self.bundle {
            options.asset_file = Some(bundle.clone());
        }
        options.detect_cycles &= !self.no_cycle_check;
        options.ignore_errors |= self.ignore_errors;

        options
    }
}

fn init_logging(log_level: &str, silent: bool, no_color: bool) {
    let level = if silent {
        Level::ERROR
    } else {
        log_level.parse().unwrap_or(Level::WARN)
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(!no_color)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    if cli.env_help {
        print_info_message(&generate_env_docs());
        return;
    }

    let config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            print_error_message(&format!("Error: {}", error));
            process::exit(1);
        }
    };

    init_logging(&config.log_level, cli.silent, config.no_color);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            print_error_message(&format!("Error: {}", error));
            process::exit(1);
        }
    };

    match runtime.block_on(run(&cli, &config)) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(error) => {
            print_error_message(&format!("Error: {}", error));
            process::exit(1);
        }
    }
}

/// Runs one build; `Ok(false)` means at least one entry failed
async fn run(cli: &Cli, config: &EnvConfig) -> Result<bool, IncluderError> {
    let options = cli.options(config);
    let ignore_errors = options.ignore_errors;
    let includer = HtmlIncluder::new(options)?;

    let mut succeeded = true;
    let results = includer.include_all(&cli.entries).await;
    for (entry, result) in cli.entries.iter().zip(results) {
        if let Err(error) = result {
            if ignore_errors {
                tracing::warn!("Ignoring failed entry {}: {}", entry.path.display(), error);
            } else {
                print_error_message(&format!("Error: {}: {}", entry.path.display(), error));
                succeeded = false;
            }
        }
    }

    if !succeeded {
        return Ok(false);
    }

    let index_document = match &cli.index {
        Some(index) => includer
            .host()
            .read_file(index)
            .await
            .map_err(|source| IncluderError::Read {
                path: index.clone(),
                source,
            })?,
        None => DOCUMENT_TEMPLATE.to_string(),
    };

    let encoding = includer.host().encoding().name();
    let output = includer.process_index(&index_document)?;
    write_output(cli.output.as_deref(), &encode_document(&output, encoding))?;
    if let Some(path) = &cli.output {
        if !cli.silent {
            print_info_message(&format!("Wrote {}", path.display()));
        }
    }

    if let (Some(bundle), Some(bundle_name)) =
        (includer.bundle_document()?, &includer.options().asset_file)
    {
        let bundle_dir = match (&cli.bundle_dir, &cli.output) {
            (Some(dir), _) => dir.clone(),
            (None, Some(output)) => output
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            (None, None) => PathBuf::from("."),
        };
        let bundle_path = bundle_dir.join(bundle_name);
        fs::create_dir_all(&bundle_dir)?;
        fs::write(&bundle_path, encode_document(&bundle, encoding))?;
        tracing::info!("Wrote bundle to {}", bundle_path.display());
    }

    if cli.list_dependencies {
        for dependency in includer.dependencies() {
            eprintln!("{}", dependency.display());
        }
    }

    Ok(true)
}

fn write_output(destination: Option<&Path>, data: &[u8]) -> io::Result<()> {
    match destination {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, data)
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.write_all(b"\n")?;
            stdout.flush()
        }
    }
}
