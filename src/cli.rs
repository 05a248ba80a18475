//! Minimal CLI: protoc plugin (default) or `convert` over descriptor sets.
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use prost::Message;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Options;
use crate::file::Document;
use crate::plugin;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate JSON Schema (draft-04) documents from protobuf descriptors
///
/// With no subcommand this runs as a protoc plugin: a CodeGeneratorRequest on
/// stdin, a CodeGeneratorResponse on stdout.
#[derive(Parser, Debug)]
#[command(name = "protoc-gen-jsonschema")]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Option<Command>,

    #[command(flatten)]
    flags: PolicyFlags,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// convert binary FileDescriptorSet files (protoc --descriptor_set_out --include_imports)
    Convert(ConvertSettings),
}

#[derive(Args, Debug, Clone, Copy, Default)]
struct PolicyFlags {
    /// allow null values in every scalar, object and array
    #[arg(long, global = true)]
    allow_null_values: bool,

    /// enums are strings only
    #[arg(long, global = true)]
    disallow_enum_one_of: bool,

    /// never emit oneOf (conflicts with --allow-null-values)
    #[arg(long, global = true)]
    disallow_one_of: bool,

    /// objects reject properties they don't declare
    #[arg(long, global = true)]
    disallow_additional_properties: bool,

    /// 64-bit integers are integers only, never strings
    #[arg(long, global = true)]
    disallow_bigints_as_strings: bool,

    /// debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Args, Debug)]
struct ConvertSettings {
    /// One or more descriptor set files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// proto file names to generate (e.g. `foo/bar.proto`); all files in the sets when omitted
    #[arg(long, short)]
    file: Vec<String>,

    /// output directory (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl From<PolicyFlags> for Options {
    fn from(flags: PolicyFlags) -> Self {
        Options {
            allow_null_values: flags.allow_null_values,
            disallow_enum_one_of: flags.disallow_enum_one_of,
            disallow_one_of: flags.disallow_one_of,
            disallow_additional_properties: flags.disallow_additional_properties,
            disallow_bigints_as_strings: flags.disallow_bigints_as_strings,
            debug: flags.debug,
        }
    }
}

impl ConvertSettings {
    /// All files of all input sets, first occurrence of each name wins.
    fn load_forest(&self) -> anyhow::Result<Vec<FileDescriptorProto>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut seen = HashSet::new();
        let mut forest = Vec::new();
        for source_path in source_paths {
            let bytes = std::fs::read(&source_path)
                .with_context(|| format!("failed to read descriptor set {}", source_path.display()))?;
            let set = FileDescriptorSet::decode(bytes.as_slice())
                .with_context(|| format!("failed to decode descriptor set {}", source_path.display()))?;
            debug!(path = %source_path.display(), files = set.file.len(), "loaded descriptor set");
            for file in set.file {
                if seen.insert(file.name().to_string()) {
                    forest.push(file);
                }
            }
        }
        Ok(forest)
    }

    fn run(&self, options: Options) -> anyhow::Result<()> {
        let config = options.resolve()?;
        let forest = self.load_forest()?;
        let targets: Vec<String> = if self.file.is_empty() {
            forest.iter().map(|file| file.name().to_string()).collect()
        } else {
            self.file.clone()
        };
        info!(files = forest.len(), targets = targets.len(), "converting descriptor sets");

        let documents = crate::session::generate(&forest, &targets, config)?;
        match self.out.as_ref() {
            Some(out) => write_documents(out, &documents)?,
            None => {
                let mut stdout = std::io::stdout().lock();
                for document in &documents {
                    writeln!(stdout, "{}", document.content)?;
                }
            }
        }
        for document in &documents {
            eprintln!("{} {}", "generated".green().bold(), document.name);
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        let options = Options::from(self.flags);
        match &self.cmd {
            Some(Command::Convert(target)) => {
                init_logging(options.debug);
                target.run(options)
            }
            None => run_plugin(options),
        }
    }
}

/// stdin -> stdout. The parameter can switch on `debug`, so logging starts
/// only once the request is read.
fn run_plugin(options: Options) -> anyhow::Result<()> {
    serve_plugin(options, std::io::stdin().lock(), std::io::stdout().lock())
}

/// Always writes a response, including when the request can't be read.
fn serve_plugin(options: Options, input: impl Read, mut output: impl Write) -> anyhow::Result<()> {
    let request = match plugin::read_request(input) {
        Ok(request) => request,
        Err(error) => {
            init_logging(options.debug);
            error!(%error, "failed to read code generator request");
            let response = plugin::error_response(format!("Failed to read input: {error}"));
            plugin::write_response(&mut output, &response)?;
            return Err(error.into());
        }
    };
    let options = plugin::request_options(&request, options);
    init_logging(options.debug);

    let response = plugin::respond(&request, options);
    plugin::write_response(&mut output, &response)?;
    if let Some(error) = response.error {
        bail!(error);
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// `RUST_LOG` wins over the `debug` option.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn write_documents(out: &Path, documents: &[Document]) -> anyhow::Result<()> {
    std::fs::create_dir_all(out).with_context(|| format!("failed to create {}", out.display()))?;
    for document in documents {
        let path = out.join(&document.name);
        std::fs::write(&path, &document.content).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
