//! CLI: render | list
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, info};

use chrome_tsd::config::OverrideTable;
use chrome_tsd::overrides::{NoOverrides, RenderOverride};
use chrome_tsd::path_de;
use chrome_tsd::render::RenderContext;
use chrome_tsd::rewrite::RefRewriter;
use chrome_tsd::schema::ApiDocument;
use chrome_tsd::tsd;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate TypeScript declarations for the Chrome extension APIs from processed API JSON
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// debug-level logging (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// render the full .d.ts file
    Render(RenderOut),
    /// print each namespace with its visible type/property/function counts
    List(ListOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths, quoted glob patterns or '-' for stdin.
    /// Namespaces from all inputs are merged; a namespace may only appear once.
    #[arg(long, short, num_args = 1.., default_value = "-")]
    input: Vec<String>,

    /// JSON override table (hidden ids, type replacements, templates, any-narrowing)
    #[arg(long)]
    overrides: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct RenderOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .d.ts file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// replacement for the built-in preamble
    #[arg(long)]
    preamble: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ListOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_document(&self) -> anyhow::Result<ApiDocument> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut merged = ApiDocument::default();
        for source_path in source_paths {
            let source = read_source(&source_path)?;
            let doc: ApiDocument = path_de::from_str_with_path(&source)
                .with_context(|| format!("failed to decode API document ({})", source_path.display()))?;
            debug!(source = %source_path.display(), namespaces = doc.api.len(), "loaded input");
            for (key, namespace) in doc.api {
                if merged.api.contains_key(&key) {
                    bail!("namespace `{key}` is defined by more than one input ({})", source_path.display());
                }
                merged.api.insert(key, namespace);
            }
        }
        Ok(merged)
    }

    fn load_overrides(&self) -> anyhow::Result<Option<OverrideTable>> {
        let Some(path) = self.overrides.as_ref() else { return Ok(None) };
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read override table ({})", path.display()))?;
        let table = OverrideTable::from_json(&source)
            .with_context(|| format!("failed to decode override table ({})", path.display()))?;
        debug!(
            hidden = table.hidden.len(),
            types = table.types.len(),
            templates = table.templates.len(),
            replace_any = table.replace_any.len(),
            "loaded override table"
        );
        Ok(Some(table))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn verbose(&self) -> bool {
        self.verbose
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Render(target) => {
                let doc = target.input_settings.load_document()?;
                let table = target.input_settings.load_overrides()?;
                let overrides: &dyn RenderOverride = match &table {
                    Some(table) => table,
                    None => &NoOverrides,
                };
                let rewriter = RefRewriter::new(&doc);
                let cx = RenderContext::new(overrides, &rewriter);

                let preamble = match target.preamble.as_ref() {
                    Some(path) => std::fs::read_to_string(path)
                        .with_context(|| format!("failed to read preamble ({})", path.display()))?,
                    None => tsd::PREAMBLE.to_string(),
                };

                let output = tsd::generate(&doc, &cx, &preamble, Utc::now())
                    .context("failed to render declarations")?;

                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("failed to create {}", parent.display()))?;
                    }
                    std::fs::write(out, &output)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    info!(out = %out.display(), namespaces = doc.api.len(), bytes = output.len(), "wrote declarations");
                } else {
                    print!("{output}");
                }
                Ok(())
            }
            Command::List(target) => {
                let doc = target.input_settings.load_document()?;
                let table = target.input_settings.load_overrides()?;
                let overrides: &dyn RenderOverride = match &table {
                    Some(table) => table,
                    None => &NoOverrides,
                };
                let rewriter = RefRewriter::new(&doc);
                let cx = RenderContext::new(overrides, &rewriter);

                let summaries = tsd::summarize(&doc, &cx);
                let width = summaries.iter().map(|s| s.name.len()).max().unwrap_or(0);
                for summary in summaries {
                    let counts = format!(
                        "{} types, {} properties, {} functions",
                        summary.types, summary.properties, summary.functions,
                    );
                    let name = format!("{:<width$}", summary.name);
                    if summary.hidden {
                        println!("{}  {}", name.dimmed(), "(hidden)".dimmed());
                    } else if summary.is_empty() {
                        println!("{}  {}", name, "(empty)".yellow());
                    } else {
                        println!("{}  {counts}", name.bold());
                    }
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_source(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source).context("failed to read stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read source file ({})", path.display()))
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
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                // an explicit glob that matches nothing is an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
