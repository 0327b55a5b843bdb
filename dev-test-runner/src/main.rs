//! Golden-file runner: renders every `fixtures/*.json` API document and diffs
//! it against the sibling `.d.ts`.
//!
//! An optional `<name>.overrides.json` next to a fixture is loaded as its
//! override table. `--bless` rewrites the expected files instead of diffing.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use chrome_tsd::config::OverrideTable;
use chrome_tsd::overrides::{NoOverrides, RenderOverride};
use chrome_tsd::path_de;
use chrome_tsd::render::RenderContext;
use chrome_tsd::rewrite::RefRewriter;
use chrome_tsd::schema::ApiDocument;
use chrome_tsd::tsd;
use clap::Parser;
use colored::Colorize;

#[derive(Parser, Debug)]
struct Settings {
    /// fixture directory (defaults to this crate's `fixtures/`)
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// overwrite expected output with the current rendering
    #[arg(long)]
    bless: bool,
}

const OVERRIDES_SUFFIX: &str = ".overrides.json";

fn render_fixture(path: &Path) -> anyhow::Result<String> {
    let source = std::fs::read_to_string(path)?;
    let doc: ApiDocument = path_de::from_str_with_path(&source)?;

    let overrides_path = path.with_extension("overrides.json");
    let table = if overrides_path.exists() {
        let source = std::fs::read_to_string(&overrides_path)?;
        Some(OverrideTable::from_json(&source)?)
    } else {
        None
    };
    let overrides: &dyn RenderOverride = match &table {
        Some(table) => table,
        None => &NoOverrides,
    };

    let rewriter = RefRewriter::new(&doc);
    let cx = RenderContext::new(overrides, &rewriter);
    Ok(format!("{}\n", tsd::render_api(&doc, &cx)?))
}

fn run(settings: &Settings) -> anyhow::Result<bool> {
    let dir = settings.fixtures.clone()
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures"));
    let pattern = dir.join("*.json");
    let pattern = pattern.to_string_lossy();

    let mut passed = 0usize;
    let mut failed = 0usize;
    for entry in glob::glob(&pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
        let path = entry?;
        if path.to_string_lossy().ends_with(OVERRIDES_SUFFIX) {
            continue;
        }
        let name = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let expected_path = path.with_extension("d.ts");

        let actual = match render_fixture(&path) {
            Ok(actual) => actual,
            Err(error) => {
                eprintln!("{} {name}: {error:#}", "✗".red().bold());
                failed += 1;
                continue;
            }
        };

        if settings.bless {
            std::fs::write(&expected_path, &actual)
                .with_context(|| format!("failed to write {}", expected_path.display()))?;
            eprintln!("{} {name}", "blessed".cyan());
            passed += 1;
            continue;
        }

        let expected = std::fs::read_to_string(&expected_path).unwrap_or_default();
        if expected == actual {
            eprintln!("{} {name}", "✓".green().bold());
            passed += 1;
        } else {
            eprintln!("{} {name}: output differs from {}", "✗".red().bold(), expected_path.display());
            for (line_no, (want, got)) in expected.lines().zip(actual.lines()).enumerate() {
                if want != got {
                    eprintln!("  first difference at line {}", line_no + 1);
                    eprintln!("  {} {want}", "-".red());
                    eprintln!("  {} {got}", "+".green());
                    break;
                }
            }
            failed += 1;
        }
    }

    eprintln!("{passed} passed, {failed} failed");
    Ok(failed == 0)
}

fn main() -> ExitCode {
    let settings = Settings::parse();
    match run(&settings) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
