//! Enhance command implementation.
//!
//! Every page gets its own engine; pages are processed in parallel and share
//! one state file for the dark-mode decision.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use uac::logger::ProgressLine;
use uac::platform::{FixedClock, FileStorage};
use uac::config::cfg;
use uac::{Document, Engine, Environment, Options, is_manual, log};

use super::args::EnhanceArgs;
use super::common::{HtmlFile, collect_html_files, plural_count};

/// What happened to one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Processed {
    Enhanced(String),
    /// The page opted out; its original markup is passed through.
    Skipped(String),
}

impl Processed {
    fn html(&self) -> &str {
        match self {
            Self::Enhanced(html) | Self::Skipped(html) => html,
        }
    }
}

/// Execute enhance command with the options installed by `init_config`.
pub fn run_enhance(args: &EnhanceArgs) -> Result<()> {
    let files = collect_html_files(&args.paths)?;
    if files.is_empty() {
        bail!("no HTML files found");
    }
    let state = args.state.clone().unwrap_or_else(FileStorage::default_path);
    let storage = FileStorage::open(&state)
        .with_context(|| format!("failed to open state file {}", state.display()))?;

    match &args.output {
        None if files.len() == 1 => {
            let processed = enhance_file(&files[0].source, &cfg(), args, &storage)?;
            let mut out = io::stdout().lock();
            out.write_all(processed.html().as_bytes())?;
            out.flush()?;
            Ok(())
        }
        None => bail!(
            "{} given, use --output to choose a directory",
            plural_count(files.len(), "file")
        ),
        Some(output) => enhance_into(&files, output, args, &storage),
    }
}

/// Enhance many pages into `output`, keeping their relative layout.
fn enhance_into(
    files: &[HtmlFile],
    output: &Path,
    args: &EnhanceArgs,
    storage: &FileStorage,
) -> Result<()> {
    let progress = ProgressLine::new("enhance", &[("pages", files.len())]);

    let results: Vec<Result<bool>> = files
        .par_iter()
        .map(|file| {
            let processed = enhance_file(&file.source, &cfg(), args, storage)?;
            let target = output.join(&file.relative);
            write_output(&target, processed.html())?;
            progress.inc("pages");
            Ok(matches!(processed, Processed::Skipped(_)))
        })
        .collect();
    progress.finish();

    let mut skipped = 0;
    let mut failed = 0;
    for result in results {
        match result {
            Ok(true) => skipped += 1,
            Ok(false) => {}
            Err(e) => {
                log!("error"; "{:#}", e);
                failed += 1;
            }
        }
    }

    log!(
        "enhance";
        "{} written to {}",
        plural_count(files.len() - failed, "page"),
        output.display()
    );
    if skipped > 0 {
        log!("enhance"; "{} opted out and copied unchanged", plural_count(skipped, "page"));
    }
    if failed > 0 {
        bail!("{} failed", plural_count(failed, "page"));
    }
    Ok(())
}

/// Read, enhance and render one page.
pub fn enhance_file(
    source: &Path,
    options: &Options,
    args: &EnhanceArgs,
    storage: &FileStorage,
) -> Result<Processed> {
    let html = fs::read_to_string(source)
        .with_context(|| format!("failed to read {}", source.display()))?;
    let doc = Document::parse(&html);
    if is_manual(&doc) && !args.force {
        return Ok(Processed::Skipped(html));
    }

    let mut engine = Engine::new(options.clone(), doc, environment(args, storage));
    engine.init();
    if !engine.is_initialized() {
        bail!("failed to enhance {}", source.display());
    }
    Ok(Processed::Enhanced(engine.into_document().to_html()))
}

fn environment(args: &EnhanceArgs, storage: &FileStorage) -> Environment {
    let env = Environment::default()
        .with_viewport(args.width, args.height)
        .with_prefers_dark(args.prefers_dark)
        .with_reduced_motion(args.reduced_motion)
        .with_storage(storage.clone());
    match args.hour {
        Some(hour) => env.with_clock(FixedClock::at_hour(hour)),
        None => env,
    }
}

fn write_output(target: &Path, html: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(target, html).with_context(|| format!("failed to write {}", target.display()))
}
