//! Detect command implementation.

use std::fs;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use uac::platform::ScriptSourceProbe;
use uac::{Document, FeatureSnapshot, detect};

use super::args::DetectArgs;

/// Execute detect command
pub fn run_detect(args: &DetectArgs) -> Result<()> {
    let html = fs::read_to_string(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    let doc = Document::parse(&html);
    let snapshot = detect(&doc, doc.root(), &ScriptSourceProbe);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render(&snapshot));
    }
    Ok(())
}

/// Human-readable report: flags first, then counts.
fn render(snapshot: &FeatureSnapshot) -> String {
    let mut out = String::new();
    for (name, on) in snapshot.flags() {
        let mark = if on {
            "✓".green().to_string()
        } else {
            "·".dimmed().to_string()
        };
        out.push_str(&format!("{mark} {name}\n"));
    }

    let counts = [
        ("images", snapshot.image_count),
        ("videos", snapshot.video_count),
        ("forms", snapshot.form_count),
        ("buttons", snapshot.button_count),
        ("tables", snapshot.table_count),
        ("lists", snapshot.list_count),
        ("headings", snapshot.heading_count),
    ];
    out.push('\n');
    for (name, count) in counts {
        out.push_str(&format!("{:>9} {}\n", name.bold(), count));
    }
    out.push_str(&format!(
        "\n{} of {} features detected\n",
        snapshot.detected(),
        snapshot.flags().len()
    ));
    out
}
