//! `nova steps` and `nova export`: work on a saved recording file.

use std::path::Path;

use anyhow::Context;

use nova_host::{build_saved_test, format_summaries, generate_steps, RecordingSnapshot, SaveOptions};

fn load(file: &Path) -> anyhow::Result<RecordingSnapshot> {
    RecordingSnapshot::load(file).with_context(|| format!("Failed to read {}", file.display()))
}

pub(crate) fn print_steps(file: &Path) -> anyhow::Result<()> {
    let snapshot = load(file)?;
    println!("{}", render_steps(&snapshot));
    Ok(())
}

pub(crate) fn print_payload(file: &Path, options: &SaveOptions) -> anyhow::Result<()> {
    let snapshot = load(file)?;
    println!("{}", render_payload(&snapshot, options)?);
    Ok(())
}

/// Steps are regenerated from the recorded events rather than trusted from
/// the file, followed by the per-tab action summaries.
fn render_steps(snapshot: &RecordingSnapshot) -> String {
    let mut out = String::new();
    for step in generate_steps(&snapshot.events) {
        out.push_str(&format!("# {}: {}\n{}\n\n", step.id, step.description, step.code));
    }
    out.push_str(&format_summaries(&snapshot.tabs));
    out
}

fn render_payload(snapshot: &RecordingSnapshot, options: &SaveOptions) -> anyhow::Result<String> {
    let steps = generate_steps(&snapshot.events);
    let payload = build_saved_test(
        &snapshot.url,
        &snapshot.events,
        &steps,
        options,
        chrono::Local::now(),
    )?;
    Ok(serde_json::to_string_pretty(&payload)?)
}
