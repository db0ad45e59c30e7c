//! Timeline outline command.

use recital::{DurationManifest, PlaybackConfig, ProgressModel, RecitalResult, Script};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

/// Prints each line with its estimated start time.
pub fn outline(
    config: &PlaybackConfig,
    script_path: &Path,
    manifest_path: Option<&Path>,
    rate: f32,
    as_json: bool,
) -> RecitalResult<()> {
    let script = Script::from_file(script_path)?;
    script.validate()?;
    let manifest = manifest_path.map(DurationManifest::from_file).transpose()?;
    let rate = config.clamp_rate(rate).unwrap_or(config.default_rate);
    let progress = ProgressModel::new(&script, config, manifest.as_ref(), rate);

    let rows: Vec<_> = script
        .cursors()
        .enumerate()
        .filter_map(|(index, cursor)| {
            let section = script.section(cursor.section)?;
            let line = section.lines().get(cursor.line)?;
            Some((index, section, line))
        })
        .collect();

    if as_json {
        let lines: Vec<_> = rows
            .iter()
            .map(|(index, section, line)| {
                json!({
                    "section_id": section.id(),
                    "line_id": line.id(),
                    "scene": line.scene(),
                    "start": progress.line_start(*index).as_secs_f64(),
                    "duration": progress.line_duration(*index).as_secs_f64(),
                })
            })
            .collect();
        let document = json!({
            "script_id": script.id(),
            "rate": rate,
            "total_duration": progress.total_duration().as_secs_f64(),
            "lines": lines,
        });
        println!("{}", serde_json::to_string_pretty(&document).unwrap_or_default());
        return Ok(());
    }

    println!("{}", script.title());
    if let Some(subtitle) = script.subtitle() {
        println!("{}", subtitle);
    }
    let mut current_section = None;
    for (index, section, line) in rows {
        if current_section != Some(section.id()) {
            current_section = Some(section.id());
            println!();
            println!("## {} ({})", section.title(), section.id());
        }
        println!(
            "  {}  {:<12} {}",
            format_time(progress.line_start(index)),
            line.id(),
            line.text()
        );
    }
    println!();
    println!(
        "Total {} at {}x",
        format_time(progress.total_duration()),
        rate
    );
    Ok(())
}

/// Formats a duration as `m:ss.s`.
pub fn format_time(duration: Duration) -> String {
    let tenths = duration.as_millis() / 100;
    let minutes = tenths / 600;
    let seconds = (tenths % 600) / 10;
    format!("{}:{:02}.{}", minutes, seconds, tenths % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Duration::ZERO), "0:00.0");
        assert_eq!(format_time(Duration::from_millis(4_250)), "0:04.2");
        assert_eq!(format_time(Duration::from_secs(125)), "2:05.0");
    }
}
