//! Scene table audit command.

use recital::{RecitalResult, SceneTable, Script};
use std::path::Path;
use tracing::info;

/// Audits a scene table against its script and prints every problem.
///
/// Returns `false` if the script is malformed or a scene reference has no
/// table row. Orphaned and duplicated rows are reported but tolerated.
#[tracing::instrument(skip_all, fields(script = %script_path.display()))]
pub fn check(script_path: &Path, scenes_path: &Path) -> RecitalResult<bool> {
    let script = Script::from_file(script_path)?;
    let table = SceneTable::from_file(scenes_path)?;

    if let Err(e) = script.validate() {
        println!("✗ {}", e.kind);
        return Ok(false);
    }
    if table.script_id() != script.id() {
        println!(
            "! scene table is for '{}', script is '{}'",
            table.script_id(),
            script.id()
        );
    }

    let audit = table.audit(&script);
    info!(
        missing = audit.missing().len(),
        orphans = audit.orphans().len(),
        duplicates = audit.duplicates().len(),
        "Scene audit finished"
    );

    for problem in audit.missing() {
        println!("✗ {}", problem.kind);
    }
    for problem in audit.orphans().iter().chain(audit.duplicates()) {
        println!("! {}", problem.kind);
    }

    if audit.is_clean() {
        println!(
            "✓ {} lines, {} scene entries, no problems",
            script.line_count(),
            table.len()
        );
    }
    Ok(audit.missing().is_empty())
}
