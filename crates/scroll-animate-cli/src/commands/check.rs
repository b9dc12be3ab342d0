use std::path::Path;

use anyhow::{bail, Context, Result};

use scroll_animate_core::scene::{Scene, Severity};

pub fn run(path: &Path) -> Result<()> {
    let scene = Scene::load(path).with_context(|| format!("Failed to load scene {}", path.display()))?;
    let lints = scene.check();

    if lints.is_empty() {
        println!("No problems found in {}.", path.display());
        return Ok(());
    }

    for lint in &lints {
        match &lint.element {
            Some(element) => println!("{}: {}: {}", lint.severity, element, lint.message),
            None => println!("{}: {}", lint.severity, lint.message),
        }
    }

    let errors = lints.iter().filter(|l| l.severity == Severity::Error).count();
    if errors > 0 {
        bail!("{} error(s) in {}", errors, path.display());
    }
    Ok(())
}
