use std::path::Path;

use anyhow::{Context, Result};

use scroll_animate_core::AnimatorConfig;

pub fn run(file: Option<&Path>) -> Result<()> {
    let config = match file {
        Some(path) => AnimatorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnimatorConfig::default(),
    };

    print!("{}", config.to_toml_string()?);
    Ok(())
}
