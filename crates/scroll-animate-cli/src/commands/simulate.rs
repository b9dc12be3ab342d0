use std::path::Path;

use anyhow::{Context, Result};

use scroll_animate_core::scene::{Frame, Scene};

pub fn run(path: &Path, json: bool, last: bool) -> Result<()> {
    let scene = Scene::load(path).with_context(|| format!("Failed to load scene {}", path.display()))?;
    let report = scene.run()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let frames: Vec<&Frame> = if last {
        report.final_frame().into_iter().collect()
    } else {
        report.frames.iter().collect()
    };

    if frames.is_empty() {
        println!("Scene has no steps.");
        return Ok(());
    }

    for frame in frames {
        println!(
            "[{:>6}ms] {} (scroll y = {})",
            frame.time_ms, frame.step, frame.scroll_y
        );
        for el in &frame.elements {
            let classes = if el.classes.is_empty() {
                String::from("-")
            } else {
                el.classes.join(" ")
            };
            println!("    {:<20} {:<9} {}", el.id, el.state.to_string(), classes);
        }
        println!();
    }

    println!(
        "in view: {}, animated: {}",
        report.in_view_events, report.animate_events
    );
    if !report.errors.is_empty() {
        println!("\nErrors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  {}", err);
        }
    }

    Ok(())
}
