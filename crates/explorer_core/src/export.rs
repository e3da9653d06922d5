//! Plain-text day plan for download.

use std::path::{Path, PathBuf};

use shared::domain::LocationRecord;
use tokio::fs;
use tracing::info;

use crate::view::FLEXIBLE_TIME_LABEL;

pub const DAY_PLAN_FILENAME: &str = "day-plan.txt";
pub const DAY_PLAN_HEADER: &str = "# Your Day Plan";

/// Renders stops in itinerary order. `None` when there is nothing to export.
pub fn render_day_plan<'a, I>(stops: I) -> Option<String>
where
    I: IntoIterator<Item = &'a LocationRecord>,
{
    let mut out = String::new();
    let mut count = 0;
    for stop in stops {
        count += 1;
        if count == 1 {
            out.push_str(DAY_PLAN_HEADER);
            out.push_str("\n\n");
        }
        out.push_str(&format!("## {count}. {}\n", stop.name));
        out.push_str(&format!(
            "Time: {}\n",
            stop.scheduled_time().unwrap_or(FLEXIBLE_TIME_LABEL)
        ));
        if let Some(duration) = stop.duration.as_deref() {
            out.push_str(&format!("Duration: {duration}\n"));
        }
        out.push('\n');
        out.push_str(&stop.description);
        out.push_str("\n\n");
    }
    (count > 0).then_some(out)
}

/// Writes the plan as `day-plan.txt` under `dir`, creating the directory.
pub async fn write_day_plan(dir: &Path, contents: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let path = dir.join(DAY_PLAN_FILENAME);
    fs::write(&path, contents).await?;
    info!(path = %path.display(), bytes = contents.len(), "wrote day plan");
    Ok(path)
}
