use anyhow::Result;
use calmirror_core::sync;

use super::Context;
use crate::render::render_plan;

pub async fn run(ctx: &Context, verbose: bool) -> Result<()> {
    let events = ctx.source_events()?;
    let destination = ctx.destination();

    let plan = sync::plan(&destination, &events).await?;

    println!("📅 {} ({})", ctx.ics_path.display(), plan.time_zone);
    println!("{}", render_plan(&plan, verbose));

    if plan.diff.is_empty() {
        println!("\nEverything up to date.");
    } else {
        println!("\nRun `calmirror sync` to apply these changes.");
    }

    Ok(())
}
