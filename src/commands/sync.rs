use anyhow::Result;
use calmirror_core::sync;
use tracing::warn;

use super::Context;
use crate::render::{render_plan, render_stats};

pub async fn run(ctx: &Context, dry_run: bool, verbose: bool) -> Result<()> {
    let events = ctx.source_events()?;
    let destination = ctx.destination();

    let plan = sync::plan(&destination, &events).await?;

    if dry_run {
        println!("{}", render_plan(&plan, verbose));
        println!("\nDry run: nothing was written.");
        return Ok(());
    }

    let stats = sync::apply(&destination, &plan).await;
    println!("{}", render_stats(&stats));

    let failed = stats.failed + stats.exceptions.failed;
    if failed > 0 {
        warn!(failed, "Some changes were rejected and will be retried on the next run");
    }
    if stats.exceptions.skipped > 0 {
        warn!(
            skipped = stats.exceptions.skipped,
            "Some occurrences disappeared before they could be cancelled"
        );
    }

    Ok(())
}
