//! Ask command - answers one question from the terminal

use std::io::Write;

use clap::Args;

use crate::config::AppConfig;
use crate::domain::crag::{CragOutcome, Terminal};
use crate::infrastructure::registry::ClientRegistry;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The legal question
    pub question: String,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(config: AppConfig, args: AskArgs) -> anyhow::Result<()> {
    let engine = ClientRegistry::global().build_engine(&config).await?;
    let outcome = engine.run(&args.question).await?;

    let mut stdout = std::io::stdout().lock();

    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &outcome)?;
        writeln!(stdout)?;
    } else {
        write_report(&mut stdout, &outcome)?;
    }

    Ok(())
}

fn write_report(out: &mut impl Write, outcome: &CragOutcome) -> std::io::Result<()> {
    writeln!(out, "{}", outcome.answer)?;
    writeln!(out)?;

    if outcome.relevant_passages.is_empty() {
        writeln!(out, "Sources: none")?;
    } else {
        writeln!(out, "Sources:")?;
        for (i, passage) in outcome.relevant_passages.iter().enumerate() {
            writeln!(
                out,
                "  {}. {} (score {:.3})",
                i + 1,
                passage.citation_label(),
                passage.score
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Retries: {}", outcome.retry_count)?;

    if outcome.terminal == Terminal::NoAnswer {
        writeln!(out, "Ended without an answer")?;
    } else if outcome.forced {
        writeln!(out, "Answer generated without relevant sources")?;
    }

    writeln!(out, "Query history:")?;
    for (i, query) in outcome.query_history.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, query)?;
    }

    Ok(())
}
