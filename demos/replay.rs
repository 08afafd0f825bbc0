use multimatic_modes::{Installation, JournalMode, Reconciler};
use std::env;
use std::fs;

/// Replays snapshots (one JSON document per line) and prints the resulting
/// events and presentations.
fn main() -> multimatic_modes::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let path = args.get(1).expect("usage: replay <snapshots.ndjson> [--journal <out.ndjson>]");
    let journal = args
        .iter()
        .position(|a| a == "--journal")
        .and_then(|i| args.get(i + 1));

    let mut builder = Reconciler::builder()
        .on_event(|event| {
            println!("{event:?}");
        })
        .on_snapshot(|installation, presentations| {
            println!("--- {} ---", installation.date);
            for (id, unit) in presentations {
                let target = unit
                    .target_temperature
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".into());
                println!("[{id}] {} ({}) | {} | target {target}", unit.name, unit.kind, unit.mode);
            }
            if installation.has_errors() {
                println!("errors: {:?}", installation.errors);
            }
        });
    if let Some(out) = journal {
        builder = builder.journal(JournalMode::Diffed, out);
    }
    let mut reconciler = builder.build()?;

    for line in fs::read_to_string(path)?.lines().filter(|l| !l.trim().is_empty()) {
        reconciler.ingest(Installation::from_json(line)?);
    }

    Ok(())
}
