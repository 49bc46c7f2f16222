use clap::Parser;
use commerce::{Bound, SchemaConfig, memory::MemoryRecord};

mod cli;
mod error;
mod output;
mod settings;

fn main() -> error::Result<()> {
    let args = cli::Cli::parse();
    let settings = settings::Settings::new(args.config.as_deref())?;

    let level = args.level.as_deref().unwrap_or(&settings.app.level);
    tracing_subscriber::fmt()
        .with_env_filter(format!("tally={level},commerce={level}"))
        .with_writer(std::io::stderr)
        .init();

    let mut definition = SchemaConfig::load(&args.schema)?;
    settings.summary.apply(&mut definition);
    let schema = definition.into_schema::<MemoryRecord>()?;
    tracing::info!(schema = %args.schema.display(), "schema loaded");

    let record: MemoryRecord = serde_json::from_str(&std::fs::read_to_string(&args.record)?)?;
    tracing::info!(record = %args.record.display(), "record loaded");

    let summary = match args.locale.as_deref() {
        Some(locale) => Bound::with_locale(&schema, &record, locale)?,
        None => schema.bind(&record)?,
    };

    print!("{}", output::render(&summary, args.format, &args.fields)?);
    Ok(())
}
