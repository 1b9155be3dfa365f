use anyhow::Context;
use clap::Parser;
use contrib_etl::core::summary::{summarize, SummaryKey};
use contrib_etl::read_output;
use contrib_etl::utils::logger;
use rust_decimal::Decimal;
use serde::Serialize;

/// Prints the month-by-month PAC summary of a written output document as CSV.
#[derive(Parser)]
#[command(name = "pac-summary")]
#[command(about = "Month/pair summary of PAC contributions from a formatted output file")]
struct Args {
    /// Output document written by contrib-etl
    #[arg(short, long, default_value = "./static/data/formatted_contributions.json")]
    input: String,

    /// Name form used to pair donors with recipients
    #[arg(long, value_enum, default_value_t = SummaryKey::Display)]
    key: SummaryKey,

    /// Only this month, as YYYY-MM
    #[arg(long)]
    month: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    month: String,
    donor: &'a str,
    recipient: &'a str,
    party: &'a str,
    contributed: Decimal,
    returned: Decimal,
    count: usize,
    dates: &'a str,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let data = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input))?;
    let output = read_output(&data).with_context(|| format!("{} is not an output document", args.input))?;

    let months = summarize(&output.pac_contributions, args.key);
    tracing::info!(
        "Summarized {} PAC contributions into {} months",
        output.pac_contributions.len(),
        months.len()
    );

    let mut writer = csv::Writer::from_writer(std::io::stdout());
    for month in &months {
        let label = month.month.to_string();
        if args.month.as_deref().is_some_and(|wanted| wanted != label) {
            continue;
        }
        for group in &month.groups {
            writer.serialize(SummaryRow {
                month: label.clone(),
                donor: &group.donor_name,
                recipient: &group.recipient_name,
                party: &group.recipient_party,
                contributed: group.positive_amount,
                returned: group.negative_amount,
                count: group.contribution_count,
                dates: &group.date_range,
            })?;
        }
    }
    writer.flush()?;

    Ok(())
}
