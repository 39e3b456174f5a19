use anyhow::{bail, Result};
use chrono::Utc;
use colored::Colorize;
use std::collections::BTreeMap;

use crate::config::load_from_args;
use crate::usage::{
    is_valid_month_key, month_key, FamilyTag, FamilyUsage, LedgerRow, UsageAccountant, UsageLedger,
};

/// Show per-family usage and estimated cost for a month
pub async fn run(
    profiles: Option<&str>,
    profile: Option<&str>,
    month: Option<String>,
    events: bool,
    json: bool,
) -> Result<()> {
    let month = month.unwrap_or_else(|| month_key(&Utc::now()));
    if !is_valid_month_key(&month) {
        bail!("Invalid month: {}. Use YYYY-MM", month);
    }

    let (_, profile) = load_from_args(profiles, profile)?;
    let ledger = UsageLedger::new(&profile.usage_log);

    if events {
        let rows: Vec<LedgerRow> = ledger
            .read_rows()?
            .into_iter()
            .filter(|row| row.month == month)
            .collect();
        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            for row in &rows {
                println!(
                    "  {} {:>10} {} {}",
                    row.timestamp_utc.dimmed(),
                    row.chars,
                    row.voice.cyan(),
                    row.output_file
                );
            }
        }
        return Ok(());
    }

    let report = UsageAccountant::new(&ledger).month_report(&month)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "\n{}",
        format!("  TTS Usage ({})", report.month_key)
            .bold()
            .bright_yellow()
    );
    println!("{}", "  ─────────────────────────────".dimmed());

    if report.by_family.is_empty() {
        println!("\n  {}", "No usage recorded this month.".dimmed());
        println!();
        return Ok(());
    }

    print_family_usage(&report.by_family);
    println!(
        "\n  {} {} chars, {}",
        "Total:".bold(),
        report.total_chars.to_string().bright_yellow(),
        format!("${:.2}", report.total_estimated_cost_usd).bright_yellow()
    );
    println!();
    Ok(())
}

/// Render the family breakdown shared by `usage` and `record`
pub fn print_family_usage(by_family: &BTreeMap<FamilyTag, FamilyUsage>) {
    println!("\n  {}", header_line());
    for (family, usage) in by_family {
        println!("  {}", family_line(*family, usage));
    }
}

// Pad before styling: ANSI codes would otherwise count toward the width
fn header_line() -> String {
    format!(
        "{} {} {} {} {}",
        format!("{:>12}", "family").bold(),
        format!("{:>12}", "chars").bold(),
        format!("{:>12}", "free tier").bold(),
        format!("{:>12}", "billable").bold(),
        format!("{:>10}", "cost").bold()
    )
}

fn family_line(family: FamilyTag, usage: &FamilyUsage) -> String {
    let cost = format!("{:>10}", format!("${:.2}", usage.estimated_cost_usd));
    let cost = if usage.billable_chars > 0 {
        cost.red()
    } else {
        cost.green()
    };
    format!(
        "{} {:>12} {} {:>12} {}",
        format!("{:>12}", family.as_str()).cyan(),
        usage.chars,
        format!("{:>12}", usage.free_tier).dimmed(),
        usage.billable_chars,
        cost
    )
}
