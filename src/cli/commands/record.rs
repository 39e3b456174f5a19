use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::usage::print_family_usage;
use crate::config::{load_from_args, Profile};
use crate::playback::{PlaybackAttempt, PlaybackController};
use crate::usage::{UsageAccountant, UsageEvent, UsageLedger, UsageSnapshot};

pub struct RecordArgs {
    pub chars: u64,
    pub voice: Option<String>,
    pub language: Option<String>,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub play: bool,
    pub json: bool,
}

#[derive(Serialize)]
struct RecordOutput {
    output_file: String,
    #[serde(flatten)]
    usage: UsageSnapshot,
    #[serde(flatten)]
    playback: PlaybackAttempt,
}

/// Record one synthesis event, then report usage including it
pub async fn run(profiles: Option<&str>, profile: Option<&str>, args: RecordArgs) -> Result<()> {
    let (_, profile) = load_from_args(profiles, profile)?;
    let now = Utc::now();

    let voice = args.voice.unwrap_or_else(|| profile.voice.clone());
    let output = args
        .output
        .unwrap_or_else(|| timestamped_output_path(&profile, now));
    let output_file = output.to_string_lossy().to_string();

    let ledger = UsageLedger::new(&profile.usage_log);
    ledger
        .append(&UsageEvent {
            timestamp: now,
            character_count: args.chars,
            voice_identifier: voice.clone(),
            language_code: args.language.unwrap_or_else(|| profile.language.clone()),
            audio_format: args.format.unwrap_or_else(|| profile.audio_format.clone()),
            output_path: output_file.clone(),
        })
        .context("Failed to record usage")?;

    let usage = UsageAccountant::new(&ledger).snapshot(args.chars, &voice, now)?;

    // Playback problems never fail the command; the event is already recorded
    let playback = if args.play {
        PlaybackController::system().autoplay(profile.autoplay, &profile.player_command, &output_file)
    } else {
        PlaybackAttempt::default()
    };

    if args.json {
        let out = RecordOutput {
            output_file,
            usage,
            playback,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "[tts-meter] Recorded {} chars ({}) for {}",
        usage.chars_this_request.to_string().bright_yellow(),
        usage.voice_family.to_string().cyan(),
        output_file
    );
    println!(
        "[tts-meter] Month to date ({}), est. {}",
        usage.month_key,
        format!("${:.2}", usage.total_estimated_cost_usd()).bright_yellow()
    );
    print_family_usage(&usage.month_to_date_by_family);
    println!();

    if playback.autoplay_started {
        eprintln!("[tts-meter] Playing: {}", output_file);
    }
    if let Some(warning) = &playback.playback_warning {
        eprintln!("{} {}", "[tts-meter] Playback warning:".yellow(), warning);
    }
    Ok(())
}

/// `<output_dir>/<profile>-tts-<YYYYmmdd-HHMMSS>.<format>`
fn timestamped_output_path(profile: &Profile, now: DateTime<Utc>) -> PathBuf {
    profile.output_dir.join(format!(
        "{}-tts-{}.{}",
        profile.name,
        now.format("%Y%m%d-%H%M%S"),
        profile.audio_format
    ))
}
