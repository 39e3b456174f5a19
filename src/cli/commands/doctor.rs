use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Value};

use crate::config::{load_profile, resolve_profile_path};
use crate::playback::process::find_executable;
use crate::usage::{month_key, UsageLedger};

/// Print a JSON diagnostics report and exit
pub async fn run(profiles: Option<&str>, profile: Option<&str>) -> Result<()> {
    let report = build_report(profiles, profile);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn build_report(profiles: Option<&str>, profile_name: Option<&str>) -> Value {
    let mut notes: Vec<String> = Vec::new();

    let process_tools_available = find_executable("pgrep").is_some()
        && (find_executable("pkill").is_some() || find_executable("killall").is_some());
    if !process_tools_available {
        notes.push("pgrep/pkill not found: stop will not work on this host.".to_string());
    }

    let mut report = json!({
        "ok": true,
        "profile_file": profiles.unwrap_or("<not found>"),
        "profile_name": profile_name.unwrap_or("<default>"),
        "profile_loaded": false,
        "player_available": false,
        "process_tools_available": process_tools_available,
    });

    let loaded = resolve_profile_path(profiles).and_then(|path| {
        report["profile_file"] = json!(path.to_string_lossy());
        load_profile(&path, profile_name)
    });

    match loaded {
        Ok(profile) => {
            report["profile_loaded"] = json!(true);
            report["effective_profile"] = json!({
                "name": profile.name,
                "voice": profile.voice,
                "language": profile.language,
                "format": profile.audio_format,
                "output_dir": profile.output_dir.to_string_lossy(),
                "usage_log": profile.usage_log.to_string_lossy(),
                "autoplay": profile.autoplay,
                "player_command": profile.player_command,
            });

            let ledger = UsageLedger::new(&profile.usage_log);
            report["usage_log_exists"] = json!(ledger.path().exists());

            let month = month_key(&Utc::now());
            match ledger.sum_characters(&month) {
                Ok(chars) => {
                    report["month"] = json!(month);
                    report["month_to_date_chars"] = json!(chars);
                }
                Err(e) => {
                    report["ok"] = json!(false);
                    notes.push(format!("Usage log unreadable: {}", e));
                }
            }

            let player_available = match profile.player_command.first() {
                Some(bin) if profile.autoplay => {
                    let found = find_executable(bin).is_some();
                    if !found {
                        notes.push(format!("Audio player not found: {}", bin));
                    }
                    found
                }
                _ => true,
            };
            report["player_available"] = json!(player_available);
        }
        Err(e) => {
            report["ok"] = json!(false);
            report["error"] = json!(e.to_string());
        }
    }

    report["notes"] = json!(notes);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_report_for_missing_file() {
        let report = build_report(Some("/no/such/profiles.json"), None);
        assert_eq!(report["ok"], json!(false));
        assert_eq!(report["profile_loaded"], json!(false));
        assert!(report["error"]
            .as_str()
            .unwrap()
            .contains("Profile file not found"));
    }

    #[test]
    fn test_report_flags_missing_player() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(
            &path,
            r#"{"default_profile": "p", "profiles": {"p": {"player_command": ["no-such-player-xyz", "{file}"]}}}"#,
        )
        .unwrap();

        let report = build_report(Some(path.to_str().unwrap()), None);
        assert_eq!(report["profile_loaded"], json!(true));
        assert_eq!(report["player_available"], json!(false));
        assert_eq!(report["month_to_date_chars"], json!(0));
        let notes = report["notes"].as_array().unwrap();
        assert!(notes
            .iter()
            .any(|n| n.as_str() == Some("Audio player not found: no-such-player-xyz")));
    }
}
