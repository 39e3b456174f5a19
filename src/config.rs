use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = "tts-mcp";
pub const PROFILES_FILENAME: &str = "profiles.json";

const DEFAULT_VOICE: &str = "en-US-Chirp3-HD-Fenrir";
const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_FORMAT: &str = "mp3";
const DEFAULT_OUTPUT_DIR: &str = "./out";
const DEFAULT_USAGE_LOG: &str = "usage_log.csv";

/// Starter profiles file written by `init`
pub const EXAMPLE_PROFILES: &str = r#"{
  "default_profile": "default",
  "profiles": {
    "default": {
      "voice": "en-US-Chirp3-HD-Fenrir",
      "language": "en-US",
      "format": "mp3",
      "output_dir": "./out",
      "usage_log": "usage_log.csv",
      "autoplay": true,
      "player_command": ["afplay", "{file}"]
    },
    "linux": {
      "voice": "en-US-Neural2-D",
      "language": "en-US",
      "format": "mp3",
      "output_dir": "./out",
      "usage_log": "usage_log.csv",
      "autoplay": true,
      "player_command": ["mpv", "--no-video", "{file}"]
    }
  }
}
"#;

/// A resolved synthesis profile
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub voice: String,
    pub language: String,
    pub audio_format: String,
    pub output_dir: PathBuf,
    pub usage_log: PathBuf,
    pub autoplay: bool,
    pub player_command: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProfilesFile {
    #[serde(default)]
    default_profile: Option<String>,
    #[serde(default)]
    profiles: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    voice: Option<String>,
    language: Option<String>,
    format: Option<String>,
    output_dir: Option<String>,
    usage_log: Option<String>,
    autoplay: Option<bool>,
    player_command: Option<serde_json::Value>,
}

/// `$XDG_CONFIG_HOME/tts-mcp`, falling back to `~/.config/tts-mcp`
pub fn default_config_dir() -> Result<PathBuf> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(shellexpand::tilde(&xdg).into_owned()),
        _ => dirs::home_dir()
            .context("Failed to get home directory")?
            .join(".config"),
    };
    Ok(base.join(CONFIG_DIR_NAME))
}

/// Find the profiles file: an explicit path wins, then the config directory.
pub fn resolve_profile_path(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(explicit) = explicit.filter(|s| !s.is_empty()) {
        let path = PathBuf::from(shellexpand::tilde(explicit).into_owned());
        if path.exists() {
            return Ok(path);
        }
        bail!("Profile file not found: {}", path.display());
    }

    let default_path = default_config_dir()?.join(PROFILES_FILENAME);
    if default_path.exists() {
        return Ok(default_path);
    }

    bail!(
        "No profiles file found.\n\
         Run 'tts-meter init' to create one at {}\n\
         or specify a path with --profiles or the GTTS_PROFILES env var.",
        default_path.display()
    )
}

/// Load and resolve a named profile (or the file's `default_profile`).
pub fn load_profile(profile_file: &Path, profile_name: Option<&str>) -> Result<Profile> {
    let source = profile_file
        .canonicalize()
        .with_context(|| format!("Profile file not found: {}", profile_file.display()))?;
    let raw = fs::read_to_string(&source)
        .with_context(|| format!("Failed to read profile file: {}", source.display()))?;
    let file: ProfilesFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse profile file: {}", source.display()))?;

    if file.profiles.is_empty() {
        bail!("Profile file must contain a non-empty 'profiles' object.");
    }

    let selected_name = profile_name
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or(file.default_profile.filter(|s| !s.is_empty()))
        .context("No profile selected and no default_profile defined.")?;

    let selected = file
        .profiles
        .get(&selected_name)
        .filter(|v| v.is_object())
        .with_context(|| format!("Profile not found: {}", selected_name))?;
    let selected: RawProfile = serde_json::from_value(selected.clone())
        .with_context(|| format!("Invalid profile: {}", selected_name))?;

    let player_command = match selected.player_command {
        None => vec!["afplay".to_string(), "{file}".to_string()],
        Some(value) => serde_json::from_value::<Vec<String>>(value)
            .map_err(|_| anyhow::anyhow!("profile.player_command must be a list of strings"))?,
    };

    let base_dir = source.parent().unwrap_or_else(|| Path::new("."));

    Ok(Profile {
        name: selected_name,
        voice: selected.voice.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
        language: selected
            .language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        audio_format: selected.format.unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
        output_dir: resolve_relative(
            base_dir,
            selected.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR),
        ),
        usage_log: resolve_relative(
            base_dir,
            selected.usage_log.as_deref().unwrap_or(DEFAULT_USAGE_LOG),
        ),
        autoplay: selected.autoplay.unwrap_or(true),
        player_command,
    })
}

/// Resolve the profiles file and load a profile in one step
pub fn load_from_args(profiles: Option<&str>, profile: Option<&str>) -> Result<(PathBuf, Profile)> {
    let path = resolve_profile_path(profiles)?;
    let loaded = load_profile(&path, profile)?;
    Ok((path, loaded))
}

/// Write the starter profiles file into the config directory.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let config_dir = default_config_dir()?;
    let dest = config_dir.join(PROFILES_FILENAME);

    if dest.exists() && !force {
        bail!(
            "Config already exists: {}\nUse --force to overwrite.",
            dest.display()
        );
    }

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;
    fs::write(&dest, EXAMPLE_PROFILES)
        .with_context(|| format!("Failed to write {}", dest.display()))?;
    Ok(dest)
}

fn resolve_relative(base_dir: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(shellexpand::tilde(value).into_owned());
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
