/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Root of images/, audios/ and word_bank.json.
    pub assets_dir: PathBuf,
    /// The JSON profile store.
    pub profiles_file: PathBuf,
    pub pacing: PacingConfig,
}

#[derive(Clone, Debug)]
pub struct PacingConfig {
    /// Nominal step length of the main loop (33ms ~ 30 steps/second).
    pub tick_rate_ms: u64,
    /// Post-judgement freeze, in wall-clock milliseconds.
    pub feedback_ms: u64,
}

impl PacingConfig {
    /// The freeze expressed in loop ticks; pacing is a pace limiter,
    /// not a hard timing guarantee.
    pub fn feedback_ticks(&self) -> u32 {
        (self.feedback_ms / self.tick_rate_ms.max(1)).max(1) as u32
    }
}

impl GameConfig {
    pub fn images_dir(&self) -> PathBuf {
        self.assets_dir.join("images")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.assets_dir.join("audios")
    }

    pub fn word_bank(&self) -> PathBuf {
        self.assets_dir.join("word_bank.json")
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    pacing: TomlPacing,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_assets_dir")]
    assets_dir: String,
    #[serde(default = "default_profiles_file")]
    profiles_file: String,
}

#[derive(Deserialize, Debug)]
struct TomlPacing {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_feedback_ms")]
    feedback_ms: u64,
}

// ── Defaults ──

fn default_assets_dir() -> String { "assets".into() }
fn default_profiles_file() -> String { "profiles.json".into() }
fn default_tick_rate() -> u64 { 33 }   // ~30 steps/second
fn default_feedback_ms() -> u64 { 800 }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            assets_dir: default_assets_dir(),
            profiles_file: default_profiles_file(),
        }
    }
}

impl Default for TomlPacing {
    fn default() -> Self {
        TomlPacing {
            tick_rate_ms: default_tick_rate(),
            feedback_ms: default_feedback_ms(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        let assets_dir = resolve_dir(&search_dirs, &toml_cfg.general.assets_dir);
        let profiles_file =
            resolve_profiles_path(&search_dirs, &toml_cfg.general.profiles_file);

        GameConfig {
            assets_dir,
            profiles_file,
            pacing: PacingConfig {
                tick_rate_ms: toml_cfg.pacing.tick_rate_ms,
                feedback_ms: toml_cfg.pacing.feedback_ms,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a launcher symlink still finds data
        // relative to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/lucky-letters)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/lucky-letters");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/lucky-letters)
    let sys = PathBuf::from("/usr/share/lucky-letters");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Resolve a possibly-relative directory against the candidate dirs.
fn resolve_dir(search_dirs: &[PathBuf], value: &str) -> PathBuf {
    if PathBuf::from(value).is_absolute() {
        return PathBuf::from(value);
    }
    search_dirs
        .iter()
        .map(|d| d.join(value))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| PathBuf::from(value))
}

/// Resolve the profile store path: an existing file wins; otherwise the
/// first writable candidate directory hosts a new one.
fn resolve_profiles_path(search_dirs: &[PathBuf], value: &str) -> PathBuf {
    if PathBuf::from(value).is_absolute() {
        return PathBuf::from(value);
    }
    if let Some(existing) = search_dirs
        .iter()
        .map(|d| d.join(value))
        .find(|p| p.is_file())
    {
        return existing;
    }
    for dir in search_dirs {
        // System installs like /usr/games won't be writable.
        let probe = dir.join(".write_test_lucky_letters");
        if std::fs::write(&probe, "").is_ok() {
            let _ = std::fs::remove_file(&probe);
            return dir.join(value);
        }
    }
    PathBuf::from(value)
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
