//! Width configuration: `cellwidth.toml` plus the process environment.
//!
//! Scope: parse the optional `[width]` table of `cellwidth.toml` (or an
//! override path provided by the binary) and combine it with what the
//! environment says about East Asian context, producing a
//! `core_text::WidthOptions`.
//!
//! Precedence: built-in defaults, then the environment, then the file. The
//! environment is captured once into an `EnvSnapshot` so resolution stays a
//! pure function and tests never touch process state.
//!
//! Unknown fields are ignored (TOML deserialization tolerance). A file that
//! fails to parse or validate is logged and replaced by defaults.

use anyhow::Result;
use core_text::{AmbiguousWidth, WidthOptions};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::{env, fs, path::PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "cellwidth.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config syntax: {0}")]
    Syntax(#[from] toml::de::Error),
    #[error("width.ambiguous must be 1 or 2, got {0}")]
    AmbiguousWidth(i64),
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct WidthSection {
    #[serde(default)]
    pub east_asian: Option<bool>,
    /// Cells for East Asian Ambiguous code points (1 or 2).
    #[serde(default)]
    pub ambiguous: Option<i64>,
    #[serde(default)]
    pub strict_emoji_neutral: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub width: WidthSection,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Parse and validate config file contents.
pub fn parse_str(content: &str) -> Result<ConfigFile, ConfigError> {
    let file: ConfigFile = toml::from_str(content)?;
    match file.width.ambiguous {
        Some(cells) if !matches!(cells, 1 | 2) => Err(ConfigError::AmbiguousWidth(cells)),
        _ => Ok(file),
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("cellwidth").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match parse_str(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
        }),
        Err(err) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %err,
                "config_invalid_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Combine defaults, the environment and the file into width options.
    pub fn resolve(&self, env: &EnvSnapshot) -> WidthOptions {
        let section = &self.file.width;
        let env_east_asian = env.east_asian();
        if env_east_asian {
            info!(
                target: "config",
                locale = env.locale().unwrap_or_default(),
                override_set = env.runewidth_eastasian.is_some(),
                "east_asian_context_from_env"
            );
        }

        let east_asian = section.east_asian.unwrap_or(env_east_asian);
        let ambiguous_width = section
            .ambiguous
            .and_then(|cells| u8::try_from(cells).ok())
            .and_then(AmbiguousWidth::from_cells)
            .unwrap_or(if east_asian {
                AmbiguousWidth::Wide
            } else {
                AmbiguousWidth::Narrow
            });

        WidthOptions {
            east_asian,
            ambiguous_width,
            strict_emoji_neutral: section
                .strict_emoji_neutral
                .unwrap_or(WidthOptions::DEFAULT.strict_emoji_neutral),
        }
    }
}

/// The environment variables that influence width, read once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    pub runewidth_eastasian: Option<String>,
    pub lc_all: Option<String>,
    pub lc_ctype: Option<String>,
    pub lang: Option<String>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        Self {
            runewidth_eastasian: env::var("RUNEWIDTH_EASTASIAN").ok(),
            lc_all: env::var("LC_ALL").ok(),
            lc_ctype: env::var("LC_CTYPE").ok(),
            lang: env::var("LANG").ok(),
        }
    }

    /// First non-empty of `LC_ALL`, `LC_CTYPE`, `LANG`.
    pub fn locale(&self) -> Option<&str> {
        [&self.lc_all, &self.lc_ctype, &self.lang]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|v| !v.is_empty())
    }

    /// `RUNEWIDTH_EASTASIAN` wins when non-empty ("1" means yes, anything
    /// else means no); otherwise the locale decides.
    pub fn east_asian(&self) -> bool {
        match self.runewidth_eastasian.as_deref() {
            Some(value) if !value.is_empty() => value == "1",
            _ => self.locale().is_some_and(is_east_asian_locale),
        }
    }
}

static LOCALE_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z][a-z]?(?:_[A-Z][A-Z])?\.(.+)").expect("locale pattern is valid")
});

/// Maximum bytes per character for the charsets we know about.
fn multibyte_len(charset: &str) -> usize {
    match charset {
        "utf-8" | "utf8" => 6,
        "jis" => 8,
        "eucjp" => 3,
        "euckr" | "euccn" | "sjis" | "cp932" | "cp51932" | "cp936" | "cp949" | "cp950"
        | "big5" | "gbk" | "gb2312" => 2,
        _ => 1,
    }
}

/// Whether a locale string such as `ja_JP.UTF-8` implies East Asian context.
pub fn is_east_asian_locale(locale: &str) -> bool {
    if locale == "C" || locale == "POSIX" || locale.starts_with("C.") || locale.starts_with("C-")
    {
        return false;
    }

    let charset = LOCALE_CHARSET
        .captures(locale)
        .and_then(|caps| caps.get(1))
        .map_or(locale, |m| m.as_str())
        .to_lowercase();
    if charset.ends_with("@cjk_narrow") {
        return false;
    }
    let charset = charset.split('@').next().unwrap_or_default();

    multibyte_len(charset) > 1
        && (!charset.starts_with('u')
            || ["ja", "ko", "zh"].iter().any(|lang| locale.starts_with(lang)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl Write for LockedWriter<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    fn env_with_lang(lang: &str) -> EnvSnapshot {
        EnvSnapshot {
            lang: Some(lang.to_string()),
            ..EnvSnapshot::default()
        }
    }

    fn config_from(content: &str) -> Config {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), content).unwrap();
        load_from(Some(tmp.path().to_path_buf())).unwrap()
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.resolve(&EnvSnapshot::default()), WidthOptions::DEFAULT);
    }

    #[test]
    fn parses_width_section() {
        let cfg = config_from("[width]\nambiguous = 2\nstrict_emoji_neutral = false\n");
        assert_eq!(cfg.file.width.ambiguous, Some(2));
        let opts = cfg.resolve(&EnvSnapshot::default());
        assert_eq!(opts.ambiguous_width, AmbiguousWidth::Wide);
        assert!(!opts.east_asian);
        assert!(!opts.strict_emoji_neutral);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let file = parse_str("[width]\neast_asian = true\nfuture = 1\n[other]\nx = 2\n").unwrap();
        assert_eq!(file.width.east_asian, Some(true));
    }

    #[test]
    fn rejects_out_of_range_ambiguous() {
        let err = parse_str("[width]\nambiguous = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousWidth(3)));
        assert!(matches!(
            parse_str("[width\n").unwrap_err(),
            ConfigError::Syntax(_)
        ));
    }

    #[test]
    fn invalid_file_falls_back_with_warning() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[width]\nambiguous = 0\n").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || {
            load_from(Some(tmp.path().to_path_buf())).unwrap()
        });

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_invalid_using_defaults"));
        assert_eq!(cfg.file, ConfigFile::default());
    }

    #[test]
    fn env_override_variable() {
        let mut env = env_with_lang("ja_JP.UTF-8");
        env.runewidth_eastasian = Some("0".into());
        assert!(!env.east_asian());
        env.runewidth_eastasian = Some("1".into());
        assert!(env.east_asian());
        env.runewidth_eastasian = Some(String::new());
        assert!(env.east_asian()); // empty falls through to the locale
        let en = EnvSnapshot {
            runewidth_eastasian: Some("1".into()),
            ..env_with_lang("en_US.UTF-8")
        };
        assert!(en.east_asian());
    }

    #[test]
    fn locale_variable_order() {
        let env = EnvSnapshot {
            lc_all: Some(String::new()),
            lc_ctype: Some("C".into()),
            lang: Some("ja_JP.UTF-8".into()),
            ..EnvSnapshot::default()
        };
        assert_eq!(env.locale(), Some("C"));
        assert!(!env.east_asian());
    }

    #[test]
    fn locale_detection() {
        assert!(is_east_asian_locale("ja_JP.UTF-8"));
        assert!(is_east_asian_locale("zh_CN.utf8"));
        assert!(is_east_asian_locale("ko_KR.eucKR"));
        assert!(is_east_asian_locale("en_US.SJIS"));
        assert!(!is_east_asian_locale("en_US.UTF-8"));
        assert!(!is_east_asian_locale("ja_JP.UTF-8@cjk_narrow"));
        assert!(!is_east_asian_locale("C"));
        assert!(!is_east_asian_locale("C.UTF-8"));
        assert!(!is_east_asian_locale("POSIX"));
        assert!(!is_east_asian_locale("ja_JP"));
    }

    #[test]
    fn locale_charset_pattern() {
        let caps = LOCALE_CHARSET.captures("zh_TW.Big5").unwrap();
        assert_eq!(&caps[1], "Big5");
        assert!(LOCALE_CHARSET.captures("eng.UTF-8").is_some());
        assert!(LOCALE_CHARSET.captures("ja_JP").is_none());
        assert!(LOCALE_CHARSET.captures("Ja_JP.UTF-8").is_none());
        // Without a `lang_TERRITORY.` prefix the whole string is the charset.
        assert!(is_east_asian_locale("SJIS"));
        assert!(!is_east_asian_locale("UTF-8"));
    }

    #[test]
    fn east_asian_env_widens_ambiguous_unless_file_says_otherwise() {
        let env = env_with_lang("ja_JP.UTF-8");
        let opts = Config::default().resolve(&env);
        assert!(opts.east_asian);
        assert_eq!(opts.ambiguous_width, AmbiguousWidth::Wide);

        let narrow = config_from("[width]\nambiguous = 1\n").resolve(&env);
        assert!(narrow.east_asian);
        assert_eq!(narrow.ambiguous_width, AmbiguousWidth::Narrow);

        let off = config_from("[width]\neast_asian = false\n").resolve(&env);
        assert_eq!(off, WidthOptions::DEFAULT);
    }

    #[test]
    fn env_logging_uses_config_target() {
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        with_default(subscriber, || {
            Config::default().resolve(&env_with_lang("zh_TW.Big5"));
        });

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("INFO config:"));
        assert!(log_output.contains("east_asian_context_from_env"));
    }
}
