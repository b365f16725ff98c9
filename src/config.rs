//! Configuration document and resolved application settings.
//!
//! Configuration is read once, before any request is served, from a single
//! TOML file. The file location can be overridden with the `FS2CONFIG`
//! environment variable; otherwise `<root>/config/main.toml` is used. A
//! missing file is tolerated (every setting has a default), a malformed one
//! aborts startup.
//!
//! Two views of the same data:
//!
//! - [`Config`], the raw document, queried by dotted path
//!   (`config.get_str("database.connection")`). Bound into the registry so
//!   providers and embedders share one source of truth.
//! - [`Settings`], the resolved application surface: directory layout and
//!   runtime flags. Built once by [`Settings::resolve`], immutable afterwards.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::Value;

/// Error raised while loading the configuration file. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed configuration at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ── Config ────────────────────────────────────────────────────────────────────

/// The parsed configuration document.
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: toml::Table,
}

impl Config {
    /// An empty document. Every lookup misses; every default applies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the configuration for an application rooted at `root`.
    ///
    /// Honors the `FS2CONFIG` environment variable as an override path and
    /// falls back to `<root>/config/main.toml`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::load_from(config_path(root, env::var_os("FS2CONFIG")))
    }

    /// Loads the configuration from an explicit path.
    ///
    /// A file that does not exist yields an empty document. Any other read
    /// failure, and any parse failure, is a [`ConfigError`].
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::empty()),
            Err(e) => return Err(ConfigError::Io { path, source: e }),
        };
        let values = toml::from_str(&text).map_err(|e| ConfigError::Parse { path, source: e })?;
        Ok(Self { values })
    }

    /// Looks a value up by dotted path: `get("database.connection")` walks
    /// the `database` table and returns its `connection` entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }

    /// Dotted-path lookup narrowed to a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Dotted-path lookup narrowed to a boolean value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    /// Dotted-path lookup narrowed to an integer value.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.as_integer()
    }

    /// Inserts `value` under `key` unless the key is already set.
    ///
    /// Repeated calls with the same key are no-ops: the first definition
    /// (whether from the file or an earlier default) wins. Intermediate
    /// tables are created as needed; if a segment of the path is occupied by
    /// a non-table value the call leaves the document untouched.
    pub fn set_default(&mut self, key: &str, value: impl Into<Value>) {
        let mut parts: Vec<&str> = key.split('.').collect();
        let Some(last) = parts.pop() else { return };
        let mut table = &mut self.values;
        for part in parts {
            let entry = table
                .entry(part.to_owned())
                .or_insert_with(|| Value::Table(toml::Table::new()));
            match entry.as_table_mut() {
                Some(t) => table = t,
                None => return,
            }
        }
        table.entry(last.to_owned()).or_insert_with(|| value.into());
    }
}

/// Resolves the configuration file path. Pure: the caller supplies the value
/// of `FS2CONFIG`, if any. An empty override falls back to the default, the
/// same way the original treated an empty environment variable.
fn config_path(root: &Path, env_override: Option<OsString>) -> PathBuf {
    match env_override {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => root.join("config").join("main.toml"),
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// The resolved application surface: directory layout and runtime flags.
///
/// Built exactly once at startup and never mutated afterwards; components
/// that need it receive a shared reference through the registry.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Application base directory.
    pub root: PathBuf,
    /// Public asset root. Default `<root>/public`.
    pub public_dir: PathBuf,
    /// Configuration directory. Default `<root>/config`.
    pub config_dir: PathBuf,
    /// Content root. Defaults to the public directory.
    pub content_dir: PathBuf,
    /// Media directory. Default `<content>/media`.
    pub media_dir: PathBuf,
    /// Styles directory. Default `<content>/styles`.
    pub styles_dir: PathBuf,
    /// Upload directory. Default `<content>/upload`.
    pub upload_dir: PathBuf,
    /// Satellite mode: this instance serves a satellite site.
    pub satellite: bool,
    /// Debug flag.
    pub debug: bool,
    /// Environment name, e.g. `development` or `production`.
    pub environment: String,
}

impl Settings {
    /// Resolves the settings for an application rooted at `root`.
    ///
    /// Seeds each setting's default into `config` with
    /// [`Config::set_default`] and reads the effective value back, so keys
    /// pre-defined in the file keep their values and the merged surface is
    /// visible to every consumer of the config document. Defaults cascade in
    /// declaration order: the content directory defaults to the public
    /// directory, media/styles/upload default to subdirectories of content.
    pub fn resolve(root: &Path, config: &mut Config) -> Self {
        let as_value = |p: PathBuf| p.display().to_string();

        config.set_default("app.public", as_value(root.join("public")));
        config.set_default("app.config", as_value(root.join("config")));
        let public_dir = Self::dir(root, config, "app.public");

        config.set_default("app.content", as_value(public_dir.clone()));
        let content_dir = Self::dir(root, config, "app.content");

        config.set_default("app.media", as_value(content_dir.join("media")));
        config.set_default("app.styles", as_value(content_dir.join("styles")));
        config.set_default("app.upload", as_value(content_dir.join("upload")));
        config.set_default("app.satellite", false);
        config.set_default("app.debug", true);
        config.set_default("app.env", "development");

        Settings {
            root: root.to_path_buf(),
            config_dir: Self::dir(root, config, "app.config"),
            media_dir: Self::dir(root, config, "app.media"),
            styles_dir: Self::dir(root, config, "app.styles"),
            upload_dir: Self::dir(root, config, "app.upload"),
            satellite: config.get_bool("app.satellite").unwrap_or(false),
            debug: config.get_bool("app.debug").unwrap_or(true),
            environment: config
                .get_str("app.env")
                .unwrap_or("development")
                .to_owned(),
            public_dir,
            content_dir,
        }
    }

    /// Reads a directory setting. Relative paths are anchored at the root.
    fn dir(root: &Path, config: &Config, key: &str) -> PathBuf {
        let raw = config.get_str(key).unwrap_or_default();
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn parsed(text: &str) -> Config {
        Config {
            values: toml::from_str(text).unwrap(),
        }
    }

    #[test]
    fn dotted_lookup_walks_nested_tables() {
        let config = parsed(
            r#"
            [database]
            connection = "mysql"

            [database.mysql]
            host = "localhost"
            port = 3306
            "#,
        );

        assert_eq!(config.get_str("database.connection"), Some("mysql"));
        assert_eq!(config.get_int("database.mysql.port"), Some(3306));
        assert!(config.get("database.mysql").unwrap().is_table());
        assert_eq!(config.get("database.pgsql"), None);
        assert_eq!(config.get_str("database.mysql.port"), None);
    }

    #[test]
    fn set_default_does_not_overwrite() {
        let mut config = parsed("[app]\nenv = \"production\"\n");

        config.set_default("app.env", "development");
        config.set_default("app.env", "testing");

        assert_eq!(config.get_str("app.env"), Some("production"));
    }

    #[test]
    fn set_default_creates_missing_tables() {
        let mut config = Config::empty();

        config.set_default("app.media", "/srv/media");

        assert_eq!(config.get_str("app.media"), Some("/srv/media"));
    }

    #[test]
    fn set_default_leaves_scalar_paths_alone() {
        let mut config = parsed("app = 1\n");

        config.set_default("app.env", "development");

        assert_eq!(config.get_int("app"), Some(1));
        assert_eq!(config.get("app.env"), None);
    }

    #[test]
    fn config_path_defaults_under_root() {
        let path = config_path(Path::new("/srv/app"), None);
        assert_eq!(path, Path::new("/srv/app/config/main.toml"));
    }

    #[test]
    fn config_path_honors_override() {
        let path = config_path(Path::new("/srv/app"), Some("/etc/fs2.toml".into()));
        assert_eq!(path, Path::new("/etc/fs2.toml"));
    }

    #[test]
    fn config_path_ignores_empty_override() {
        let path = config_path(Path::new("/srv/app"), Some(OsString::new()));
        assert_eq!(path, Path::new("/srv/app/config/main.toml"));
    }

    #[test]
    fn missing_file_yields_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.get("anything"), None);
    }

    #[test]
    fn malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.toml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"not = = toml").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn settings_defaults_cascade_from_root() {
        let root = Path::new("/srv/app");
        let mut config = Config::empty();

        let settings = Settings::resolve(root, &mut config);

        assert_eq!(settings.public_dir, root.join("public"));
        assert_eq!(settings.content_dir, root.join("public"));
        assert_eq!(settings.media_dir, root.join("public/media"));
        assert_eq!(settings.styles_dir, root.join("public/styles"));
        assert_eq!(settings.upload_dir, root.join("public/upload"));
        assert!(!settings.satellite);
        assert!(settings.debug);
        assert_eq!(settings.environment, "development");
        // Defaults are materialized into the shared document.
        assert_eq!(
            config.get_str("app.content"),
            Some(root.join("public").display().to_string().as_str())
        );
    }

    #[test]
    fn settings_follow_predefined_keys() {
        let root = Path::new("/srv/app");
        let mut config = parsed(
            r#"
            [app]
            content = "web"
            satellite = true
            debug = false
            env = "production"
            "#,
        );

        let settings = Settings::resolve(root, &mut config);

        assert_eq!(settings.content_dir, root.join("web"));
        assert_eq!(settings.media_dir, root.join("web/media"));
        assert!(settings.satellite);
        assert!(!settings.debug);
        assert_eq!(settings.environment, "production");
    }

    #[test]
    fn resolve_is_deterministic() {
        let root = Path::new("/srv/app");
        let mut a = Config::empty();
        let mut b = Config::empty();

        let first = Settings::resolve(root, &mut a);
        let second = Settings::resolve(root, &mut b);

        assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }
}
