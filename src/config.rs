use std::path::{Path, PathBuf};

use crate::client::{ClientConfig, UnitSystem};
use crate::error::{Error, Result};

/// One configuration source. Unset entries fall through to the next source.
#[derive(Debug, Default, PartialEq)]
struct Settings {
    key: Option<String>,
    host: Option<String>,
    units: Option<String>,
    ssl: Option<bool>,
}

/// Builds a configuration from (in order of precedence) the explicit
/// `api_key`, the `OWM_API_KEY`/`OWM_HOST`/`OWM_UNITS` environment variables
/// and the first rc file found.
pub(crate) fn load_config(api_key: Option<String>) -> Result<ClientConfig> {
    let primary = env_settings(api_key, env_var);
    let fallback = if primary.is_complete() {
        None
    } else {
        find_rc()?
    };
    build(merge(primary, fallback))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_settings(api_key: Option<String>, lookup: impl Fn(&str) -> Option<String>) -> Settings {
    Settings {
        key: api_key.or_else(|| lookup("OWM_API_KEY")),
        host: lookup("OWM_HOST"),
        units: lookup("OWM_UNITS"),
        ssl: None,
    }
}

fn find_rc() -> Result<Option<Settings>> {
    for rc_path in rc_candidates() {
        if rc_path.exists() {
            let cfg = read_rc(&rc_path).map_err(|source| {
                let err = Error::Config {
                    path: rc_path.clone(),
                    source,
                };
                log::error!("{err}");
                err
            })?;
            log::debug!("read configuration from {}", rc_path.display());
            return Ok(Some(cfg));
        }
    }
    Ok(None)
}

fn merge(primary: Settings, fallback: Option<Settings>) -> Settings {
    let Some(fallback) = fallback else {
        return primary;
    };
    Settings {
        key: primary.key.or(fallback.key),
        host: primary.host.or(fallback.host),
        units: primary.units.or(fallback.units),
        ssl: primary.ssl.or(fallback.ssl),
    }
}

fn build(settings: Settings) -> Result<ClientConfig> {
    let mut config = ClientConfig::new(settings.key);
    if let Some(host) = settings.host {
        config = config.with_host(host);
    }
    if let Some(units) = settings.units {
        config = config.with_units(UnitSystem::try_from(units.as_str())?);
    }
    if let Some(ssl) = settings.ssl {
        config = config.with_ssl(ssl);
    }
    Ok(config)
}

impl Settings {
    fn is_complete(&self) -> bool {
        self.key.is_some() && self.host.is_some() && self.units.is_some()
    }

    fn set(&mut self, key: &str, value: &str) {
        match key {
            "key" => self.key = Some(value.to_string()),
            "host" => self.host = Some(value.to_string()),
            "units" => self.units = Some(value.to_string()),
            "ssl" => self.ssl = Some(!matches!(value, "0" | "false" | "no")),
            _ => {}
        }
    }
}

fn read_rc(path: &Path) -> std::io::Result<Settings> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

fn parse_rc(text: &str) -> Settings {
    let mut cfg = Settings::default();

    // `key:` may sit on one line with the token on the next.
    let mut pending_key: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(pk) = pending_key.take() {
            if !line.contains(':') {
                cfg.set(pk, strip_quotes(line));
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim();
            let v = strip_quotes(v.trim());
            if v.is_empty() {
                pending_key = Some(k);
            } else {
                cfg.set(k, v);
            }
        }
    }

    cfg
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates() -> Vec<PathBuf> {
    // 1) OWM_RC (explicit)
    // 2) ./.owmrc
    // 3) ~/.owmrc
    if let Ok(p) = std::env::var("OWM_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".owmrc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".owmrc"));
    }
    v
}
