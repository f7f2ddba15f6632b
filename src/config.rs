//! Generator configuration: defaults, built-in session mix, validation.

use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;

use crate::session::SessionSpec;

/// Default multicast group.
pub const DEFAULT_GROUP: Ipv4Addr = Ipv4Addr::new(224, 2, 200, 68);

/// Default base destination port; session `i` sends to `base + i`.
pub const DEFAULT_BASE_PORT: u16 = 12341;

/// Nominal tick interval, 50 Hz.
pub const NOMINAL_TICK: Duration = Duration::from_millis(20);

/// Shortest tick interval the margin adjustment may produce.
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// Upper bound on configured sessions.
pub const MAX_SESSIONS: usize = 10;

/// Largest payload; keeps packets below fragmentation on tunnels too.
pub const MAX_PAYLOAD: usize = 1400;

/// Sessions enabled by default.
pub const DEFAULT_ACTIVE_SESSIONS: usize = 4;

/// The built-in IETF-broadcast-style traffic mix. Rates are packets per tick
/// at the nominal 50 Hz tick, so e.g. 1/4 is 12.5 pps.
pub fn builtin_sessions() -> Vec<SessionSpec> {
    vec![
        SessionSpec::new("GSM Audio 1", 255, 320, 1, 4),
        SessionSpec::new("GSM Audio 2", 223, 320, 1, 4),
        SessionSpec::new("PCM Audio 1", 191, 160, 1, 1),
        SessionSpec::new("PCM Audio 2", 159, 160, 1, 1),
        SessionSpec::new("Assorted control and listener messages", 191, 50, 1, 1),
        SessionSpec::new("Video 1", 127, 512, 1, 2),
        SessionSpec::new("Video 2", 95, 512, 1, 2),
        SessionSpec::new("Test Application1", 63, MAX_PAYLOAD, 1, 1),
        SessionSpec::new("Test Application2", 63, MAX_PAYLOAD, 1, 1),
    ]
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not an IPv4 multicast group")]
    NotMulticast(Ipv4Addr),
    #[error("session count {got} out of range 1..={max}")]
    SessionCount { got: usize, max: usize },
    #[error("session table holds {got} entries, at most {MAX_SESSIONS} supported")]
    TableTooLarge { got: usize },
    #[error("session {name:?}: rate denominator must be positive")]
    ZeroDenominator { name: String },
    #[error("session {name:?}: payload {got} exceeds {MAX_PAYLOAD} bytes")]
    PayloadTooLarge { name: String, got: usize },
    #[error("base port {base} leaves no room for {sessions} session ports")]
    PortRange { base: u16, sessions: usize },
    #[error("failed reading session file {path}: {source}")]
    SessionFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed parsing session file {path}: {source}")]
    SessionFileParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Everything the scheduler needs, validated before the first tick.
#[derive(Debug, Clone)]
pub struct Config {
    pub group: Ipv4Addr,
    pub base_port: u16,
    pub sessions: Vec<SessionSpec>,
    /// Enabled prefix of `sessions`.
    pub active: usize,
    pub ttl_clamp: u8,
    /// Each margin step shortens the tick interval by 5% of nominal.
    pub margin: u8,
    pub chop: bool,
    /// Bank rate credit during silent chop windows and burst on resume.
    /// Off by default: silence normally must not cause a resume burst.
    pub accrue_while_silent: bool,
}

impl Config {
    pub fn new(sessions: Vec<SessionSpec>) -> Self {
        let active = DEFAULT_ACTIVE_SESSIONS.min(sessions.len());
        Self {
            group: DEFAULT_GROUP,
            base_port: DEFAULT_BASE_PORT,
            sessions,
            active,
            ttl_clamp: 255,
            margin: 0,
            chop: false,
            accrue_while_silent: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.group.is_multicast() {
            return Err(ConfigError::NotMulticast(self.group));
        }
        validate_sessions(&self.sessions)?;
        if self.active == 0 || self.active > self.sessions.len() {
            return Err(ConfigError::SessionCount {
                got: self.active,
                max: self.sessions.len(),
            });
        }
        if self
            .base_port
            .checked_add(self.sessions.len() as u16 - 1)
            .is_none()
        {
            return Err(ConfigError::PortRange {
                base: self.base_port,
                sessions: self.sessions.len(),
            });
        }
        Ok(())
    }

    /// Tick interval after the margin adjustment, floored at [`MIN_TICK`].
    pub fn tick_interval(&self) -> Duration {
        let nominal = NOMINAL_TICK.as_micros() as u64;
        let cut = nominal * self.margin as u64 / 20;
        Duration::from_micros(nominal.saturating_sub(cut)).max(MIN_TICK)
    }
}

/// Check a session table on its own, independent of the run parameters.
/// The listing path goes through this too, so a broken table fails with a
/// descriptive error before any rate arithmetic touches it.
pub fn validate_sessions(specs: &[SessionSpec]) -> Result<(), ConfigError> {
    if specs.len() > MAX_SESSIONS {
        return Err(ConfigError::TableTooLarge { got: specs.len() });
    }
    for spec in specs {
        if spec.rate_den == 0 {
            return Err(ConfigError::ZeroDenominator {
                name: spec.name.clone(),
            });
        }
        if spec.payload > MAX_PAYLOAD {
            return Err(ConfigError::PayloadTooLarge {
                name: spec.name.clone(),
                got: spec.payload,
            });
        }
    }
    Ok(())
}

/// Load a replacement session table from a YAML file.
pub fn load_session_file(path: &Path) -> Result<Vec<SessionSpec>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::SessionFileRead {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| ConfigError::SessionFileParse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = Config::new(builtin_sessions());
        assert_eq!(cfg.active, 4);
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_unicast_group() {
        let mut cfg = Config::new(builtin_sessions());
        cfg.group = Ipv4Addr::new(10, 0, 0, 1);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NotMulticast(_))
        ));
    }

    #[test]
    fn rejects_session_count_outside_table() {
        let mut cfg = Config::new(builtin_sessions());
        cfg.active = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::SessionCount { .. })
        ));
        cfg.active = cfg.sessions.len() + 1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::SessionCount { .. })
        ));
    }

    #[test]
    fn rejects_zero_denominator_and_oversized_payload() {
        let mut cfg = Config::new(vec![crate::session::SessionSpec::new("bad", 1, 64, 1, 0)]);
        cfg.active = 1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZeroDenominator { .. })
        ));
        let mut cfg = Config::new(vec![crate::session::SessionSpec::new(
            "fat",
            1,
            MAX_PAYLOAD + 1,
            1,
            1,
        )]);
        cfg.active = 1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn table_with_zero_denominator_fails_before_listing() {
        // A loaded table is checked on its own, so the listing path reports
        // the bad rate instead of dividing by it.
        let table = vec![crate::session::SessionSpec::new("bad", 1, 64, 1, 0)];
        assert!(matches!(
            validate_sessions(&table),
            Err(ConfigError::ZeroDenominator { .. })
        ));
    }

    #[test]
    fn demo_session_file_matches_builtin_mix() {
        let path =
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/ietf-mix.yaml");
        let specs = load_session_file(&path).unwrap();
        assert_eq!(specs, builtin_sessions());
        validate_sessions(&specs).unwrap();
    }

    #[test]
    fn session_file_errors_name_the_file() {
        let missing =
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/no-such-table.yaml");
        assert!(matches!(
            load_session_file(&missing),
            Err(ConfigError::SessionFileRead { .. })
        ));

        let bad = std::env::temp_dir().join("mcload-bad-table.yaml");
        std::fs::write(&bad, "- name: broken\n  ttl: not-a-number\n").unwrap();
        assert!(matches!(
            load_session_file(&bad),
            Err(ConfigError::SessionFileParse { .. })
        ));
        let _ = std::fs::remove_file(&bad);
    }

    #[test]
    fn margin_shortens_tick_with_floor() {
        let mut cfg = Config::new(builtin_sessions());
        assert_eq!(cfg.tick_interval(), Duration::from_millis(20));
        cfg.margin = 1;
        assert_eq!(cfg.tick_interval(), Duration::from_millis(19));
        cfg.margin = 4;
        assert_eq!(cfg.tick_interval(), Duration::from_millis(16));
        // Past 100% the floor holds.
        cfg.margin = 30;
        assert_eq!(cfg.tick_interval(), MIN_TICK);
    }
}
