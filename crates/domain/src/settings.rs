//! Data source instance settings
//!
//! Non-secret connection options are stored as plain JSON (`jsonData`). The
//! password lives in the host's secure store: the plugin only ever writes it
//! (`secureJsonData`) and reads back a "configured" flag (`secureJsonFields`).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};

/// Name of the secure field holding the database password.
pub const PASSWORD_FIELD: &str = "password";

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MIN;

/// A connection-pool duration such as `maxIdleTime`.
///
/// Accepts either a number of nanoseconds (integer or float) or a duration
/// string (`"1m"`, `"1h30m"`, `"250ms"`) and is written back as a duration
/// string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct PoolDuration(Duration);

impl PoolDuration {
    /// Wraps a standard duration.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// Returns the wrapped duration.
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        self.0
    }

    /// Parses a duration string.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidDuration` for malformed input or unknown units.
    pub fn parse(input: &str) -> DomainResult<Self> {
        parse_duration(input).map(Self)
    }
}

impl fmt::Display for PoolDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl Serialize for PoolDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PoolDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Nanos(u64),
            Float(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Nanos(nanos) => Ok(Self(Duration::from_nanos(nanos))),
            Raw::Float(nanos) => Duration::try_from_secs_f64(nanos / 1e9)
                .map(Self)
                .map_err(|_| {
                    serde::de::Error::custom(DomainError::InvalidDuration(nanos.to_string()))
                }),
            Raw::Text(text) => Self::parse(&text).map_err(serde::de::Error::custom),
        }
    }
}

fn parse_duration(input: &str) -> DomainResult<Duration> {
    let invalid = || DomainError::InvalidDuration(input.to_string());

    let text = input.strip_prefix('+').unwrap_or(input);
    // An untouched form field is saved as an empty string.
    if text.is_empty() || text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut rest = text;
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);

        let unit_nanos = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SEC,
            "m" => NANOS_PER_MIN,
            "h" => NANOS_PER_HOUR,
            _ => return Err(invalid()),
        };

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(invalid());
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction_nanos = if fraction.is_empty() {
            0
        } else {
            // Digits beyond nanosecond precision cannot change the result.
            let digits = &fraction[..fraction.len().min(18)];
            let scale = u32::try_from(digits.len()).map_err(|_| invalid())?;
            let value: u128 = digits.parse().map_err(|_| invalid())?;
            value * unit_nanos / 10u128.pow(scale)
        };

        total = whole
            .checked_mul(unit_nanos)
            .and_then(|nanos| nanos.checked_add(fraction_nanos))
            .and_then(|nanos| total.checked_add(nanos))
            .ok_or_else(invalid)?;
        rest = next;
    }

    u64::try_from(total)
        .map(Duration::from_nanos)
        .map_err(|_| invalid())
}

fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{nanos}ns");
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", format_fraction(nanos, NANOS_PER_MICRO));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", format_fraction(nanos, NANOS_PER_MILLI));
    }

    let hours = nanos / NANOS_PER_HOUR;
    let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MIN;
    let seconds = format_fraction(nanos % NANOS_PER_MIN, NANOS_PER_SEC);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Formats `nanos / unit` with trailing zeros of the fraction removed.
fn format_fraction(nanos: u128, unit: u128) -> String {
    let whole = nanos / unit;
    let fraction = nanos % unit;
    if fraction == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{fraction:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Non-secret connection options (`jsonData`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSourceOptions {
    /// Database user.
    pub user: String,
    /// Database host name.
    pub hostname: String,
    /// Listener port.
    pub port: u16,
    /// Oracle service name.
    pub service: String,
    /// Maximum number of open connections in the pool.
    pub max_open_conns: u32,
    /// Maximum number of idle connections in the pool.
    pub max_idle_conns: u32,
    /// How long a connection may stay idle before it is closed.
    pub max_idle_time: PoolDuration,
    /// Maximum lifetime of a pooled connection.
    pub max_life_time: PoolDuration,
    /// Time zone used to interpret timestamps without zone information.
    pub timezone: String,
}

/// Write-only secret values (`secureJsonData`).
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecureJsonData {
    /// Database password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for SecureJsonData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureJsonData")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A single edit made in the configuration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEdit {
    /// Sets the database user.
    User(String),
    /// Sets the host name.
    Hostname(String),
    /// Sets the listener port.
    Port(u16),
    /// Sets the service name.
    Service(String),
    /// Sets the maximum number of open connections.
    MaxOpenConns(u32),
    /// Sets the maximum number of idle connections.
    MaxIdleConns(u32),
    /// Sets the idle timeout from a duration string.
    MaxIdleTime(String),
    /// Sets the connection lifetime from a duration string.
    MaxLifeTime(String),
    /// Sets the time zone; `None` clears it.
    TimeZone(Option<String>),
    /// Enters a new password.
    Password(String),
    /// Discards the stored password.
    ResetPassword,
}

/// Settings of one data source instance as persisted by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSettings {
    /// Unique identifier of the instance.
    #[serde(default)]
    pub uid: String,

    /// Display name of the instance.
    #[serde(default)]
    pub name: String,

    /// Optional URL shown by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Non-secret options.
    #[serde(default)]
    pub json_data: DataSourceOptions,

    /// Which secure fields hold a stored value.
    #[serde(default)]
    pub secure_json_fields: BTreeMap<String, bool>,

    /// Secret values entered since the last save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure_json_data: Option<SecureJsonData>,
}

impl DataSourceSettings {
    /// Creates settings for a new instance.
    #[must_use]
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns true if the host reports a stored password.
    #[must_use]
    pub fn is_password_configured(&self) -> bool {
        self.secure_json_fields
            .get(PASSWORD_FIELD)
            .copied()
            .unwrap_or(false)
    }

    /// Returns the password entered since the last save, if any.
    #[must_use]
    pub fn pending_password(&self) -> Option<&str> {
        self.secure_json_data
            .as_ref()
            .and_then(|data| data.password.as_deref())
    }

    /// Enters a new password.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.secure_json_data = Some(SecureJsonData {
            password: Some(password.into()),
        });
    }

    /// Discards the stored password.
    ///
    /// Both the configured flag and the pending value are cleared, so the next
    /// save either carries a fresh password or leaves it unset.
    pub fn reset_password(&mut self) {
        self.secure_json_fields.insert(PASSWORD_FIELD.to_string(), false);
        let mut data = self.secure_json_data.take().unwrap_or_default();
        data.password = Some(String::new());
        self.secure_json_data = Some(data);
    }

    /// Applies a configuration form edit.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidDuration` if a pool duration is malformed;
    /// the settings are left unchanged in that case.
    pub fn apply(&mut self, edit: ConfigEdit) -> DomainResult<()> {
        match edit {
            ConfigEdit::Password(password) => self.set_password(password),
            ConfigEdit::ResetPassword => self.reset_password(),
            ConfigEdit::User(user) => self.json_data.user = user,
            ConfigEdit::Hostname(hostname) => self.json_data.hostname = hostname,
            ConfigEdit::Port(port) => self.json_data.port = port,
            ConfigEdit::Service(service) => self.json_data.service = service,
            ConfigEdit::MaxOpenConns(count) => self.json_data.max_open_conns = count,
            ConfigEdit::MaxIdleConns(count) => self.json_data.max_idle_conns = count,
            ConfigEdit::MaxIdleTime(text) => {
                self.json_data.max_idle_time = PoolDuration::parse(&text)?;
            }
            ConfigEdit::MaxLifeTime(text) => {
                self.json_data.max_life_time = PoolDuration::parse(&text)?;
            }
            ConfigEdit::TimeZone(timezone) => {
                self.json_data.timezone = timezone.unwrap_or_default();
            }
        }
        Ok(())
    }
}

/// Change to the stored password requested by a save.
#[derive(Clone, PartialEq, Eq)]
pub enum SecretUpdate {
    /// Leave the stored value as it is.
    Keep,
    /// Store a new value.
    Set(String),
    /// Remove the stored value.
    Clear,
}

impl fmt::Debug for SecretUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => f.write_str("Keep"),
            Self::Set(_) => f.write_str("Set(<redacted>)"),
            Self::Clear => f.write_str("Clear"),
        }
    }
}

impl DataSourceSettings {
    /// Splits the settings into what is persisted in plain JSON and the
    /// password change for the secure store.
    ///
    /// The returned settings never carry secret values, and the `password`
    /// configured flag reflects the stored state after the update.
    #[must_use]
    pub fn into_persisted(mut self) -> (Self, SecretUpdate) {
        let pending = self.secure_json_data.take().and_then(|data| data.password);
        let update = match pending {
            Some(password) if password.is_empty() => SecretUpdate::Clear,
            Some(password) => SecretUpdate::Set(password),
            None => SecretUpdate::Keep,
        };

        match update {
            SecretUpdate::Set(_) => {
                self.secure_json_fields.insert(PASSWORD_FIELD.to_string(), true);
            }
            SecretUpdate::Clear => {
                self.secure_json_fields.insert(PASSWORD_FIELD.to_string(), false);
            }
            SecretUpdate::Keep => {}
        }
        (self, update)
    }
}

/// Decrypted secrets as seen by the query backend.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SecretPluginSettings {
    /// Database password, empty if none is stored.
    pub password: String,
}

impl fmt::Debug for SecretPluginSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretPluginSettings")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings as loaded by the query backend: options plus decrypted secrets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PluginSettings {
    /// Connection options.
    pub options: DataSourceOptions,
    /// Decrypted secrets.
    pub secrets: SecretPluginSettings,
}

impl PluginSettings {
    /// Builds the backend view from instance settings and the decrypted
    /// secure map. A missing password is read as empty.
    #[must_use]
    pub fn from_settings(
        settings: &DataSourceSettings,
        decrypted_secure_json_data: &HashMap<String, String>,
    ) -> Self {
        Self {
            options: settings.json_data.clone(),
            secrets: SecretPluginSettings {
                password: decrypted_secure_json_data
                    .get(PASSWORD_FIELD)
                    .cloned()
                    .unwrap_or_default(),
            },
        }
    }
}
