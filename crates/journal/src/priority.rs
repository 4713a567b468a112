use std::fmt;

/// Journal severity levels matching the POSIX syslog(3) ordinal scale.
///
/// Container logging configuration selects a level by its `LOG_*` name; the
/// resolved ordinal is baked into the journald stream header and applies to
/// every line forwarded for that container. The discriminants are the
/// standard syslog ordinals, so `Priority::Error as i32 == 3` holds on every
/// platform.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum Priority {
    /// System is unusable (`LOG_EMERG`).
    Emergency = 0,
    /// Action must be taken immediately (`LOG_ALERT`).
    Alert = 1,
    /// Critical conditions (`LOG_CRIT`).
    Critical = 2,
    /// Error conditions (`LOG_ERR`).
    Error = 3,
    /// Warning conditions (`LOG_WARNING`).
    Warning = 4,
    /// Normal but significant condition (`LOG_NOTICE`).
    Notice = 5,
    /// Informational messages (`LOG_INFO`) — the default.
    Info = 6,
    /// Debug-level messages (`LOG_DEBUG`).
    Debug = 7,
}

impl Priority {
    /// Parses a configuration priority name into the corresponding level.
    ///
    /// Matching is an exact, case-sensitive comparison against the eight
    /// `LOG_*` names accepted by the container logging options schema.
    /// Returns `None` for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use journal::Priority;
    ///
    /// assert_eq!(Priority::from_name("LOG_WARNING"), Some(Priority::Warning));
    /// assert_eq!(Priority::from_name("log_warning"), None);
    /// assert_eq!(Priority::from_name("WARNING"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LOG_EMERG" => Some(Self::Emergency),
            "LOG_ALERT" => Some(Self::Alert),
            "LOG_CRIT" => Some(Self::Critical),
            "LOG_ERR" => Some(Self::Error),
            "LOG_WARNING" => Some(Self::Warning),
            "LOG_NOTICE" => Some(Self::Notice),
            "LOG_INFO" => Some(Self::Info),
            "LOG_DEBUG" => Some(Self::Debug),
            _ => None,
        }
    }

    /// Resolves an optional configured priority name, applying the default.
    ///
    /// `None` resolves silently to [`Priority::Info`]. A configured string
    /// that is empty or does not name one of the eight levels also resolves
    /// to [`Priority::Info`], with exactly one warning diagnostic so a typo
    /// in the container configuration is visible on the host.
    pub fn resolve(configured: Option<&str>) -> Self {
        let Some(name) = configured else {
            return Self::Info;
        };
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!(
                priority = name,
                "could not parse journald priority, using LOG_INFO"
            );
            Self::Info
        })
    }

    /// Returns the priority name as it appears in container configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "LOG_EMERG",
            Self::Alert => "LOG_ALERT",
            Self::Critical => "LOG_CRIT",
            Self::Error => "LOG_ERR",
            Self::Warning => "LOG_WARNING",
            Self::Notice => "LOG_NOTICE",
            Self::Info => "LOG_INFO",
            Self::Debug => "LOG_DEBUG",
        }
    }

    /// Returns the syslog ordinal carried in the journald stream header.
    pub const fn as_ordinal(self) -> i32 {
        self as i32
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
