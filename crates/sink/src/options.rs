/// Per-container logging options relevant to a sink.
///
/// An immutable snapshot of the `journaldOptions` record from the container
/// logging configuration. Parsing of the surrounding schema is the plugin
/// host's job; sinks only consume the resolved record. With the `serde` feature enabled
/// the struct deserializes straight out of that configuration.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoggingOptions {
    /// Journal priority name, for example `"LOG_WARNING"`.
    ///
    /// `None` and unrecognised names both resolve to `LOG_INFO`; see
    /// `journal::Priority::resolve`.
    pub priority: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_priority() {
        assert_eq!(LoggingOptions::default().priority, None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_from_container_config_json() {
        let options: LoggingOptions =
            serde_json::from_str(r#"{"priority":"LOG_ERR"}"#).expect("parse options record");
        assert_eq!(options.priority.as_deref(), Some("LOG_ERR"));

        let options: LoggingOptions = serde_json::from_str("{}").expect("parse empty record");
        assert_eq!(options.priority, None);
    }
}
