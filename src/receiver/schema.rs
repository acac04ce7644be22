//! Required configuration keys per receiver type.

use crate::core::ReceiverType;
use crate::error::ValidationError;
use crate::value::Configuration;

const SLACK_KEYS: &[&str] = &["client_id", "client_secret", "auth_code"];
const PAGERDUTY_KEYS: &[&str] = &["service_key"];
const HTTP_KEYS: &[&str] = &["url"];

/// Returns the ordered list of keys a receiver of this type must configure,
/// or `None` if the type is not supported.
pub fn required_keys(receiver_type: &ReceiverType) -> Option<&'static [&'static str]> {
    match receiver_type {
        ReceiverType::Slack => Some(SLACK_KEYS),
        ReceiverType::PagerDuty => Some(PAGERDUTY_KEYS),
        ReceiverType::Http => Some(HTTP_KEYS),
        ReceiverType::Other(_) => None,
    }
}

/// Checks that `configuration` carries every key required for `receiver_type`.
///
/// Keys are checked in declared order and the first missing one is reported.
/// Extra keys are ignored.
pub fn validate(
    receiver_type: &ReceiverType,
    configuration: &Configuration,
) -> Result<(), ValidationError> {
    let keys = required_keys(receiver_type)
        .ok_or_else(|| ValidationError::UnsupportedReceiverType(receiver_type.to_string()))?;

    match keys.iter().find(|key| !configuration.contains_key(**key)) {
        Some(missing) => Err(ValidationError::MissingConfigKey(missing.to_string())),
        None => Ok(()),
    }
}
