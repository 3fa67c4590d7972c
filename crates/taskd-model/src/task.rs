use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    duration::parse_duration,
    error::{DurationField, ValidationError},
};

/// Deadline applied when neither `timeout` nor `interval` is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Smallest accepted `interval`.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);
/// Smallest accepted `splice`.
pub const MIN_SPLICE: Duration = Duration::from_millis(10);

/// Task entry exactly as written in the config document.
///
/// Durations are kept as strings; [`TaskDef::validate`] turns the entry into a [`Task`].
/// An empty duration string is treated the same as a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDef {
    #[serde(default)]
    pub name: String,
    /// Shell script to run.
    #[serde(default, alias = "command")]
    pub cmd: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

impl TaskDef {
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
            ..Default::default()
        }
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    pub fn with_splice(mut self, splice: impl Into<String>) -> Self {
        self.splice = Some(splice.into());
        self
    }

    /// Checked against `interval` by [`TaskDef::validate`].
    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Check the entry and compute its effective timeout.
    ///
    /// `index` is the entry position in the document, used to point at nameless entries.
    ///
    /// Effective timeout:
    /// - `timeout` when set (must not exceed `interval` when that is set too);
    /// - otherwise `interval` when set;
    /// - otherwise [`DEFAULT_TIMEOUT`].
    pub fn validate(&self, index: usize) -> Result<Task, ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName { index });
        }

        let interval = self.bounded(DurationField::Interval, Some(MIN_INTERVAL))?;
        let splice = self.bounded(DurationField::Splice, Some(MIN_SPLICE))?;
        let timeout = match self.bounded(DurationField::Timeout, None)? {
            Some(timeout) => {
                if let Some(interval) = interval
                    && timeout > interval
                {
                    return Err(ValidationError::TimeoutExceedsInterval {
                        task: self.name.clone(),
                        timeout,
                        interval,
                    });
                }
                timeout
            }
            None => interval.unwrap_or(DEFAULT_TIMEOUT),
        };

        Ok(Task {
            name: self.name.clone(),
            command: self.cmd.clone(),
            interval,
            splice,
            timeout,
        })
    }

    fn raw(&self, field: DurationField) -> Option<&str> {
        let value = match field {
            DurationField::Interval => self.interval.as_deref(),
            DurationField::Splice => self.splice.as_deref(),
            DurationField::Timeout => self.timeout.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn bounded(
        &self,
        field: DurationField,
        min: Option<Duration>,
    ) -> Result<Option<Duration>, ValidationError> {
        let Some(raw) = self.raw(field) else {
            return Ok(None);
        };
        let value = parse_duration(raw).map_err(|source| ValidationError::InvalidDuration {
            task: self.name.clone(),
            field,
            source,
        })?;
        if let Some(min) = min
            && value < min
        {
            return Err(ValidationError::TooSmall {
                task: self.name.clone(),
                field,
                value: raw.to_string(),
                min,
            });
        }
        Ok(Some(value))
    }
}

/// Validated, immutable task.
///
/// Every `Task` has a non-empty name and a timeout that does not exceed its interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    name: String,
    command: String,
    interval: Option<Duration>,
    splice: Option<Duration>,
    timeout: Duration,
}

impl Task {
    /// Task without interval or splice, using [`DEFAULT_TIMEOUT`].
    ///
    /// Returns `None` for an empty name.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            command: command.into(),
            interval: None,
            splice: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn command(&self) -> &str {
        &self.command
    }

    #[inline]
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    #[inline]
    pub fn splice(&self) -> Option<Duration> {
        self.splice
    }

    /// Effective execution deadline.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DurationParseError;

    #[test]
    fn default_timeout_without_interval() {
        let task = TaskDef::new("ping", "echo ok").validate(0).unwrap();
        assert_eq!(task.name(), "ping");
        assert_eq!(task.command(), "echo ok");
        assert_eq!(task.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(task.timeout(), Duration::from_secs(60));
        assert!(task.interval().is_none());
        assert!(task.splice().is_none());
    }

    #[test]
    fn timeout_follows_interval() {
        let task = TaskDef::new("t", "true")
            .with_interval("30s")
            .validate(0)
            .unwrap();
        assert_eq!(task.interval(), Some(Duration::from_secs(30)));
        assert_eq!(task.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn explicit_timeout_wins() {
        let task = TaskDef::new("t", "true")
            .with_interval("1m")
            .with_timeout("10s")
            .with_splice("50ms")
            .validate(0)
            .unwrap();
        assert_eq!(task.timeout(), Duration::from_secs(10));
        assert_eq!(task.splice(), Some(Duration::from_millis(50)));

        let equal = TaskDef::new("t", "true")
            .with_interval("1m")
            .with_timeout("60s")
            .validate(0)
            .unwrap();
        assert_eq!(equal.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn timeout_without_interval_has_no_minimum() {
        let task = TaskDef::new("t", "true")
            .with_timeout("1ms")
            .validate(0)
            .unwrap();
        assert_eq!(task.timeout(), Duration::from_millis(1));
    }

    #[test]
    fn timeout_exceeding_interval_is_rejected() {
        let err = TaskDef::new("t", "true")
            .with_interval("1s")
            .with_timeout("2s")
            .validate(0)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TimeoutExceedsInterval {
                task: "t".into(),
                timeout: Duration::from_secs(2),
                interval: Duration::from_secs(1),
            }
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = TaskDef::new("", "true").validate(3).unwrap_err();
        assert_eq!(err, ValidationError::EmptyName { index: 3 });
        assert!(err.task().is_none());
    }

    #[test]
    fn minimums_are_enforced() {
        let err = TaskDef::new("t", "true")
            .with_interval("99ms")
            .validate(0)
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TooSmall { field: DurationField::Interval, min, .. } if min == MIN_INTERVAL
        ));

        let err = TaskDef::new("t", "true")
            .with_splice("9ms")
            .validate(0)
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::TooSmall { field: DurationField::Splice, .. }
        ));

        assert!(TaskDef::new("t", "true").with_interval("100ms").validate(0).is_ok());
        assert!(TaskDef::new("t", "true").with_splice("10ms").validate(0).is_ok());
    }

    #[test]
    fn unparseable_duration_is_rejected() {
        let err = TaskDef::new("t", "true")
            .with_timeout("soon")
            .validate(0)
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidDuration {
                field: DurationField::Timeout,
                source: DurationParseError::InvalidFormat(_),
                ..
            }
        ));
        assert_eq!(err.task(), Some("t"));
    }

    #[test]
    fn empty_duration_strings_count_as_unset() {
        let task = TaskDef::new("t", "true")
            .with_interval("")
            .with_timeout(" ")
            .validate(0)
            .unwrap();
        assert_eq!(task.timeout(), DEFAULT_TIMEOUT);
        assert!(task.interval().is_none());
    }

    #[test]
    fn empty_command_is_valid() {
        let task = TaskDef::new("noop", "").validate(0).unwrap();
        assert_eq!(task.command(), "");
    }

    #[test]
    fn deserializes_with_command_alias() {
        let def: TaskDef = serde_yaml::from_str("name: a\ncommand: echo hi\ntimeout: 5s").unwrap();
        assert_eq!(def.cmd, "echo hi");
        assert_eq!(def.timeout.as_deref(), Some("5s"));

        let def: TaskDef = serde_yaml::from_str("name: a\ncmd: echo hi").unwrap();
        assert_eq!(def.cmd, "echo hi");

        assert!(serde_yaml::from_str::<TaskDef>("name: a\ncmd: x\ntimeuot: 5s").is_err());
    }

    #[test]
    fn direct_construction_uses_default_timeout() {
        let task = Task::new("disk", "df -h").unwrap();
        assert_eq!(task.timeout(), DEFAULT_TIMEOUT);
        assert!(task.interval().is_none());
        assert!(Task::new("", "true").is_none());
    }
}
