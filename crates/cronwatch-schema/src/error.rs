use serde::{Deserialize, Serialize};

/// A failure surfaced as data: message plus an ordered stack of frames.
///
/// The tag string `"PythonError"` is part of the wire contract and is kept
/// even though nothing here is Python — consumers dispatch on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PythonError {
    pub message: String,
    pub stack: Vec<String>,
    /// The underlying failure, when one exists. Modeled one level deep;
    /// deeper chains are flattened into the cause's stack.
    pub cause: Option<PythonErrorCause>,
}

impl PythonError {
    pub fn new(message: impl Into<String>, stack: Vec<String>) -> Self {
        Self {
            message: message.into(),
            stack,
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: PythonErrorCause) -> Self {
        self.cause = Some(cause);
        self
    }
}

/// The causing error of a [`PythonError`] — message and stack only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PythonErrorCause {
    pub message: String,
    pub stack: Vec<String>,
}

/// The instance has no scheduling daemon configured at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerNotDefinedError {
    pub message: String,
}

/// The selector named a schedule that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleNotFoundError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cause_is_optional_and_absent_by_default() {
        let err = PythonError::new("boom", vec!["frame".into()]);
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["message"], "boom");
        assert!(v["cause"].is_null());
    }

    #[test]
    fn cause_round_trips() {
        let err = PythonError::new("outer", vec!["f1".into()]).with_cause(PythonErrorCause {
            message: "inner".into(),
            stack: vec!["f2".into(), "f3".into()],
        });
        let json = serde_json::to_string(&err).unwrap();
        let back: PythonError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
        assert_eq!(back.cause.unwrap().stack.len(), 2);
    }

    #[test]
    fn missing_cause_field_deserializes_to_none() {
        let back: PythonError =
            serde_json::from_str(r#"{"message":"m","stack":[]}"#).unwrap();
        assert!(back.cause.is_none());
    }
}
