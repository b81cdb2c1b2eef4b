//! Focus Types - wire structures for the Dida365 focus operation log
//!
//! Field names and casing must match the desktop web client exactly; the
//! batch endpoint silently misbehaves on unknown or missing keys.

use serde::{Deserialize, Serialize};

/// Upper bound the web client enforces on focus notes.
pub const MAX_NOTE_LEN: usize = 512;

/// Object type discriminator for pomodoro entries. Fixed by the protocol.
pub const FOCUS_OBJECT_TYPE: i64 = 0;

/// Verbs accepted by the focus batch endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusOp {
    Start,
    Pause,
    Continue,
    Finish,
    Drop,
    Exit,
}

impl std::fmt::Display for FocusOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Pause => write!(f, "pause"),
            Self::Continue => write!(f, "continue"),
            Self::Finish => write!(f, "finish"),
            Self::Drop => write!(f, "drop"),
            Self::Exit => write!(f, "exit"),
        }
    }
}

/// One entry in the remote operation log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusOperation {
    /// Fresh ObjectId for this log entry
    pub id: String,
    /// Target focus session id
    pub o_id: String,
    /// Always [`FOCUS_OBJECT_TYPE`] for pomodoros
    pub o_type: i64,
    pub op: FocusOp,
    /// Session length in minutes
    pub duration: i64,
    /// Id of the session that started the current chain
    pub first_focus_id: String,
    /// Linked task/list/habit id, empty string when unlinked
    pub focus_on_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_on_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_on_title: Option<String>,
    pub auto_pomo_left: i64,
    pub pomo_count: i64,
    pub manual: bool,
    pub note: String,
    /// Millisecond-precision UTC timestamp with a literal `+0000` suffix
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<i64>,
}

/// Batch request body: pointer plus zero or more operations.
/// An empty `opList` is a state-only query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusBatchRequest {
    pub last_point: i64,
    pub op_list: Vec<FocusOperation>,
}

fn default_duration() -> i64 {
    25
}

fn default_auto_pomo_left() -> i64 {
    5
}

fn default_pomo_count() -> i64 {
    1
}

fn default_true() -> bool {
    true
}

/// Parameters for starting a focus session
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartOptions {
    pub duration: i64,
    pub auto_pomo_left: i64,
    pub pomo_count: i64,
    pub manual: bool,
    pub note: String,
    pub focus_on_id: String,
    pub focus_on_type: Option<i64>,
    pub focus_on_title: Option<String>,
    /// Overrides the cached sync pointer for this submission only
    pub last_point: Option<i64>,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            auto_pomo_left: default_auto_pomo_left(),
            pomo_count: default_pomo_count(),
            manual: default_true(),
            note: String::new(),
            focus_on_id: String::new(),
            focus_on_type: None,
            focus_on_title: None,
            last_point: None,
        }
    }
}

/// Parameters for pause/continue/finish. Absent fields fall back to the
/// cached session values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlOptions {
    pub manual: Option<bool>,
    pub note: Option<String>,
    pub focus_on_type: Option<i64>,
    pub focus_on_title: Option<String>,
    pub last_point: Option<i64>,
}

/// Parameters for stop (drop, optionally chased by exit)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopOptions {
    pub manual: Option<bool>,
    pub note: Option<String>,
    pub focus_on_type: Option<i64>,
    pub focus_on_title: Option<String>,
    pub last_point: Option<i64>,
    pub include_exit: bool,
}

impl Default for StopOptions {
    fn default() -> Self {
        Self {
            manual: None,
            note: None,
            focus_on_type: None,
            focus_on_title: None,
            last_point: None,
            include_exit: true,
        }
    }
}

impl StopOptions {
    /// The pause/continue/finish-shaped subset of these options.
    pub fn control(&self) -> ControlOptions {
        ControlOptions {
            manual: self.manual,
            note: self.note.clone(),
            focus_on_type: self.focus_on_type,
            focus_on_title: self.focus_on_title.clone(),
            last_point: self.last_point,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_serializes_with_camel_case_keys() {
        let op = FocusOperation {
            id: "6915ae6838b6e20c76868c45".to_string(),
            o_id: "6915ae6838b6e20c76868c44".to_string(),
            o_type: FOCUS_OBJECT_TYPE,
            op: FocusOp::Start,
            duration: 25,
            first_focus_id: "6915ae6838b6e20c76868c44".to_string(),
            focus_on_id: String::new(),
            focus_on_type: None,
            focus_on_title: None,
            auto_pomo_left: 5,
            pomo_count: 1,
            manual: true,
            note: String::new(),
            time: "2025-11-13T10:09:44.765+0000".to_string(),
            created_time: Some(1763028584765),
        };

        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["oId"], "6915ae6838b6e20c76868c44");
        assert_eq!(json["op"], "start");
        assert_eq!(json["firstFocusId"], "6915ae6838b6e20c76868c44");
        assert_eq!(json["autoPomoLeft"], 5);
        // Absent optionals must not appear at all
        assert!(json.get("focusOnType").is_none());
        assert!(json.get("focusOnTitle").is_none());
    }

    #[test]
    fn test_batch_request_keys() {
        let request = FocusBatchRequest {
            last_point: 42,
            op_list: vec![],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["lastPoint"], 42);
        assert_eq!(json["opList"], serde_json::json!([]));
    }

    #[test]
    fn test_start_options_defaults() {
        let options: StartOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.duration, 25);
        assert_eq!(options.auto_pomo_left, 5);
        assert_eq!(options.pomo_count, 1);
        assert!(options.manual);
        assert!(options.note.is_empty());
        assert!(options.last_point.is_none());
    }

    #[test]
    fn test_stop_options_default_includes_exit() {
        let options: StopOptions = serde_json::from_str("{}").unwrap();
        assert!(options.include_exit);

        let options: StopOptions =
            serde_json::from_str(r#"{"includeExit": false, "note": "cut short"}"#).unwrap();
        assert!(!options.include_exit);
        assert_eq!(options.control().note.as_deref(), Some("cut short"));
    }
}
