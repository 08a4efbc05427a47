#[cfg(test)]
mod tests {
    use crate::domain::copy::{CopyOutcome, CopyState};
    use crate::domain::error::{AppError, ErrorCode};
    use crate::domain::shortcut::{HotKey, KeyEvent, Platform};
    use crate::domain::text::PersistedText;

    #[test]
    fn test_persisted_text_shape() {
        let json = serde_json::to_value(PersistedText::new("hello")).unwrap();
        assert_eq!(json, serde_json::json!({ "value": "hello" }));
    }

    #[test]
    fn test_persisted_text_rejects_other_shapes() {
        assert!(serde_json::from_value::<PersistedText>(serde_json::json!("hello")).is_err());
        assert!(serde_json::from_value::<PersistedText>(serde_json::json!({ "v": 1 })).is_err());
    }

    #[test]
    fn test_key_event_deserialization() {
        let event: KeyEvent =
            serde_json::from_str(r#"{"key":"c","metaKey":true,"shiftKey":false}"#).unwrap();
        assert_eq!(event, KeyEvent::new("c").meta());
    }

    #[test]
    fn test_key_binding_serialization() {
        let binding = HotKey::new("c").with_cmd().resolve(Platform::Windows);
        let json = serde_json::to_value(&binding).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": "c",
                "metaKey": false,
                "ctrlKey": true,
                "altKey": false,
                "shiftKey": false
            })
        );
    }

    #[test]
    fn test_copy_state_serialization() {
        assert_eq!(serde_json::to_string(&CopyState::Idle).unwrap(), "\"idle\"");
        assert_eq!(serde_json::to_string(&CopyState::Copied).unwrap(), "\"copied\"");
        assert_eq!(
            serde_json::to_string(&CopyOutcome::HiddenOnly).unwrap(),
            "\"hidden_only\""
        );
        for state in [CopyState::Idle, CopyState::Copied] {
            assert_eq!(
                serde_json::to_value(state).unwrap(),
                serde_json::Value::from(state.as_str())
            );
        }
    }

    #[test]
    fn test_error_code_serialization() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::Clipboard).unwrap(),
            "\"E_CLIPBOARD\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorCode::Storage).unwrap(),
            "\"E_STORAGE\""
        );
    }

    #[test]
    fn test_app_error_serialization() {
        let err = AppError::window("見つかりません");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("E_WINDOW"));
        assert!(json.contains("recoverable"));
    }
}
