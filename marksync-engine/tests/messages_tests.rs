use marksync_engine::{MessageAck, UiCommand, UiMessage};
use pretty_assertions::assert_eq;

#[test]
fn recommendation_message_wire_shape() {
    let message = UiMessage::ShowFolderRecommendation {
        bookmark_title: "Example".into(),
        recommended_folder: "Research".into(),
        bookmark_id: "b-1".into(),
        confidence: 0.85,
        reason: "looks related".into(),
        is_already_in_folder: false,
    };

    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "type": "SHOW_FOLDER_RECOMMENDATION",
            "bookmarkTitle": "Example",
            "recommendedFolder": "Research",
            "bookmarkId": "b-1",
            "confidence": 0.85,
            "reason": "looks related",
            "isAlreadyInFolder": false
        })
    );
}

#[test]
fn processing_and_error_messages_round_trip() {
    let value = serde_json::to_value(UiMessage::ShowAiProcessing).unwrap();
    assert_eq!(value, serde_json::json!({ "type": "SHOW_AI_PROCESSING" }));

    let parsed: UiMessage = serde_json::from_value(serde_json::json!({
        "type": "SHOW_AI_ERROR",
        "message": "model timeout"
    }))
    .unwrap();
    assert_eq!(
        parsed,
        UiMessage::ShowAiError {
            message: "model timeout".into()
        }
    );
}

#[test]
fn inbound_commands_parse() {
    let accept: UiCommand = serde_json::from_value(serde_json::json!({
        "type": "ACCEPT_FOLDER_RECOMMENDATION",
        "bookmarkId": "b-1"
    }))
    .unwrap();
    assert_eq!(
        accept,
        UiCommand::AcceptFolderRecommendation {
            bookmark_id: "b-1".into()
        }
    );

    let dismiss: UiCommand = serde_json::from_value(serde_json::json!({
        "type": "DISMISS_FOLDER_RECOMMENDATION",
        "bookmarkId": "b-1"
    }))
    .unwrap();
    assert_eq!(
        dismiss,
        UiCommand::DismissFolderRecommendation {
            bookmark_id: "b-1".into()
        }
    );
}

#[test]
fn ack_omits_absent_error() {
    let ok = serde_json::to_value(MessageAck::ok()).unwrap();
    assert_eq!(ok, serde_json::json!({ "success": true }));

    let err = serde_json::to_value(MessageAck::err("no pending recommendation")).unwrap();
    assert_eq!(
        err,
        serde_json::json!({ "success": false, "error": "no pending recommendation" })
    );
}
