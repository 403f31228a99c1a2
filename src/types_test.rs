use super::*;

fn detection_json(score: f64) -> serde_json::Value {
    serde_json::json!({
        "id": "d-1",
        "detection_type": "text",
        "threat_score": score,
        "confidence_score": 0.9,
        "threat_category": "phishing",
        "analysis_results": {
            "details": "Urgent credential request",
            "indicators": ["urgency", "link mismatch"],
            "model": "bert-phish"
        },
        "remediation_suggestions": { "actions": ["Do not click links"], "priority": "high" },
        "created_at": "2024-03-01T10:00:00Z"
    })
}

#[test]
fn detection_decodes_full_shape() {
    let result: DetectionResult = serde_json::from_value(detection_json(0.82)).unwrap();
    assert_eq!(result.threat_category, "phishing");
    assert_eq!(result.analysis_results.indicators.len(), 2);
    assert_eq!(result.analysis_results.extra.get("model"), Some(&serde_json::json!("bert-phish")));
    assert_eq!(result.remediation_suggestions.priority.as_deref(), Some("high"));
    assert_eq!(result.tier(), ThreatTier::High);
    assert!(result.validate().is_ok());
}

#[test]
fn detection_decodes_minimal_shape() {
    let result: DetectionResult =
        serde_json::from_value(serde_json::json!({ "threat_score": 0.1, "confidence_score": 0.5 })).unwrap();
    assert_eq!(result.id, None);
    assert!(result.analysis_results.details.is_empty());
    assert!(result.remediation_suggestions.actions.is_empty());
    assert_eq!(result.tier(), ThreatTier::Low);
}

#[test]
fn detection_missing_score_fails() {
    let err = serde_json::from_value::<DetectionResult>(serde_json::json!({ "confidence_score": 0.5 }));
    assert!(err.is_err());
}

#[test]
fn detection_validate_rejects_out_of_range() {
    let result: DetectionResult = serde_json::from_value(detection_json(1.5)).unwrap();
    let err = result.validate().unwrap_err();
    assert!(err.contains("threat_score"));
}

#[test]
fn user_display_name_prefers_full_name() {
    let mut user: User =
        serde_json::from_value(serde_json::json!({ "id": "u1", "email": "a@example.com" })).unwrap();
    assert_eq!(user.display_name(), "a@example.com");
    user.username = Some("alice".to_owned());
    assert_eq!(user.display_name(), "alice");
    user.full_name = Some("Alice Liddell".to_owned());
    assert_eq!(user.display_name(), "Alice Liddell");
}

#[test]
fn user_update_skips_absent_fields() {
    let update = UserUpdate { full_name: Some("Alice".to_owned()), ..UserUpdate::default() };
    assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({ "full_name": "Alice" }));
    assert!(!update.is_empty());
    assert!(UserUpdate::default().is_empty());
}

#[test]
fn password_change_serializes_both_fields() {
    let update = UserUpdate::password_change("old-pass".to_owned(), "new-pass-123".to_owned());
    assert_eq!(
        serde_json::to_value(&update).unwrap(),
        serde_json::json!({ "current_password": "old-pass", "new_password": "new-pass-123" })
    );
}

#[test]
fn register_request_omits_blank_optionals() {
    let req = RegisterRequest {
        email: "a@example.com".to_owned(),
        password: "hunter22".to_owned(),
        username: None,
        full_name: Some("Alice".to_owned()),
    };
    assert_eq!(
        serde_json::to_value(&req).unwrap(),
        serde_json::json!({ "email": "a@example.com", "password": "hunter22", "full_name": "Alice" })
    );
}

#[test]
fn auth_response_embeds_optional_user() {
    let resp: AuthResponse = serde_json::from_value(serde_json::json!({
        "access_token": "at",
        "refresh_token": "rt",
        "token_type": "bearer"
    }))
    .unwrap();
    assert_eq!(resp.user, None);
    assert_eq!(resp.tokens(), TokenPair { access_token: "at".to_owned(), refresh_token: "rt".to_owned() });
}

#[test]
fn dashboard_stats_defaults_missing_sections() {
    let stats: DashboardStats = serde_json::from_value(serde_json::json!({
        "total_detections": 12,
        "recent_threats": { "critical": 1, "high": 2 },
        "detection_history": [{ "date": "2024-03-01", "count": 4 }]
    }))
    .unwrap();
    assert_eq!(stats.total_detections, 12);
    assert_eq!(stats.recent_threats.high, 2);
    assert_eq!(stats.recent_threats.low, 0);
    assert_eq!(stats.threat_categories, CategoryCounts::default());
    assert_eq!(stats.detection_history[0].count, 4);
}

#[test]
fn integer_ids_decode_as_strings() {
    let result: DetectionResult = serde_json::from_value(serde_json::json!({
        "id": 42,
        "user_id": 7,
        "threat_score": 0.3,
        "confidence_score": 0.8
    }))
    .unwrap();
    assert_eq!(result.id.as_deref(), Some("42"));
    assert_eq!(result.user_id.as_deref(), Some("7"));

    let summary: DetectionSummary = serde_json::from_value(serde_json::json!({
        "id": 42,
        "threat_score": 0.75,
        "threat_category": "malware"
    }))
    .unwrap();
    assert_eq!(summary.id, "42");
    assert_eq!(summary.tier(), ThreatTier::High);

    let user: User = serde_json::from_value(serde_json::json!({ "id": 3, "email": "a@example.com" })).unwrap();
    assert_eq!(user.id, "3");
}

#[test]
fn null_detection_id_is_none() {
    let result: DetectionResult = serde_json::from_value(serde_json::json!({
        "id": null,
        "threat_score": 0.3,
        "confidence_score": 0.8
    }))
    .unwrap();
    assert_eq!(result.id, None);
}

#[test]
fn non_scalar_id_is_rejected() {
    let err = serde_json::from_value::<DetectionSummary>(serde_json::json!({ "id": [1], "threat_score": 0.1 }));
    assert!(err.is_err());
}
