use clap::CommandFactory;

use super::*;

fn detection() -> DetectionResult {
    serde_json::from_value(serde_json::json!({
        "threat_score": 0.72,
        "confidence_score": 0.9,
        "threat_category": "phishing",
        "analysis_results": { "details": "credential harvesting page", "indicators": ["lookalike domain"] },
        "remediation_suggestions": { "actions": ["report the sender"], "priority": "high" },
    }))
    .unwrap()
}

#[test]
fn cli_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn parses_history_paging() {
    let cli = Cli::try_parse_from(["threatscope", "history", "--page", "2", "--page-size", "25"]).unwrap();
    assert!(matches!(cli.command, Command::History { page: 2, page_size: 25 }));
    assert!(!cli.json);
}

#[test]
fn json_flag_is_global() {
    let cli = Cli::try_parse_from(["threatscope", "dashboard", "stats", "--json"]).unwrap();
    assert!(cli.json);
}

#[test]
fn history_defaults_to_first_page() {
    let cli = Cli::try_parse_from(["threatscope", "history"]).unwrap();
    assert!(matches!(cli.command, Command::History { page: 0, page_size: 10 }));
}

#[test]
fn result_summary_shows_tier_and_percent() {
    let rendered = render_result(&detection());
    assert!(rendered.starts_with("threat: high (72.0%)"), "{rendered}");
    assert!(rendered.contains("confidence: 90.0%"));
    assert!(rendered.contains("  indicator: lookalike domain"));
    assert!(rendered.contains("  action: report the sender"));
}

#[test]
fn stats_summary_lists_buckets() {
    let stats = DashboardStats { total_detections: 12, ..DashboardStats::default() };
    let rendered = render_stats(&stats);
    assert!(rendered.starts_with("total detections: 12\n"));
    assert!(rendered.contains("phishing 0"));
}

#[test]
fn user_without_name_is_shown_by_email() {
    let user: User = serde_json::from_value(serde_json::json!({ "id": "u1", "email": "a@example.com" })).unwrap();
    assert_eq!(describe_user(&user), "a@example.com");
}

#[test]
fn not_signed_in_has_stable_code() {
    assert_eq!(CliError::NotSignedIn.code(), "E_NOT_SIGNED_IN");
    assert_eq!(CliError::from(ApiError::validation("x")).code(), "E_VALIDATION");
}
