use super::*;

#[test]
fn protected_route_waits_while_loading() {
    assert_eq!(guard(Route::History, AuthStatus::Loading), GuardDecision::Wait);
}

#[test]
fn protected_route_redirects_when_signed_out() {
    assert_eq!(guard(Route::Dashboard, AuthStatus::Unauthenticated), GuardDecision::Redirect(Route::Login));
}

#[test]
fn protected_route_renders_when_signed_in() {
    assert_eq!(guard(Route::Settings, AuthStatus::Authenticated), GuardDecision::Render);
}

#[test]
fn public_routes_always_render() {
    for status in [AuthStatus::Loading, AuthStatus::Unauthenticated, AuthStatus::Authenticated] {
        assert_eq!(guard(Route::Login, status), GuardDecision::Render);
        assert_eq!(guard(Route::Register, status), GuardDecision::Render);
    }
}

#[test]
fn paths_round_trip() {
    for route in [
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::TextAnalysis,
        Route::ImageAnalysis,
        Route::History,
        Route::Profile,
        Route::Settings,
    ] {
        assert_eq!(Route::from_path(route.path()), route);
    }
}

#[test]
fn unknown_path_falls_back_to_dashboard() {
    assert_eq!(Route::from_path("/"), Route::Dashboard);
    assert_eq!(Route::from_path("/nope"), Route::Dashboard);
    assert_eq!(Route::from_path("/history/"), Route::History);
}
