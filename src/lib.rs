//! Player roster in-browser WASM server.
//!
//! Exports `handle_request(method, path, query, body)` for the Web Worker
//! bridge to call. Routing uses `matchit`, the router engine behind Axum.
//!
//! The roster lives in a worker-global session (see [`roster::session`]);
//! the page mirrors it to `localStorage` through `/api/state`. Card export
//! renders a PNG entirely inside the module, see [`card_image`].

use wasm_bindgen::prelude::*;

pub mod card_image;
pub mod roster;
pub mod routes;

/// Route browser `log` output to the devtools console. Call once at startup.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_logging() {
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::debug!("logger already installed");
    }
}

/// Process an HTTP-like request and return an HTML fragment.
///
/// Called from JavaScript (Web Worker) via wasm-bindgen.
///
/// # Arguments
/// * `method`: HTTP method (`"GET"` or `"POST"`)
/// * `path`: URL path (e.g., `"/api/players"`)
/// * `query`: Query string (e.g., `"?id=1700000000000"`)
/// * `body`: URL-encoded form body. Empty string for GET requests.
///
/// # Returns
/// An HTML fragment for HTMX to swap in. `/api/state` answers with JSON.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    let mut router = matchit::Router::new();

    router.insert("/api/pages", "pages").ok();
    router.insert("/api/pages/create", "page_create").ok();
    router.insert("/api/pages/rename", "page_rename").ok();
    router.insert("/api/pages/delete", "page_delete").ok();
    router.insert("/api/pages/select", "page_select").ok();

    router.insert("/api/players", "players").ok();
    router.insert("/api/players/form", "player_form").ok();
    router.insert("/api/players/save", "player_save").ok();
    router.insert("/api/players/delete", "player_delete").ok();
    router.insert("/api/players/totals", "player_totals").ok();
    router.insert("/api/players/images", "player_images").ok();
    router.insert("/api/players/drag", "player_drag").ok();
    router.insert("/api/players/drop", "player_drop").ok();
    router.insert("/api/players/drop_end", "player_drop_end").ok();

    router.insert("/api/export/card", "export_card").ok();

    router.insert("/api/state", "state").ok();
    router.insert("/api/state/restore", "state_restore").ok();

    log::trace!("{method} {path}");

    match router.at(path) {
        Ok(matched) => match (*matched.value, method) {
            ("pages", "GET") => routes::pages::handle_list_get(query),
            ("page_create", "POST") => routes::pages::handle_create_post(body),
            ("page_rename", "POST") => routes::pages::handle_rename_post(body),
            ("page_delete", "POST") => routes::pages::handle_delete_post(body),
            ("page_select", "POST") => routes::pages::handle_select_post(body),

            ("players", "GET") => routes::players::handle_list_get(query),
            ("player_form", "GET") => routes::players::handle_form_get(query),
            ("player_save", "POST") => routes::players::handle_save_post(body),
            ("player_delete", "POST") => routes::players::handle_delete_post(body),
            ("player_totals", "POST") => routes::players::handle_totals_post(body),
            ("player_images", "POST") => routes::players::handle_images_post(body),
            ("player_drag", "POST") => routes::players::handle_drag_post(body),
            ("player_drop", "POST") => routes::players::handle_drop_post(body),
            ("player_drop_end", "POST") => routes::players::handle_drop_end_post(body),

            ("export_card", "POST") => routes::export::handle_card_post(body),

            ("state", "GET") => routes::state::handle_state_get(query),
            ("state_restore", "POST") => routes::state::handle_restore_post(body),

            _ => method_not_allowed(),
        },
        Err(_) => not_found(),
    }
}

fn not_found() -> String {
    r#"<span class="text-red-700">404: route not found</span>"#.to_string()
}

fn method_not_allowed() -> String {
    r#"<span class="text-red-700">405: method not allowed</span>"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster::clock::FixedClock;
    use roster::session::{Session, replace_session, reset_session, with_session};

    fn fresh() {
        replace_session(Session::new(Box::new(FixedClock(1_000))));
    }

    #[test]
    fn returns_404_for_unknown_route() {
        let html = handle_request("GET", "/api/nonexistent", "", "");
        assert!(html.contains("404"));
    }

    #[test]
    fn returns_405_for_wrong_method() {
        let html = handle_request("POST", "/api/players", "", "");
        assert!(html.contains("405"));
        let html = handle_request("GET", "/api/players/save", "", "");
        assert!(html.contains("405"));
    }

    #[test]
    fn routes_page_tabs() {
        fresh();
        let html = handle_request("GET", "/api/pages", "", "");
        assert!(html.contains(r#"id="page-tabs""#));
        let html = handle_request("POST", "/api/pages/create", "", "name=Reserves");
        assert!(html.contains("Reserves"));
        reset_session();
    }

    #[test]
    fn routes_player_list_and_form() {
        fresh();
        let html = handle_request("GET", "/api/players", "", "");
        assert!(html.contains("Goenji"));
        let html = handle_request("GET", "/api/players/form", "", "");
        assert!(html.contains(r#"id="player-form""#));
        reset_session();
    }

    #[test]
    fn routes_save_then_state() {
        fresh();
        handle_request("POST", "/api/players/save", "", "name=Someoka&position=FW");
        let state = handle_request("GET", "/api/state", "", "");
        assert!(state.contains("Someoka"));
        reset_session();
    }

    #[test]
    fn routes_totals() {
        let html = handle_request("POST", "/api/players/totals", "", "trained_kick=4&trained_control=5");
        assert!(html.contains("Cat A: <strong>9</strong>"));
    }

    #[test]
    fn routes_drag_and_drop() {
        fresh();
        let ids: Vec<_> = with_session(|s| {
            s.players().list().unwrap().into_iter().map(|p| p.id).collect()
        });
        handle_request("POST", "/api/players/drag", "", &format!("action=start&id={}", ids[1]));
        handle_request(
            "POST",
            "/api/players/drop",
            "",
            &format!("target={}&after=0", ids[0]),
        );
        let first = with_session(|s| s.players().list().unwrap()[0].name.clone());
        assert_eq!(first, "Goenji");
        reset_session();
    }

    #[test]
    fn routes_export() {
        let html = handle_request("POST", "/api/export/card", "", "name=Kidou");
        assert!(html.contains("Kidou.png"));
    }

    #[test]
    fn routes_state_restore() {
        fresh();
        let html = handle_request("POST", "/api/state/restore", "", "{}");
        assert!(html.contains("Roster restored"));
        reset_session();
    }
}
