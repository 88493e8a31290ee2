//! `/api/state`: mirror the stored keys to and from `localStorage`.
//!
//! The page restores the snapshot once at startup and persists the exported
//! JSON after each mutating request.

use crate::roster::session::{export_state_json, restore_state_json};
use crate::routes::util::{error_notice, get_param, parse_form_body};

// ── GET /api/state ─────────────────────────────────────────────────

/// Raw JSON object of every stored key.
pub fn handle_state_get(_query: &str) -> String {
    export_state_json()
}

// ── POST /api/state/restore ────────────────────────────────────────

/// Body: `state={json}` or the bare JSON object.
pub fn handle_restore_post(body: &str) -> String {
    let params = parse_form_body(body);
    let json = get_param(&params, "state").unwrap_or(body.trim());
    match restore_state_json(json) {
        Ok(()) => r#"<span class="text-emerald-600">Roster restored</span>"#.to_string(),
        Err(e) => {
            log::warn!("state restore rejected: {e}");
            error_notice(&format!("Restore failed: {e}"))
        }
    }
}
