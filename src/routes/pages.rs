//! `/api/pages/*` routes: page tabs and their edits.
//!
//! Every handler answers with the re-rendered tab strip. Handlers that can
//! change the selected page also carry an out-of-band swap of the player
//! list, so the cards follow the selection.

use crate::roster::config::MAX_PAGES;
use crate::roster::model::PageId;
use crate::roster::session::{Session, with_session};
use crate::routes::players::render_player_list_oob;
use crate::routes::util::{
    error_notice, escape_html, get_param, parse_form_body, roster_notice,
};

// ── GET /api/pages ─────────────────────────────────────────────────

pub fn handle_list_get(_query: &str) -> String {
    with_session(|s| render_page_tabs(s, ""))
}

// ── POST /api/pages/create ─────────────────────────────────────────

/// Body: `name` (optional; blank gets `Page N`).
pub fn handle_create_post(body: &str) -> String {
    let params = parse_form_body(body);
    let name = get_param(&params, "name");
    with_session(|s| match s.pages().create_page(name) {
        Ok(_) => render_page_tabs(s, "") + &render_player_list_oob(s),
        Err(e) => render_page_tabs(s, &roster_notice(&e)),
    })
}

// ── POST /api/pages/rename ─────────────────────────────────────────

/// Body: `id`, `name`. A blank name is refused with a notice.
pub fn handle_rename_post(body: &str) -> String {
    let params = parse_form_body(body);
    let Some(id) = page_id(&params) else {
        return with_session(|s| render_page_tabs(s, ""));
    };
    let name = get_param(&params, "name").unwrap_or("");
    if name.trim().is_empty() {
        return with_session(|s| render_page_tabs(s, &error_notice("Page name cannot be empty")));
    }
    with_session(|s| match s.pages().rename_page(id, name) {
        Ok(_) => render_page_tabs(s, ""),
        Err(e) => render_page_tabs(s, &roster_notice(&e)),
    })
}

// ── POST /api/pages/delete ─────────────────────────────────────────

/// Body: `id`. Players on the page move to the first remaining page.
pub fn handle_delete_post(body: &str) -> String {
    let params = parse_form_body(body);
    let Some(id) = page_id(&params) else {
        return with_session(|s| render_page_tabs(s, ""));
    };
    with_session(|s| match s.pages().delete_page(id) {
        Ok(_) => render_page_tabs(s, "") + &render_player_list_oob(s),
        Err(e) => render_page_tabs(s, &roster_notice(&e)),
    })
}

// ── POST /api/pages/select ─────────────────────────────────────────

/// Body: `id`. Unknown ids fall back to the first page on the next read.
pub fn handle_select_post(body: &str) -> String {
    let params = parse_form_body(body);
    with_session(|s| {
        if let Some(id) = page_id(&params) {
            if let Err(e) = s.pages().set_current_page_id(id) {
                return render_page_tabs(s, &roster_notice(&e));
            }
        }
        render_page_tabs(s, "") + &render_player_list_oob(s)
    })
}

fn page_id(params: &[(String, String)]) -> Option<PageId> {
    get_param(params, "id").and_then(|v| v.parse().ok())
}

// ── Rendering ──────────────────────────────────────────────────────

const TAB: &str = "px-3 py-1 rounded-t-lg text-sm cursor-pointer select-none border border-b-0";
const TAB_ACTIVE: &str = "bg-white text-sky-900 font-bold border-sky-300";
const TAB_IDLE: &str = "bg-slate-100 text-slate-600 border-slate-200 hover:bg-slate-200";

/// Tab strip with rename/delete controls for the selected page and the
/// add-page form. `notice` is shown under the strip.
pub(crate) fn render_page_tabs(session: &Session, notice: &str) -> String {
    let store = session.pages();
    let (pages, current) = match store
        .ensure_pages_exist()
        .and_then(|pages| Ok((pages, store.current_page_id()?)))
    {
        Ok(v) => v,
        Err(e) => return roster_notice(&e),
    };

    let mut html = String::with_capacity(2048);
    html.push_str(r#"<div id="page-tabs" class="flex flex-col gap-1">"#);
    html.push_str(r#"<div class="flex flex-wrap items-end gap-1">"#);
    for page in &pages {
        let state = if page.id == current { TAB_ACTIVE } else { TAB_IDLE };
        html.push_str(&format!(
            r##"<button class="{TAB} {state}" title="{name}" hx-post="/api/pages/select" hx-vals='{{"id": "{id}"}}' hx-target="#page-tabs" hx-swap="outerHTML">{name}</button>"##,
            id = page.id,
            name = escape_html(&page.name),
        ));
    }
    html.push_str("</div>");

    if let Some(page) = pages.iter().find(|p| p.id == current) {
        html.push_str(&format!(
            r##"<form class="flex gap-2 items-center text-sm" hx-post="/api/pages/rename" hx-target="#page-tabs" hx-swap="outerHTML">
<input type="hidden" name="id" value="{id}">
<input name="name" value="{name}" class="border rounded px-2 py-1 w-40" aria-label="Page name">
<button class="px-2 py-1 rounded bg-slate-100 hover:bg-slate-200" title="Rename page">&#x270E; Rename</button>
<button type="button" class="px-2 py-1 rounded bg-red-50 text-red-700 hover:bg-red-100" title="Delete page" hx-post="/api/pages/delete" hx-vals='{{"id": "{id}"}}' hx-target="#page-tabs" hx-swap="outerHTML" hx-confirm="Delete this page? Its players move to the first page.">&#x1F5D1; Delete</button>
</form>"##,
            id = page.id,
            name = escape_html(&page.name),
        ));
    }

    let full = pages.len() >= MAX_PAGES;
    let disabled = if full { " disabled" } else { "" };
    html.push_str(&format!(
        r##"<form class="flex gap-2 items-center text-sm" hx-post="/api/pages/create" hx-target="#page-tabs" hx-swap="outerHTML">
<input name="name" placeholder="Page {next}" class="border rounded px-2 py-1 w-40" aria-label="New page name"{disabled}>
<button class="px-2 py-1 rounded bg-sky-100 text-sky-900 hover:bg-sky-200 disabled:opacity-50"{disabled}>+ Add page</button>
<span class="text-xs text-slate-500">{count}/{MAX_PAGES}</span>
</form>"##,
        next = pages.len() + 1,
        count = pages.len(),
    ));

    if !notice.is_empty() {
        html.push_str(&format!(r#"<div id="page-notice">{notice}</div>"#));
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::clock::FixedClock;
    use crate::roster::session::{replace_session, reset_session};

    fn fresh() {
        replace_session(Session::new(Box::new(FixedClock(1_000))));
    }

    fn page_count() -> usize {
        with_session(|s| s.pages().load().unwrap().len())
    }

    #[test]
    fn list_renders_default_page() {
        fresh();
        let html = handle_list_get("");
        assert!(html.contains("Page 1"));
        assert!(html.contains("1/10"));
        reset_session();
    }

    #[test]
    fn create_selects_new_page_and_swaps_cards() {
        fresh();
        let html = handle_create_post("name=Bench");
        assert!(html.contains("Bench"));
        assert!(html.contains(r#"hx-swap-oob="true""#));
        let current = with_session(|s| s.pages().current_page_id().unwrap());
        let pages = with_session(|s| s.pages().load().unwrap());
        assert_eq!(pages[1].id, current);
        reset_session();
    }

    #[test]
    fn create_past_cap_shows_notice() {
        fresh();
        for _ in 1..MAX_PAGES {
            handle_create_post("");
        }
        assert_eq!(page_count(), MAX_PAGES);
        let html = handle_create_post("name=Eleven");
        assert!(html.contains("at most 10 pages"));
        assert!(html.contains("disabled"));
        assert_eq!(page_count(), MAX_PAGES);
        reset_session();
    }

    #[test]
    fn rename_refuses_blank_name() {
        fresh();
        let id = with_session(|s| s.pages().current_page_id().unwrap());
        let html = handle_rename_post(&format!("id={id}&name=+++"));
        assert!(html.contains("Page name cannot be empty"));
        let html = handle_rename_post(&format!("id={id}&name=Starters"));
        assert!(html.contains("Starters"));
        reset_session();
    }

    #[test]
    fn delete_last_page_refused() {
        fresh();
        let id = with_session(|s| s.pages().current_page_id().unwrap());
        let html = handle_delete_post(&format!("id={id}"));
        assert!(html.contains("At least one page must remain"));
        assert_eq!(page_count(), 1);
        reset_session();
    }

    #[test]
    fn delete_moves_players_back() {
        fresh();
        handle_create_post("name=Bench");
        let bench = with_session(|s| s.pages().current_page_id().unwrap());
        let first = with_session(|s| s.pages().load().unwrap()[0].id);
        let endo = with_session(|s| s.players().list().unwrap()[0].id);
        with_session(|s| s.players().reassign_page(first, bench).unwrap());
        handle_delete_post(&format!("id={bench}"));
        let player = with_session(|s| s.players().find(endo).unwrap().unwrap());
        assert_eq!(player.page_id, first);
        assert_eq!(with_session(|s| s.pages().current_page_id().unwrap()), first);
        reset_session();
    }

    #[test]
    fn select_switches_cards() {
        fresh();
        handle_create_post("name=Bench");
        let first = with_session(|s| s.pages().load().unwrap()[0].id);
        let html = handle_select_post(&format!("id={first}"));
        assert!(html.contains("Endo"));
        let html = handle_select_post("id=424242");
        // Stale selection repaired to the first page.
        assert!(html.contains("Endo"));
        reset_session();
    }
}
