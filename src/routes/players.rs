//! `/api/players/*` routes: cards, the edit form and drag-and-drop.
//!
//! The edit form is the only place player data is typed in. Its fields are
//! read back with [`parse_player_form`] and written out with
//! [`render_player_form`]; everything in between goes through the stores.

use crate::card_image::icon::decode_data_uri;
use crate::roster::config::{EXTRA_SKILL_SLOTS, SKILL_SLOTS};
use crate::roster::error::RosterError;
use crate::roster::model::{Gender, PageId, Player, PlayerId, PlayerSnapshot, StatBlock};
use crate::roster::schema::parse_int_str;
use crate::roster::session::{Session, with_session, with_session_mut};
use crate::roster::stats::{Stat, Tone, category_totals, display_total};
use crate::routes::util::{
    error_notice, escape_html, get_all, get_param, parse_form_body, parse_query, roster_notice,
};

type Params = [(String, String)];

// ── Form backend ───────────────────────────────────────────────────

/// Read the edit form into a snapshot. Missing or non-numeric stat fields
/// read as 0; skill slots are trimmed.
pub fn parse_player_form(params: &Params) -> PlayerSnapshot {
    let text = |key: &str| get_param(params, key).unwrap_or("").to_string();
    let mut snapshot = PlayerSnapshot {
        id: get_param(params, "id").and_then(|v| v.parse().ok()),
        name: text("name").trim().to_string(),
        position: text("position"),
        gender: Gender::parse(get_param(params, "gender").unwrap_or("")),
        attribute: text("attribute"),
        icon: text("icon"),
        memo: text("memo"),
        images: get_all(params, "images")
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect(),
        ..Default::default()
    };
    for stat in Stat::BASE_ROWS {
        let raw = get_param(params, &format!("base_{}", stat.slug())).unwrap_or("");
        snapshot.base_stats.set(stat, parse_int_str(raw));
    }
    for stat in Stat::TRAINED_ROWS {
        let raw = get_param(params, &format!("trained_{}", stat.slug())).unwrap_or("");
        snapshot.trained_stats.set(stat, parse_int_str(raw));
    }
    for (i, slot) in snapshot.skills.iter_mut().enumerate() {
        *slot = text(&format!("skill_{}", i + 1)).trim().to_string();
    }
    for (i, slot) in snapshot.extra_skills.iter_mut().enumerate() {
        *slot = text(&format!("extra_{}", i + 1)).trim().to_string();
    }
    snapshot
}

// ── GET /api/players ───────────────────────────────────────────────

pub fn handle_list_get(_query: &str) -> String {
    with_session(render_player_list)
}

// ── GET /api/players/form?id= ──────────────────────────────────────

/// Edit form for `id`, or a blank form when `id` is absent or stale.
pub fn handle_form_get(query: &str) -> String {
    let params = parse_query(query);
    let id: Option<PlayerId> = get_param(&params, "id").and_then(|v| v.parse().ok());
    with_session(|s| {
        let found = match id.map(|id| s.players().find(id)).transpose() {
            Ok(found) => found.flatten(),
            Err(e) => return roster_notice(&e),
        };
        let snapshot = found
            .as_ref()
            .map(PlayerSnapshot::from)
            .unwrap_or_default();
        render_player_form(&snapshot)
    })
}

// ── POST /api/players/save ─────────────────────────────────────────

/// Upsert the submitted form. On success the modal is emptied; on failure
/// the list is unchanged and the notice lands in the form.
pub fn handle_save_post(body: &str) -> String {
    let params = parse_form_body(body);
    let snapshot = parse_player_form(&params);
    with_session(|s| match s.players().upsert(snapshot) {
        Ok(_) => render_player_list(s) + r#"<div id="modal-body" hx-swap-oob="true"></div>"#,
        Err(e) => {
            let notice = match e {
                RosterError::EmptyName => error_notice("Name is required."),
                other => roster_notice(&other),
            };
            render_player_list(s)
                + &format!(r#"<div id="form-notice" hx-swap-oob="true">{notice}</div>"#)
        }
    })
}

// ── POST /api/players/delete ───────────────────────────────────────

pub fn handle_delete_post(body: &str) -> String {
    let params = parse_form_body(body);
    let id: Option<PlayerId> = get_param(&params, "id").and_then(|v| v.parse().ok());
    with_session(|s| {
        if let Some(id) = id {
            if let Err(e) = s.players().delete_by_id(id) {
                return roster_notice(&e);
            }
        }
        render_player_list(s) + r#"<div id="modal-body" hx-swap-oob="true"></div>"#
    })
}

// ── POST /api/players/totals ───────────────────────────────────────

/// Live totals for the form as currently typed.
pub fn handle_totals_post(body: &str) -> String {
    let params = parse_form_body(body);
    render_form_totals(&parse_player_form(&params))
}

// ── POST /api/players/images ───────────────────────────────────────

/// Body params:
///   - `action=add`, `images=…` (current), `image=…` (new data URIs)
///   - `action=remove`, `images=…`, `index={n}`
///   - `action=set_icon`, `image=…` (first one wins)
///   - `action=clear_icon`
///
/// Answers with the gallery (or icon slot) including its hidden inputs.
pub fn handle_images_post(body: &str) -> String {
    let params = parse_form_body(body);
    let mut images: Vec<String> = get_all(&params, "images")
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    let action = get_param(&params, "action").unwrap_or("");

    match action {
        "add" => {
            let mut rejected = 0;
            for uri in get_all(&params, "image") {
                match decode_data_uri(uri) {
                    Ok(_) => images.push(uri.to_string()),
                    Err(e) => {
                        log::warn!("rejected reference image: {e}");
                        rejected += 1;
                    }
                }
            }
            let notice = if rejected > 0 {
                error_notice(&format!("Could not read {rejected} image(s)."))
            } else {
                String::new()
            };
            render_image_gallery(&images, &notice)
        }
        "remove" => {
            let index: Option<usize> = get_param(&params, "index").and_then(|v| v.parse().ok());
            if let Some(i) = index.filter(|&i| i < images.len()) {
                images.remove(i);
            }
            render_image_gallery(&images, "")
        }
        "set_icon" => {
            let current = get_param(&params, "icon").unwrap_or("");
            match get_all(&params, "image").next() {
                Some(uri) => match decode_data_uri(uri) {
                    Ok(_) => render_icon_slot(uri, ""),
                    Err(e) => {
                        log::warn!("rejected icon: {e}");
                        render_icon_slot(current, &error_notice("Could not read the icon."))
                    }
                },
                None => render_icon_slot(current, ""),
            }
        }
        "clear_icon" => render_icon_slot("", ""),
        _ => render_image_gallery(&images, ""),
    }
}

// ── POST /api/players/drag ─────────────────────────────────────────

/// `action=start&id={n}` records the dragged card; `action=end` clears it.
pub fn handle_drag_post(body: &str) -> String {
    let params = parse_form_body(body);
    let id: Option<PlayerId> = get_param(&params, "id").and_then(|v| v.parse().ok());
    with_session_mut(|s| match (get_param(&params, "action"), id) {
        (Some("start"), Some(id)) => s.drag.begin(id),
        _ => s.drag.end(),
    });
    String::new()
}

// ── POST /api/players/drop ─────────────────────────────────────────

/// Body: `target`, `after` (`1` to insert after), `payload` (fallback
/// source id from the drag data).
pub fn handle_drop_post(body: &str) -> String {
    let params = parse_form_body(body);
    let source = take_drag_source(&params);
    let target: Option<PlayerId> = get_param(&params, "target").and_then(|v| v.parse().ok());
    let after = matches!(get_param(&params, "after"), Some("1" | "true"));

    with_session(|s| {
        if let (Some(source), Some(target)) = (source, target) {
            if let Err(e) = s.players().reorder_within_page(source, target, after) {
                return roster_notice(&e);
            }
        }
        render_player_list(s)
    })
}

// ── POST /api/players/drop_end ─────────────────────────────────────

/// Drop on empty space: move the card after the last one on the page.
pub fn handle_drop_end_post(body: &str) -> String {
    let params = parse_form_body(body);
    let source = take_drag_source(&params);
    with_session(|s| {
        if let Some(source) = source {
            let moved = s
                .pages()
                .current_page_id()
                .and_then(|page| s.players().move_to_end(source, page));
            if let Err(e) = moved {
                return roster_notice(&e);
            }
        }
        render_player_list(s)
    })
}

fn take_drag_source(params: &Params) -> Option<PlayerId> {
    let payload = get_param(params, "payload").filter(|p| !p.is_empty());
    with_session_mut(|s| {
        let source = s.drag.resolve(payload);
        s.drag.end();
        source
    })
}

// ── Rendering ──────────────────────────────────────────────────────

fn tone_class(tone: Tone) -> &'static str {
    match tone {
        Tone::Technique => "text-red-700",
        Tone::Physique => "text-blue-800",
        Tone::Mobility => "text-green-700",
        Tone::Neutral => "text-slate-900",
    }
}

const LIST_ATTRS: &str = r#"class="grid grid-cols-2 md:grid-cols-4 gap-3 min-h-32" ondragover="event.preventDefault()" ondrop="if(!event.target.closest('[data-player-id]')){event.preventDefault();htmx.ajax('POST','/api/players/drop_end',{values:{payload:event.dataTransfer.getData('text/plain')},target:'#player-list',swap:'outerHTML'})}""#;

/// Cards of the selected page, wrapped in the `#player-list` container.
pub(crate) fn render_player_list(session: &Session) -> String {
    render_list_container(session, "")
}

/// Same list as an out-of-band swap, for responses aimed elsewhere.
pub(crate) fn render_player_list_oob(session: &Session) -> String {
    render_list_container(session, r#" hx-swap-oob="true""#)
}

fn render_list_container(session: &Session, extra_attrs: &str) -> String {
    let players = session
        .pages()
        .current_page_id()
        .and_then(|page: PageId| session.players().list_page(page));
    let players = match players {
        Ok(p) => p,
        Err(e) => return roster_notice(&e),
    };

    let mut html = String::with_capacity(1024 + players.len() * 1024);
    html.push_str(&format!(r#"<div id="player-list" {LIST_ATTRS}{extra_attrs}>"#));
    if players.is_empty() {
        html.push_str(
            r#"<p class="col-span-full text-sm text-slate-500 text-center py-8">No players on this page yet.</p>"#,
        );
    }
    for player in &players {
        html.push_str(&render_player_card(player));
    }
    html.push_str("</div>");
    html
}

fn render_player_card(p: &Player) -> String {
    let id = p.id;
    let name = if p.name.is_empty() { "Unnamed" } else { &p.name };
    let icon = if p.icon.is_empty() {
        let initials: String = p.name.chars().take(2).collect();
        format!(
            r#"<div class="w-12 h-12 rounded-lg bg-slate-200 text-slate-500 font-bold flex items-center justify-center" aria-hidden="true">{}</div>"#,
            escape_html(&initials)
        )
    } else {
        format!(
            r#"<img class="w-12 h-12 rounded-lg object-cover" src="{}" alt="" aria-hidden="true">"#,
            escape_html(&p.icon)
        )
    };

    let mut stats = String::new();
    for stat in Stat::TRAINED_ROWS {
        stats.push_str(&format!(
            r#"<div class="flex justify-between"><span class="{}">{}</span><span class="font-bold">{}</span></div>"#,
            tone_class(stat.tone()),
            stat.key(),
            p.trained_stats.get(stat).unwrap_or(0)
        ));
    }

    let badges: String = p
        .extra_skills
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| {
            format!(
                r#"<span class="px-2 py-0.5 rounded-full bg-amber-50 text-amber-800 text-xs">{}</span>"#,
                escape_html(s)
            )
        })
        .collect();

    format!(
        r##"<div class="rounded-xl border bg-white p-3 shadow-sm cursor-pointer hover:shadow-md select-none" data-player-id="{id}" draggable="true"
 ondragstart="event.dataTransfer.effectAllowed='move';event.dataTransfer.setData('text/plain','{id}');htmx.ajax('POST','/api/players/drag',{{values:{{action:'start',id:'{id}'}},swap:'none'}})"
 ondragend="htmx.ajax('POST','/api/players/drag',{{values:{{action:'end'}},swap:'none'}})"
 ondragover="event.preventDefault()"
 ondrop="event.preventDefault();event.stopPropagation();var r=this.getBoundingClientRect();htmx.ajax('POST','/api/players/drop',{{values:{{target:'{id}',after:event.clientX>r.left+r.width/2?'1':'0',payload:event.dataTransfer.getData('text/plain')}},target:'#player-list',swap:'outerHTML'}})"
 hx-get="/api/players/form?id={id}" hx-target="#modal-body" hx-swap="innerHTML">
<div class="flex items-center gap-2 mb-2">{icon}<div><p class="font-bold">{name}</p><p class="text-xs text-slate-500">{position}</p></div></div>
<div class="text-xs space-y-0.5">{stats}</div>
<div class="flex justify-between border-t mt-2 pt-1 text-sm"><span>Total (excl. GP/TP)</span><span class="font-bold">{total}</span></div>
<div class="flex flex-wrap gap-1 mt-1">{badges}</div>
</div>"##,
        name = escape_html(name),
        position = escape_html(&p.position),
        total = display_total(&p.trained_stats, false),
    )
}

/// The modal edit form, populated from `snapshot`.
pub fn render_player_form(snapshot: &PlayerSnapshot) -> String {
    let id = snapshot.id.map(|id| id.to_string()).unwrap_or_default();
    let title = if snapshot.id.is_some() {
        "Edit player"
    } else {
        "Add player"
    };

    let mut html = String::with_capacity(8192);
    html.push_str(&format!(
        r##"<form id="player-form" class="flex flex-col gap-3" hx-post="/api/players/save" hx-target="#player-list" hx-swap="outerHTML">
<h2 class="text-lg font-bold text-sky-900">{title}</h2>
<div id="form-notice"></div>
<input type="hidden" name="id" value="{id}">
<div class="grid grid-cols-2 gap-2">
<label class="flex flex-col text-sm">Name<input name="name" required value="{name}" class="border rounded px-2 py-1"></label>
<label class="flex flex-col text-sm">Position<input name="position" value="{position}" class="border rounded px-2 py-1"></label>
<label class="flex flex-col text-sm">Attribute<input name="attribute" value="{attribute}" class="border rounded px-2 py-1"></label>
<fieldset class="flex gap-3 items-center text-sm"><legend>Gender</legend>"##,
        name = escape_html(&snapshot.name),
        position = escape_html(&snapshot.position),
        attribute = escape_html(&snapshot.attribute),
    ));
    for (gender, caption) in [(Gender::Male, "Male"), (Gender::Female, "Female")] {
        let checked = if snapshot.gender == gender { " checked" } else { "" };
        html.push_str(&format!(
            r#"<label><input type="radio" name="gender" value="{}"{checked}> {caption}</label>"#,
            gender.as_str()
        ));
    }
    html.push_str("</fieldset></div>");

    html.push_str(&render_icon_slot(&snapshot.icon, ""));

    // Stat tables; any edit refreshes the totals.
    html.push_str(
        r##"<div class="grid grid-cols-2 gap-4" hx-post="/api/players/totals" hx-trigger="input changed delay:150ms" hx-target="#form-totals" hx-swap="outerHTML" hx-include="closest form">"##,
    );
    let tables: [(&str, &str, &[Stat], &StatBlock); 2] = [
        ("Base (Lv.99)", "base", &Stat::BASE_ROWS, &snapshot.base_stats),
        ("Trained (no Free)", "trained", &Stat::TRAINED_ROWS, &snapshot.trained_stats),
    ];
    for (caption, prefix, rows, block) in tables {
        html.push_str(&format!(
            r#"<div><h3 class="text-sm font-bold text-sky-900 mb-1">{caption}</h3>"#
        ));
        for &stat in rows {
            html.push_str(&format!(
                r#"<label class="flex justify-between items-center text-sm"><span class="{}">{}</span><input type="number" name="{prefix}_{}" value="{}" class="border rounded px-1 w-20 text-right"></label>"#,
                tone_class(stat.tone()),
                stat.key(),
                stat.slug(),
                block.get(stat).unwrap_or(0)
            ));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html.push_str(&render_form_totals(snapshot));

    html.push_str(r#"<div class="grid grid-cols-2 gap-2">"#);
    for (i, skill) in snapshot.skills.iter().enumerate().take(SKILL_SLOTS) {
        html.push_str(&format!(
            r#"<input name="skill_{n}" value="{}" placeholder="Skill {n}" class="border rounded px-2 py-1 text-sm">"#,
            escape_html(skill),
            n = i + 1
        ));
    }
    for (i, skill) in snapshot.extra_skills.iter().enumerate().take(EXTRA_SKILL_SLOTS) {
        html.push_str(&format!(
            r#"<input name="extra_{n}" value="{}" placeholder="Extra skill {n}" class="border rounded px-2 py-1 text-sm">"#,
            escape_html(skill),
            n = i + 1
        ));
    }
    html.push_str("</div>");

    html.push_str(&format!(
        r#"<label class="flex flex-col text-sm">Memo<textarea name="memo" rows="4" class="border rounded px-2 py-1">{}</textarea></label>"#,
        escape_html(&snapshot.memo)
    ));

    html.push_str(&render_image_gallery(&snapshot.images, ""));

    html.push_str(
        r##"<div class="flex gap-2 justify-end items-center">
<span id="export-status" class="text-sm"></span>
<button type="button" class="px-3 py-1 rounded bg-slate-100 hover:bg-slate-200 disabled:opacity-50" hx-post="/api/export/card" hx-include="closest form" hx-target="#export-status" hx-swap="innerHTML" hx-disabled-elt="this">Export image</button>"##,
    );
    if let Some(pid) = snapshot.id {
        html.push_str(&format!(
            r##"<button type="button" class="px-3 py-1 rounded bg-red-50 text-red-700 hover:bg-red-100" hx-post="/api/players/delete" hx-vals='{{"id": "{pid}"}}' hx-target="#player-list" hx-swap="outerHTML" hx-confirm="Delete this player?">Delete</button>"##
        ));
    }
    html.push_str(
        r#"<button type="submit" class="px-3 py-1 rounded bg-sky-600 text-white hover:bg-sky-700">Save</button>
</div>
</form>"#,
    );
    html
}

/// Base total (with Free), trained total, and the A/B/C sums.
pub fn render_form_totals(snapshot: &PlayerSnapshot) -> String {
    let cats = category_totals(&snapshot.trained_stats);
    format!(
        r#"<div id="form-totals" class="flex flex-wrap gap-4 text-sm">
<span>Base total: <strong>{base}</strong></span>
<span>Trained total: <strong>{trained}</strong></span>
<span class="text-red-700">Cat A: <strong>{a}</strong></span>
<span class="text-blue-800">Cat B: <strong>{b}</strong></span>
<span class="text-green-700">Cat C: <strong>{c}</strong></span>
</div>"#,
        base = display_total(&snapshot.base_stats, true),
        trained = display_total(&snapshot.trained_stats, false),
        a = cats.a,
        b = cats.b,
        c = cats.c,
    )
}

/// Reference image thumbnails with the hidden `images` inputs the form posts.
fn render_image_gallery(images: &[String], notice: &str) -> String {
    let mut html = String::from(
        r#"<div id="form-images" class="flex flex-col gap-1"><span class="text-sm">Reference images</span><div class="flex flex-wrap gap-2">"#,
    );
    for (i, uri) in images.iter().enumerate() {
        let uri = escape_html(uri);
        html.push_str(&format!(
            r##"<div class="relative"><input type="hidden" name="images" value="{uri}"><img src="{uri}" alt="ref-{i}" class="w-16 h-16 object-cover rounded"><button type="button" class="absolute top-0 right-0 text-xs bg-white rounded-full px-1" hx-post="/api/players/images" hx-vals='{{"action": "remove", "index": "{i}"}}' hx-include="#form-images" hx-target="#form-images" hx-swap="outerHTML" aria-label="Remove image">&#x2715;</button></div>"##
        ));
    }
    html.push_str(
        r#"</div><input type="file" accept="image/*" multiple class="text-sm" onchange="rosterFiles.upload(this, 'add', '#form-images')">"#,
    );
    html.push_str(notice);
    html.push_str("</div>");
    html
}

/// Icon preview with its hidden `icon` input.
fn render_icon_slot(icon: &str, notice: &str) -> String {
    let preview = if icon.is_empty() {
        String::from(r#"<div class="w-24 h-16 rounded bg-slate-100"></div>"#)
    } else {
        format!(
            r##"<img src="{uri}" alt="icon-preview" class="w-24 h-16 object-cover rounded"><button type="button" class="text-xs" hx-post="/api/players/images" hx-vals='{{"action": "clear_icon"}}' hx-target="#form-icon" hx-swap="outerHTML" aria-label="Remove icon">&#x2715;</button>"##,
            uri = escape_html(icon)
        )
    };
    format!(
        r#"<div id="form-icon" class="flex items-center gap-2 text-sm"><span>Icon</span><input type="hidden" name="icon" value="{}">{preview}<input type="file" accept="image/*" class="text-sm" onchange="rosterFiles.upload(this, 'set_icon', '#form-icon')">{notice}</div>"#,
        escape_html(icon)
    )
}
