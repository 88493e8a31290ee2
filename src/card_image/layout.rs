//! Card layout: every rectangle and text run, computed before anything is
//! drawn.
//!
//! Sections are placed top to bottom and each one starts where the previous
//! one ended: header, stat tables, totals and categories, then skills and the
//! memo. The memo takes whatever height is left above the bottom margin, with
//! a floor of [`MEMO_MIN_H`].

use crate::card_image::text::{self, Font};
use crate::roster::config::{EXTRA_SKILL_SLOTS, SKILL_SLOTS};
use crate::roster::model::PlayerSnapshot;
use crate::roster::stats::{Stat, Tone, category_totals, display_total};

pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 800;

const W: f32 = CANVAS_WIDTH as f32;
const H: f32 = CANVAS_HEIGHT as f32;
const HEADER_H: f32 = 110.0;
const PADDING: f32 = 40.0;
const COL_GAP: f32 = 24.0;
const TOP_Y: f32 = 140.0;
const BOTTOM_MARGIN: f32 = 40.0;

const ROW_H: f32 = 34.0;
const LABEL_W: f32 = 120.0;
const VALUE_OFFSET: f32 = 10.0;
const CATEGORY_GAP: f32 = 150.0;
const SKILL_LINE_H: f32 = 26.0;

pub const MEMO_DEFAULT_H: f32 = 200.0;
pub const MEMO_MIN_H: f32 = 80.0;
pub const MEMO_LINE_H: f32 = 18.0;
const MEMO_TITLE_GAP: f32 = 26.0;

/// Where the icon (or its placeholder) goes.
pub const ICON_SLOT: Rect = Rect::new(40.0, 14.0, 120.0, 82.0);
pub const ICON_RADIUS: f32 = 10.0;

const NAME_FONT: Font = Font::bold(42.0);
const SUBTITLE_FONT: Font = Font::regular(16.0);
const INITIALS_FONT: Font = Font::bold(32.0);
const HEADING_FONT: Font = Font::bold(18.0);
const LABEL_FONT: Font = Font::regular(14.0);
const VALUE_FONT: Font = Font::bold(14.0);
const TOTAL_FONT: Font = Font::bold(16.0);
const CATEGORY_FONT: Font = Font::regular(16.0);
const SKILL_FONT: Font = Font::regular(15.0);
pub const MEMO_FONT: Font = Font::regular(14.0);
const FOOTER_FONT: Font = Font::regular(12.0);

const FOOTER: &str = "Player Roster - 1200x800";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub mod palette {
    use super::Rgb;

    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    pub const HEADER: Rgb = Rgb(0xf4, 0xf8, 0xff);
    pub const INK: Rgb = Rgb(0x11, 0x11, 0x11);
    pub const SUBTITLE: Rgb = Rgb(0x33, 0x33, 0x33);
    pub const LEFT_BOX: Rgb = Rgb(0xfb, 0xfd, 0xff);
    pub const ICON_FRAME: Rgb = Rgb(0xe9, 0xf2, 0xff);
    pub const PLACEHOLDER: Rgb = Rgb(0xef, 0xef, 0xef);
    pub const INITIALS: Rgb = Rgb(0x88, 0x88, 0x88);
    pub const HEADING: Rgb = Rgb(0x0b, 0x3b, 0x66);
    pub const LABEL: Rgb = Rgb(0x66, 0x66, 0x66);
    pub const TECHNIQUE: Rgb = Rgb(0xb7, 0x1c, 0x1c);
    pub const PHYSIQUE: Rgb = Rgb(0x0b, 0x47, 0xa1);
    pub const MOBILITY: Rgb = Rgb(0x2e, 0x7d, 0x32);
    pub const MEMO_BOX: Rgb = Rgb(0xfa, 0xfa, 0xfa);
    pub const MEMO_TEXT: Rgb = Rgb(0x44, 0x44, 0x44);
    pub const FOOTER: Rgb = Rgb(0x99, 0x99, 0x99);
}

pub fn tone_color(tone: Tone) -> Rgb {
    match tone {
        Tone::Technique => palette::TECHNIQUE,
        Tone::Physique => palette::PHYSIQUE,
        Tone::Mobility => palette::MOBILITY,
        Tone::Neutral => palette::INK,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Fill {
        rect: Rect,
        color: Rgb,
    },
    RoundRect {
        rect: Rect,
        radius: f32,
        color: Rgb,
    },
    /// `y` is the top of the line box.
    Text {
        x: f32,
        y: f32,
        text: String,
        font: Font,
        color: Rgb,
    },
    /// Cover-fit icon clipped to a rounded slot.
    Icon {
        slot: Rect,
        radius: f32,
    },
}

/// Placement of the memo section.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoBlock {
    pub title_y: f32,
    /// Area the wrapped text flows in; its height is the memo height.
    pub text_area: Rect,
    /// Filled background, padded 6px around `text_area`.
    pub background: Rect,
    /// Lines that fit inside the background, top to bottom.
    pub lines: Vec<String>,
    /// Wrapped lines dropped for lack of room.
    pub clipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    pub width: u32,
    pub height: u32,
    pub elements: Vec<Element>,
    pub left_box: Rect,
    pub table_bottom_y: f32,
    pub memo: MemoBlock,
}

/// Column geometry shared by every section.
struct Columns {
    left_x: f32,
    left_w: f32,
    right_x: f32,
    right_w: f32,
}

impl Columns {
    fn new() -> Self {
        let content_w = W - PADDING * 2.0;
        let left_w = (content_w * 0.62).floor();
        Self {
            left_x: PADDING,
            left_w,
            right_x: PADDING + left_w + COL_GAP,
            right_w: content_w - left_w - COL_GAP,
        }
    }
}

struct Builder {
    elements: Vec<Element>,
}

impl Builder {
    fn fill(&mut self, rect: Rect, color: Rgb) {
        self.elements.push(Element::Fill { rect, color });
    }

    fn round(&mut self, rect: Rect, radius: f32, color: Rgb) {
        self.elements.push(Element::RoundRect {
            rect,
            radius,
            color,
        });
    }

    fn text(&mut self, x: f32, y: f32, text: impl Into<String>, font: Font, color: Rgb) {
        self.elements.push(Element::Text {
            x,
            y,
            text: text.into(),
            font,
            color,
        });
    }
}

fn or_none(slot: &str) -> &str {
    if slot.is_empty() { "(none)" } else { slot }
}

pub fn layout_card(player: &PlayerSnapshot, has_icon: bool) -> CardLayout {
    let cols = Columns::new();
    let mut b = Builder {
        elements: Vec::new(),
    };

    // Header.
    b.fill(Rect::new(0.0, 0.0, W, H), palette::WHITE);
    b.fill(Rect::new(0.0, 0.0, W, HEADER_H), palette::HEADER);
    let name = if player.name.is_empty() {
        "Unnamed"
    } else {
        player.name.as_str()
    };
    b.text(180.0, 18.0, name, NAME_FONT, palette::INK);
    let subtitle = format!(
        "{}  {}  {}",
        player.position,
        player.gender.as_str(),
        player.attribute
    );
    b.text(180.0, 70.0, subtitle, SUBTITLE_FONT, palette::SUBTITLE);

    // Stat table geometry decides the left box height.
    let base_x = cols.left_x + 18.0;
    let trained_x = cols.left_x + (cols.left_w / 2.0).floor() + 18.0;
    let start_y = TOP_Y + 46.0;
    let max_rows = Stat::BASE_ROWS.len().max(Stat::TRAINED_ROWS.len()) as f32;
    let table_bottom_y = start_y + max_rows * ROW_H + 12.0;

    let available = H - TOP_Y - BOTTOM_MARGIN;
    let desired = 300f32.max(table_bottom_y - TOP_Y + 120.0);
    let left_box_h = 280f32.max(480f32.min((available - 160.0).min(desired).floor()));
    let left_box = Rect::new(cols.left_x, TOP_Y, cols.left_w, left_box_h);
    b.round(left_box, 12.0, palette::LEFT_BOX);

    // Icon slot.
    let slot = ICON_SLOT;
    if has_icon {
        b.round(
            Rect::new(slot.x - 2.0, slot.y - 2.0, slot.w + 4.0, slot.h + 4.0),
            12.0,
            palette::ICON_FRAME,
        );
        b.elements.push(Element::Icon {
            slot,
            radius: ICON_RADIUS,
        });
    } else {
        b.round(slot, ICON_RADIUS, palette::PLACEHOLDER);
        let initials: String = name.chars().take(2).collect();
        let x = slot.x + (slot.w - text::measure(&initials, INITIALS_FONT)) / 2.0;
        let y = slot.y + (slot.h - INITIALS_FONT.size) / 2.0;
        b.text(x, y, initials, INITIALS_FONT, palette::INITIALS);
    }

    // Stat tables.
    b.text(base_x, TOP_Y + 14.0, "Base (Lv.99)", HEADING_FONT, palette::HEADING);
    b.text(
        cols.left_x + cols.left_w / 2.0 + 18.0,
        TOP_Y + 14.0,
        "Trained (no Free)",
        HEADING_FONT,
        palette::HEADING,
    );
    let tables = [
        (base_x, &Stat::BASE_ROWS[..], &player.base_stats),
        (trained_x, &Stat::TRAINED_ROWS[..], &player.trained_stats),
    ];
    for (table_x, rows, block) in tables {
        for (i, &stat) in rows.iter().enumerate() {
            let y = start_y + i as f32 * ROW_H;
            let value = block.get(stat).unwrap_or(0);
            b.text(table_x, y, stat.key(), LABEL_FONT, palette::LABEL);
            b.text(
                table_x + LABEL_W + VALUE_OFFSET,
                y,
                value.to_string(),
                VALUE_FONT,
                tone_color(stat.tone()),
            );
        }
    }

    // Totals and categories.
    let base_total = display_total(&player.base_stats, true);
    let trained_total = display_total(&player.trained_stats, false);
    b.text(
        base_x,
        table_bottom_y,
        format!("Base total: {base_total}"),
        TOTAL_FONT,
        palette::INK,
    );
    b.text(
        trained_x,
        table_bottom_y,
        format!("Trained total: {trained_total}"),
        TOTAL_FONT,
        palette::INK,
    );
    let cats = category_totals(&player.trained_stats);
    for (k, (label, value)) in [("A", cats.a), ("B", cats.b), ("C", cats.c)]
        .into_iter()
        .enumerate()
    {
        b.text(
            cols.left_x + 18.0 + k as f32 * CATEGORY_GAP,
            table_bottom_y + 36.0,
            format!("Cat {label} : {value}"),
            CATEGORY_FONT,
            palette::INK,
        );
    }

    // Right column.
    let rx = cols.right_x + 18.0;
    let mut ry = TOP_Y + 16.0;
    b.text(rx, ry, "Skills", HEADING_FONT, palette::HEADING);
    ry += 30.0;
    for skill in player.skills.iter().take(SKILL_SLOTS) {
        b.text(rx, ry, format!("- {}", or_none(skill)), SKILL_FONT, palette::SUBTITLE);
        ry += SKILL_LINE_H;
    }
    ry += 8.0;
    b.text(rx, ry, "Extra skills", HEADING_FONT, palette::HEADING);
    ry += 30.0;
    for skill in player.extra_skills.iter().take(EXTRA_SKILL_SLOTS) {
        b.text(rx, ry, format!("- {}", or_none(skill)), SKILL_FONT, palette::SUBTITLE);
        ry += SKILL_LINE_H;
    }

    // Memo goes below whatever the right column and the left box used.
    let memo = place_memo(&player.memo, rx, &cols, ry, table_bottom_y, left_box.bottom());
    b.text(rx, memo.title_y, "Memo", HEADING_FONT, palette::HEADING);
    b.round(memo.background, 8.0, palette::MEMO_BOX);
    for (i, line) in memo.lines.iter().enumerate() {
        let y = memo.text_area.y + 6.0 + i as f32 * MEMO_LINE_H;
        b.text(rx, y, line.clone(), MEMO_FONT, palette::MEMO_TEXT);
    }

    b.text(W - 260.0, H - 26.0, FOOTER, FOOTER_FONT, palette::FOOTER);

    CardLayout {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        elements: b.elements,
        left_box,
        table_bottom_y,
        memo,
    }
}

fn place_memo(
    memo: &str,
    rx: f32,
    cols: &Columns,
    consumed_y: f32,
    table_bottom_y: f32,
    left_box_bottom: f32,
) -> MemoBlock {
    let floor_y = (table_bottom_y + 24.0).max(left_box_bottom + 12.0);
    let title_y = consumed_y.max(floor_y);
    let box_y = title_y + MEMO_TITLE_GAP;
    let avail = H - box_y - BOTTOM_MARGIN;

    let (title_y, box_y, memo_h) = if avail >= MEMO_DEFAULT_H {
        (title_y, box_y, MEMO_DEFAULT_H)
    } else if avail >= MEMO_MIN_H {
        (title_y, box_y, avail)
    } else {
        let title_y = (table_bottom_y + 20.0)
            .max(TOP_Y + 20.0)
            .min(H - MEMO_MIN_H - BOTTOM_MARGIN - MEMO_TITLE_GAP);
        (title_y, title_y + MEMO_TITLE_GAP, MEMO_MIN_H)
    };

    let text_area = Rect::new(rx, box_y, cols.right_w - 42.0, memo_h);
    let background = Rect::new(rx - 6.0, box_y - 6.0, cols.right_w - 36.0 + 12.0, memo_h + 12.0);

    let source = if memo.is_empty() { "(no memo)" } else { memo };
    let wrapped = text::wrap_preserving_newlines(source, text_area.w, MEMO_FONT);
    let fits = wrapped
        .iter()
        .enumerate()
        .take_while(|(i, _)| {
            box_y + 6.0 + *i as f32 * MEMO_LINE_H + MEMO_FONT.size <= background.bottom()
        })
        .count();
    let clipped = wrapped.len() - fits;
    let mut lines = wrapped;
    lines.truncate(fits);
    if clipped > 0 {
        log::debug!("memo clipped: {clipped} line(s) do not fit");
        if let Some(last) = lines.last_mut() {
            *last = with_ellipsis(last, text_area.w);
        }
    }

    MemoBlock {
        title_y,
        text_area,
        background,
        lines,
        clipped,
    }
}

/// `line` shortened from the end until it fits `width` with a trailing `...`.
fn with_ellipsis(line: &str, width: f32) -> String {
    let mut kept = line.trim_end().to_string();
    loop {
        let candidate = format!("{kept}...");
        if kept.is_empty() || text::measure(&candidate, MEMO_FONT) <= width {
            return candidate;
        }
        kept.pop();
        kept.truncate(kept.trim_end().len());
    }
}
