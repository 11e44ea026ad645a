//! Places an [`InvoiceDocument`] onto A4 pages.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.
//! Text widths are estimated from Helvetica metrics over the bytes the
//! renderer will actually emit.

use super::{
    document::{Align, InfoBox, InvoiceDocument, TableRow, COLUMNS},
    pdf::encode_text,
    theme::{self, Color},
};

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 40.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const FOOTER_HEIGHT: f32 = 36.0;
const CONTENT_BOTTOM: f32 = MARGIN + FOOTER_HEIGHT;

const BODY_SIZE: f32 = 9.0;
const SMALL_SIZE: f32 = 8.0;
const LINE_GAP: f32 = 1.35;
const CELL_PADDING: f32 = 5.0;
const SECTION_GAP: f32 = 14.0;
const HEADER_GUTTER: f32 = 20.0;
const TABLE_HEADER_HEIGHT: f32 = 20.0;
const FOOTER_LINES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        color: Color,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Color>,
        stroke: Option<Color>,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text runs in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Helvetica advance width of one WinAnsi byte, in 1/1000 em.
fn glyph_width(byte: u8, font: Font) -> u16 {
    let regular = match byte {
        b' ' | b'!' | b',' | b'.' | b'/' | b':' | b';' | b'I' | b'[' | b']' | b'\\' | b'f'
        | b't' => 278,
        b'i' | b'j' | b'l' | b'\'' => 222,
        b'(' | b')' | b'-' | b'r' | b'`' => 333,
        b'0'..=b'9' | b'$' | b'_' | b'?' | b'#' => 556,
        b'm' => 833,
        b'w' => 722,
        b'M' => 833,
        b'W' => 944,
        b'@' => 1015,
        b'%' => 889,
        b'C' | b'D' | b'H' | b'N' | b'R' | b'U' => 722,
        b'G' | b'O' | b'Q' => 778,
        b'F' | b'T' | b'Z' => 611,
        b'J' | b'c' | b'k' | b's' | b'v' | b'x' | b'y' | b'z' => 500,
        b'A'..=b'Z' => 667,
        b'a'..=b'z' => 556,
        b'|' => 260,
        0x00..=0x1f => 0,
        _ => 556,
    };
    match font {
        Font::Regular => regular,
        Font::Bold => regular + regular / 18,
    }
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = encode_text(text)
        .iter()
        .map(|b| u32::from(glyph_width(*b, font)))
        .sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap; explicit newlines are kept and overlong words are split.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if text_width(&candidate, font, size) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width(word, font, size) <= max_width {
                current = word.to_string();
            } else {
                for ch in word.chars() {
                    let mut next = current.clone();
                    next.push(ch);
                    if !current.is_empty() && text_width(&next, font, size) > max_width {
                        lines.push(std::mem::take(&mut current));
                        current.push(ch);
                    } else {
                        current = next;
                    }
                }
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn line_height(size: f32) -> f32 {
    size * LINE_GAP
}

struct Pager {
    pages: Vec<Page>,
    y: f32,
}

impl Pager {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ops(&mut self) -> &mut Vec<DrawOp> {
        let last = self.pages.len() - 1;
        &mut self.pages[last].ops
    }

    fn fits(&self, height: f32) -> bool {
        self.y - height >= CONTENT_BOTTOM
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Starts a new page unless `height` still fits, ignoring requests
    /// taller than an empty page.
    fn ensure(&mut self, height: f32) -> bool {
        if self.fits(height) || self.y >= PAGE_HEIGHT - MARGIN {
            return false;
        }
        self.new_page();
        true
    }

    fn text(&mut self, x: f32, baseline: f32, size: f32, font: Font, color: Color, text: &str) {
        self.ops().push(DrawOp::Text {
            x,
            y: baseline,
            size,
            font,
            color,
            text: text.to_string(),
        });
    }

    fn text_right(
        &mut self,
        right: f32,
        baseline: f32,
        size: f32,
        font: Font,
        color: Color,
        text: &str,
    ) {
        let x = right - text_width(text, font, size);
        self.text(x, baseline, size, font, color, text);
    }

    fn rect(&mut self, x: f32, top: f32, width: f32, height: f32, fill: Option<Color>, stroke: Option<Color>) {
        self.ops().push(DrawOp::Rect {
            x,
            y: top - height,
            width,
            height,
            fill,
            stroke,
        });
    }

    fn hline(&mut self, y: f32, color: Color, width: f32) {
        self.ops().push(DrawOp::Line {
            from: (MARGIN, y),
            to: (PAGE_WIDTH - MARGIN, y),
            width,
            color,
        });
    }
}

/// Lays the document out page by page and stamps the footer on each.
pub fn paginate(document: &InvoiceDocument) -> Vec<Page> {
    let mut pager = Pager::new();

    draw_header(&mut pager, document);
    if let Some(banner) = &document.banner {
        draw_banner(&mut pager, &banner.text());
    }
    draw_info_boxes(&mut pager, &document.supplier, &document.order_info);
    draw_table(&mut pager, &document.rows);
    draw_grand_total(&mut pager, &document.grand_total_text);
    if let Some(notes) = &document.notes {
        draw_notes(&mut pager, notes);
    }

    let mut pages = pager.pages;
    let total = pages.len();
    for (index, page) in pages.iter_mut().enumerate() {
        draw_footer(page, &document.footer, index + 1, total);
    }
    pages
}

fn draw_header(pager: &mut Pager, document: &InvoiceDocument) {
    let header = &document.header;
    let right = PAGE_WIDTH - MARGIN;
    let top = pager.y;

    let title_width = text_width("PURCHASE ORDER", Font::Bold, 16.0);
    let right_width = text_width(&header.po_number, Font::Bold, 11.0)
        .max(title_width)
        .min(CONTENT_WIDTH / 2.0);
    let left_width = CONTENT_WIDTH - right_width - HEADER_GUTTER;

    let mut y = top;
    for line in wrap_text(&header.company_name, Font::Bold, 18.0, left_width) {
        y -= line_height(18.0);
        pager.text(MARGIN, y + 6.0, 18.0, Font::Bold, theme::ACCENT, &line);
    }
    let mut details: Vec<&str> = header.address_lines.iter().map(String::as_str).collect();
    if let Some(contact) = &header.contact_line {
        details.push(contact);
    }
    let gstin = header.gstin.as_ref().map(|g| format!("GSTIN: {}", g));
    if let Some(gstin) = &gstin {
        details.push(gstin);
    }
    for line in details
        .into_iter()
        .flat_map(|detail| wrap_text(detail, Font::Regular, BODY_SIZE, left_width))
    {
        y -= line_height(BODY_SIZE);
        pager.text(MARGIN, y, BODY_SIZE, Font::Regular, theme::MUTED, &line);
    }

    let mut ry = top - 16.0;
    pager.text_right(right, ry, 16.0, Font::Bold, theme::TEXT, "PURCHASE ORDER");
    for line in wrap_text(&header.po_number, Font::Bold, 11.0, right_width) {
        ry -= line_height(11.0) + 2.0;
        pager.text_right(right, ry, 11.0, Font::Bold, theme::TEXT, &line);
    }

    let pill_width = text_width(&header.status_label, Font::Bold, SMALL_SIZE) + 16.0;
    let pill_top = ry - 8.0;
    pager.rect(
        right - pill_width,
        pill_top,
        pill_width,
        16.0,
        Some(header.status_style.fill),
        None,
    );
    pager.text_right(
        right - 8.0,
        pill_top - 11.0,
        SMALL_SIZE,
        Font::Bold,
        header.status_style.text,
        &header.status_label,
    );

    let bottom = y.min(pill_top - 16.0) - 10.0;
    pager.hline(bottom, theme::BORDER, 1.0);
    pager.y = bottom - SECTION_GAP;
}

fn draw_banner(pager: &mut Pager, text: &str) {
    let size = BODY_SIZE + 1.0;
    let lines = wrap_text(text, Font::Bold, size, CONTENT_WIDTH - 20.0);
    let height = 24.0 + (lines.len() - 1) as f32 * line_height(size);
    pager.ensure(height);
    let top = pager.y;
    pager.rect(MARGIN, top, CONTENT_WIDTH, height, Some(theme::BANNER_FILL), None);
    let mut baseline = top - 15.5;
    for line in &lines {
        pager.text(MARGIN + 10.0, baseline, size, Font::Bold, theme::BANNER_TEXT, line);
        baseline -= line_height(size);
    }
    pager.y = top - height - SECTION_GAP;
}

fn info_box_lines(info: &InfoBox, width: f32) -> Vec<(String, String)> {
    let label_width = 80.0;
    let mut lines = Vec::new();
    for (label, value) in &info.lines {
        let wrapped = wrap_text(value, Font::Regular, BODY_SIZE, width - label_width - 2.0 * CELL_PADDING);
        for (i, part) in wrapped.into_iter().enumerate() {
            let label = if i == 0 { label.clone() } else { String::new() };
            lines.push((label, part));
        }
    }
    lines
}

fn draw_info_boxes(pager: &mut Pager, left: &InfoBox, right: &InfoBox) {
    let gap = 12.0;
    let width = (CONTENT_WIDTH - gap) / 2.0;
    let left_lines = info_box_lines(left, width);
    let right_lines = info_box_lines(right, width);
    let rows = left_lines.len().max(right_lines.len()) as f32;
    let height = 2.0 * CELL_PADDING + 16.0 + rows * line_height(BODY_SIZE);

    pager.ensure(height);
    let top = pager.y;
    for (x, info, lines) in [
        (MARGIN, left, left_lines),
        (MARGIN + width + gap, right, right_lines),
    ] {
        pager.rect(x, top, width, height, Some(theme::PANEL_FILL), Some(theme::BORDER));
        let mut y = top - CELL_PADDING - 10.0;
        pager.text(x + CELL_PADDING, y, 10.0, Font::Bold, theme::ACCENT, info.title);
        y -= 6.0;
        for (label, value) in lines {
            y -= line_height(BODY_SIZE);
            if !label.is_empty() {
                pager.text(x + CELL_PADDING, y, BODY_SIZE, Font::Bold, theme::MUTED, &label);
            }
            pager.text(x + CELL_PADDING + 80.0, y, BODY_SIZE, Font::Regular, theme::TEXT, &value);
        }
    }
    pager.y = top - height - SECTION_GAP;
}

fn column_edges() -> Vec<(f32, f32)> {
    let mut x = MARGIN;
    COLUMNS
        .iter()
        .map(|column| {
            let width = column.weight * CONTENT_WIDTH;
            let edges = (x, x + width);
            x += width;
            edges
        })
        .collect()
}

fn draw_table_header(pager: &mut Pager) {
    let height = TABLE_HEADER_HEIGHT;
    let top = pager.y;
    pager.rect(MARGIN, top, CONTENT_WIDTH, height, Some(theme::HEADER_FILL), None);
    let baseline = top - 13.5;
    for ((left, right), column) in column_edges().into_iter().zip(COLUMNS.iter()) {
        match column.align {
            Align::Left => pager.text(
                left + CELL_PADDING,
                baseline,
                BODY_SIZE,
                Font::Bold,
                theme::HEADER_TEXT,
                column.title,
            ),
            Align::Right => pager.text_right(
                right - CELL_PADDING,
                baseline,
                BODY_SIZE,
                Font::Bold,
                theme::HEADER_TEXT,
                column.title,
            ),
        }
    }
    pager.y = top - height;
}

struct RowLayout {
    cells: Vec<Vec<String>>,
    notes: Vec<String>,
    height: f32,
}

/// One printed line of a row: a line of every cell, or one sub-note line.
#[derive(Debug, Clone, Copy)]
enum Band {
    Cells(usize),
    Note(usize),
}

impl Band {
    fn height(self) -> f32 {
        match self {
            Band::Cells(_) => line_height(BODY_SIZE),
            Band::Note(_) => line_height(SMALL_SIZE),
        }
    }
}

impl RowLayout {
    fn bands(&self) -> Vec<Band> {
        let cell_lines = self.cells.iter().map(Vec::len).max().unwrap_or(1);
        (0..cell_lines)
            .map(Band::Cells)
            .chain((0..self.notes.len()).map(Band::Note))
            .collect()
    }
}

fn measure_row(row: &TableRow) -> RowLayout {
    let edges = column_edges();
    let cells: Vec<Vec<String>> = row
        .cells
        .iter()
        .zip(edges.iter())
        .map(|(cell, (left, right))| {
            wrap_text(cell, Font::Regular, BODY_SIZE, right - left - 2.0 * CELL_PADDING)
        })
        .collect();
    let notes_left = edges[1].0 + CELL_PADDING;
    let notes: Vec<String> = row
        .sub_notes
        .iter()
        .flat_map(|note| {
            wrap_text(
                note,
                Font::Regular,
                SMALL_SIZE,
                PAGE_WIDTH - MARGIN - CELL_PADDING - notes_left,
            )
        })
        .collect();
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1) as f32;
    let height = 2.0 * CELL_PADDING
        + lines * line_height(BODY_SIZE)
        + notes.len() as f32 * line_height(SMALL_SIZE);
    RowLayout {
        cells,
        notes,
        height,
    }
}

fn draw_table(pager: &mut Pager, rows: &[TableRow]) {
    pager.ensure(TABLE_HEADER_HEIGHT + 30.0);
    draw_table_header(pager);

    if rows.is_empty() {
        let top = pager.y;
        pager.text(
            MARGIN + CELL_PADDING,
            top - 16.0,
            BODY_SIZE,
            Font::Regular,
            theme::MUTED,
            "No line items",
        );
        pager.y = top - 24.0;
    }

    for row in rows {
        draw_row(pager, &measure_row(row), row.shaded);
    }
    pager.y -= SECTION_GAP;
}

/// Draws a row, continuing it under a repeated table header when it is
/// taller than a page.
fn draw_row(pager: &mut Pager, layout: &RowLayout, shaded: bool) {
    let bands = layout.bands();
    let capacity = PAGE_HEIGHT - MARGIN - CONTENT_BOTTOM - TABLE_HEADER_HEIGHT;
    if layout.height <= capacity {
        if pager.ensure(layout.height) {
            draw_table_header(pager);
        }
        draw_row_piece(pager, layout, &bands, shaded);
        return;
    }

    let mut rest = &bands[..];
    let mut fresh_page = false;
    while !rest.is_empty() {
        let room = pager.y - CONTENT_BOTTOM - 2.0 * CELL_PADDING;
        let mut used = 0.0;
        let mut count = 0;
        for band in rest {
            if used + band.height() > room {
                break;
            }
            used += band.height();
            count += 1;
        }
        if count == 0 && !fresh_page {
            pager.new_page();
            draw_table_header(pager);
            fresh_page = true;
            continue;
        }

        let (piece, tail) = rest.split_at(count.max(1));
        draw_row_piece(pager, layout, piece, shaded);
        rest = tail;
        fresh_page = false;
        if !rest.is_empty() {
            pager.new_page();
            draw_table_header(pager);
            fresh_page = true;
        }
    }
}

fn draw_row_piece(pager: &mut Pager, layout: &RowLayout, bands: &[Band], shaded: bool) {
    let edges = column_edges();
    let height = 2.0 * CELL_PADDING + bands.iter().map(|band| band.height()).sum::<f32>();
    let top = pager.y;
    if shaded {
        pager.rect(MARGIN, top, CONTENT_WIDTH, height, Some(theme::SHADED_ROW), None);
    }

    let mut y = top - CELL_PADDING;
    for band in bands {
        y -= band.height();
        match *band {
            Band::Cells(index) => {
                for ((lines, (left, right)), column) in
                    layout.cells.iter().zip(edges.iter()).zip(COLUMNS.iter())
                {
                    let Some(line) = lines.get(index) else {
                        continue;
                    };
                    match column.align {
                        Align::Left => pager.text(
                            left + CELL_PADDING,
                            y + 2.0,
                            BODY_SIZE,
                            Font::Regular,
                            theme::TEXT,
                            line,
                        ),
                        Align::Right => pager.text_right(
                            right - CELL_PADDING,
                            y + 2.0,
                            BODY_SIZE,
                            Font::Regular,
                            theme::TEXT,
                            line,
                        ),
                    }
                }
            }
            Band::Note(index) => pager.text(
                edges[1].0 + CELL_PADDING,
                y + 2.0,
                SMALL_SIZE,
                Font::Regular,
                theme::MUTED,
                &layout.notes[index],
            ),
        }
    }

    let bottom = top - height;
    pager.hline(bottom, theme::BORDER, 0.5);
    pager.y = bottom;
}

fn draw_grand_total(pager: &mut Pager, total: &str) {
    let height = 26.0;
    pager.ensure(height);
    let top = pager.y;
    let width = 220.0;
    let x = PAGE_WIDTH - MARGIN - width;
    pager.rect(x, top, width, height, Some(theme::PANEL_FILL), Some(theme::BORDER));
    pager.text(x + 10.0, top - 17.0, 11.0, Font::Bold, theme::TEXT, "Grand Total");
    pager.text_right(
        PAGE_WIDTH - MARGIN - 10.0,
        top - 17.0,
        11.0,
        Font::Bold,
        theme::ACCENT,
        total,
    );
    pager.y = top - height - SECTION_GAP;
}

fn draw_notes(pager: &mut Pager, notes: &str) {
    let lines = wrap_text(notes, Font::Regular, BODY_SIZE, CONTENT_WIDTH);
    pager.ensure(14.0 + line_height(BODY_SIZE));
    pager.y -= 10.0;
    let y = pager.y;
    pager.text(MARGIN, y, 10.0, Font::Bold, theme::ACCENT, "Notes");
    pager.y -= 4.0;
    for line in lines {
        pager.ensure(line_height(BODY_SIZE));
        pager.y -= line_height(BODY_SIZE);
        let y = pager.y;
        pager.text(MARGIN, y, BODY_SIZE, Font::Regular, theme::TEXT, &line);
    }
}

fn draw_footer(page: &mut Page, footer: &str, number: usize, total: usize) {
    let rule = MARGIN + FOOTER_HEIGHT - 10.0;
    page.ops.push(DrawOp::Line {
        from: (MARGIN, rule),
        to: (PAGE_WIDTH - MARGIN, rule),
        width: 0.5,
        color: theme::BORDER,
    });

    let label = format!("Page {} of {}", number, total);
    let label_width = text_width(&label, Font::Regular, SMALL_SIZE);
    let baseline = rule - 14.0;
    let available = CONTENT_WIDTH - label_width - 20.0;
    let mut y = baseline;
    for line in wrap_text(footer, Font::Regular, SMALL_SIZE, available)
        .into_iter()
        .take(FOOTER_LINES)
    {
        page.ops.push(DrawOp::Text {
            x: MARGIN,
            y,
            size: SMALL_SIZE,
            font: Font::Regular,
            color: theme::MUTED,
            text: line,
        });
        y -= line_height(SMALL_SIZE);
    }
    page.ops.push(DrawOp::Text {
        x: PAGE_WIDTH - MARGIN - label_width,
        y: baseline,
        size: SMALL_SIZE,
        font: Font::Regular,
        color: theme::MUTED,
        text: label,
    });
}
