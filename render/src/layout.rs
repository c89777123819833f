//! Text layout and pagination.
//!
//! Content is built as blocks of lines. Lines wider than the text column are
//! word-wrapped first. Blocks flow top to bottom and a block that fits on one
//! page is never split: when it would cross into the footer reserve it moves
//! to a fresh page. Only a block taller than a whole page flows line by line.
//! Header, watermark and footer repeat on every page.

use transcript_types::{AcademicRecord, Student};

use crate::{InstitutionProfile, RenderError};

const MARGIN_X: u16 = 60;
const MARGIN_BOTTOM: u16 = 50;
/// Vertical space kept free above the bottom margin for the footer.
const FOOTER_RESERVE: u16 = 150;
/// Distance from the top edge to the first content line.
const HEADER_HEIGHT: u16 = 110;
const MIN_WIDTH: u16 = 300;
/// Extra indent on the continuation lines of a wrapped line.
const CONTINUATION_INDENT: u16 = 12;
/// Header + footer + room for at least one full semester block.
const MIN_HEIGHT: u16 = HEADER_HEIGHT + MARGIN_BOTTOM + FOOTER_RESERVE + 140;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Font {
    /// Times-Bold.
    Heading,
    /// Times-Roman.
    Body,
    /// Helvetica, used for URLs and codes.
    Mono,
}

impl Font {
    pub const ALL: [Font; 3] = [Font::Heading, Font::Body, Font::Mono];

    pub fn resource(&self) -> &'static str {
        match self {
            Font::Heading => "F1",
            Font::Body => "F2",
            Font::Mono => "F3",
        }
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Heading => "Times-Bold",
            Font::Body => "Times-Roman",
            Font::Mono => "Helvetica",
        }
    }
}

/// One positioned line of text. Coordinates are PDF points from the bottom-left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub x: u16,
    pub y: u16,
    pub font: Font,
    pub size: u8,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub runs: Vec<TextRun>,
    pub watermark: String,
}

/// Text printed in every page footer.
#[derive(Clone, Debug)]
pub struct Footer {
    pub verify_url: String,
    pub code: String,
    pub generated_on: String,
}

#[derive(Clone, Debug)]
struct Line {
    indent: u16,
    font: Font,
    size: u8,
    advance: u16,
    text: String,
}

impl Line {
    fn heading(text: impl Into<String>) -> Self {
        Self { indent: 0, font: Font::Heading, size: 13, advance: 22, text: text.into() }
    }

    fn subheading(text: impl Into<String>) -> Self {
        Self { indent: 0, font: Font::Heading, size: 11, advance: 17, text: text.into() }
    }

    fn body(indent: u16, text: impl Into<String>) -> Self {
        Self { indent, font: Font::Body, size: 11, advance: 15, text: text.into() }
    }

    fn spacer(advance: u16) -> Self {
        Self { indent: 0, font: Font::Body, size: 11, advance, text: String::new() }
    }

    /// Split into lines that fit a column `width` points wide.
    fn wrap(self, width: u16) -> Vec<Line> {
        let first = u32::from(width.saturating_sub(self.indent));
        if text_width(&self.text, self.size) <= first {
            return vec![self];
        }
        let rest = u32::from(width.saturating_sub(self.indent + CONTINUATION_INDENT));
        wrap_text(&self.text, self.size, first, rest)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Line {
                indent: if i == 0 { self.indent } else { self.indent + CONTINUATION_INDENT },
                font: self.font,
                size: self.size,
                advance: self.advance,
                text,
            })
            .collect()
    }
}

/// Upper bound on a glyph's advance, in thousandths of an em, across the
/// Times and Helvetica faces in use.
fn glyph_width(c: char) -> u32 {
    match c {
        '@' => 1100,
        'W' | 'M' | 'm' | 'w' | '%' | '&' => 1000,
        c if !c.is_ascii() => 1000,
        c if c.is_ascii_uppercase() => 778,
        _ => 611,
    }
}

/// Estimated width of `text` in points. Never less than the real width.
fn text_width(text: &str, size: u8) -> u32 {
    let units: u32 = text.chars().map(glyph_width).sum();
    (units * u32::from(size)).div_ceil(1000)
}

/// Greedy word wrap. The first piece is at most `first` points wide, the
/// rest at most `rest`. A word wider than a line is split between characters.
fn wrap_text(text: &str, size: u8, first: u32, rest: u32) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let limit = if out.is_empty() { first } else { rest };
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, size) <= limit {
            current = candidate;
            continue;
        }
        if !current.is_empty() && text_width(word, size) <= rest {
            out.push(std::mem::take(&mut current));
            current = word.to_string();
            continue;
        }
        // Too wide for any line: split it, starting on the current one.
        if !current.is_empty() {
            current.push(' ');
        }
        for c in word.chars() {
            let limit = if out.is_empty() { first } else { rest };
            current.push(c);
            if text_width(&current, size) > limit && current.chars().count() > 1 {
                current.pop();
                out.push(std::mem::take(&mut current).trim_end().to_string());
                current.push(c);
            }
        }
    }
    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}

#[derive(Clone, Debug, Default)]
struct Block {
    lines: Vec<Line>,
}

impl Block {
    fn height(&self) -> u16 {
        self.lines.iter().map(|l| l.advance).sum()
    }
}

fn student_block(student: &Student) -> Block {
    Block {
        lines: vec![
            Line::heading("Student Information:"),
            Line::body(0, format!("Name: {}", student.name)),
            Line::body(0, format!("USN: {}", student.usn)),
            Line::body(0, format!("Program: {}", student.major)),
            Line::body(0, format!("Email: {}", student.email)),
            Line::spacer(12),
        ],
    }
}

fn semester_block(record: &AcademicRecord) -> Block {
    let mut lines = vec![Line::subheading(format!(
        "Semester {} - SGPA: {} | CGPA: {}",
        record.semester, record.sgpa, record.cgpa
    ))];
    lines.extend(
        record
            .populated_subjects()
            .map(|s| Line::body(20, format!("\u{2022} {} - {}", s.name, s.mark))),
    );
    lines.push(Line::spacer(8));
    Block { lines }
}

fn content_blocks(student: &Student, records: &[AcademicRecord], width: u16) -> Vec<Block> {
    let mut blocks = vec![student_block(student)];
    let heading = Line::heading("Academic Performance:");
    match records.split_first() {
        None => blocks.push(Block {
            lines: vec![heading, Line::body(0, "No academic records on file.")],
        }),
        Some((first, rest)) => {
            // Keep the section heading on the same page as the first semester.
            let mut block = semester_block(first);
            block.lines.insert(0, heading);
            blocks.push(block);
            blocks.extend(rest.iter().map(semester_block));
        }
    }
    blocks
        .into_iter()
        .map(|block| Block {
            lines: block.lines.into_iter().flat_map(|line| line.wrap(width)).collect(),
        })
        .collect()
}

/// Rough x for centring `text`; Times averages about half an em per glyph.
fn centred_x(page_width: u16, size: u8, text: &str) -> u16 {
    let estimate = text.chars().count() as u32 * u32::from(size) / 2;
    (u32::from(page_width).saturating_sub(estimate) / 2) as u16
}

fn paginate(blocks: &[Block], top: u16, floor: u16) -> Result<Vec<Vec<TextRun>>, RenderError> {
    let capacity = top - floor;
    let mut pages: Vec<Vec<TextRun>> = vec![Vec::new()];
    let mut cursor = top;

    for block in blocks {
        let height = block.height();
        let whole = height <= capacity;
        let current_is_empty = pages.last().is_some_and(|p| p.is_empty());
        if whole && cursor.saturating_sub(height) < floor && !current_is_empty {
            pages.push(Vec::new());
            cursor = top;
        }
        for line in &block.lines {
            if line.advance > capacity {
                return Err(RenderError::Layout(format!(
                    "line of {}pt does not fit a page with {capacity}pt of content space",
                    line.advance
                )));
            }
            if !whole && cursor.saturating_sub(line.advance) < floor {
                pages.push(Vec::new());
                cursor = top;
            }
            cursor -= line.advance;
            if line.text.is_empty() {
                continue;
            }
            let Some(page) = pages.last_mut() else {
                return Err(RenderError::Layout("no page to place content on".to_string()));
            };
            page.push(TextRun {
                x: MARGIN_X + line.indent,
                y: cursor,
                font: line.font,
                size: line.size,
                text: line.text.clone(),
            });
        }
    }
    Ok(pages)
}

fn header(profile: &InstitutionProfile) -> Vec<TextRun> {
    let width = profile.page.width;
    let top = profile.page.height;
    vec![
        TextRun {
            x: centred_x(width, 20, &profile.name),
            y: top - 60,
            font: Font::Heading,
            size: 20,
            text: profile.name.clone(),
        },
        TextRun {
            x: centred_x(width, 13, &profile.subtitle),
            y: top - 82,
            font: Font::Body,
            size: 13,
            text: profile.subtitle.clone(),
        },
    ]
}

fn footer(profile: &InstitutionProfile, footer: &Footer, page: usize, pages: usize) -> Vec<TextRun> {
    let base = MARGIN_BOTTOM;
    let run = |y: u16, font: Font, size: u8, text: String| TextRun { x: MARGIN_X, y, font, size, text };
    let page_label = format!("Page {page} of {pages}");
    vec![
        run(base + 135, Font::Body, 10, "To verify this transcript, visit:".to_string()),
        run(base + 121, Font::Mono, 10, footer.verify_url.clone()),
        run(base + 107, Font::Mono, 10, format!("Verification Code: {}", footer.code)),
        run(base + 81, Font::Heading, 11, profile.issuer_line.clone()),
        run(base + 67, Font::Body, 10, format!("Generated on {}", footer.generated_on)),
        TextRun {
            x: centred_x(profile.page.width, 9, &page_label),
            y: base + 10,
            font: Font::Body,
            size: 9,
            text: page_label,
        },
    ]
}

/// Lay out a full certificate.
pub fn layout(
    profile: &InstitutionProfile,
    student: &Student,
    records: &[AcademicRecord],
    footer_text: &Footer,
) -> Result<Vec<Page>, RenderError> {
    if profile.name.trim().is_empty() {
        return Err(RenderError::EmptyInstitution);
    }
    let size = profile.page;
    if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
        return Err(RenderError::InvalidPageSize {
            width: size.width,
            height: size.height,
        });
    }

    let top = size.height - HEADER_HEIGHT;
    let floor = MARGIN_BOTTOM + FOOTER_RESERVE + 10;
    let column = size.width - 2 * MARGIN_X;
    let bodies = paginate(&content_blocks(student, records, column), top, floor)?;
    let total = bodies.len();
    let watermark = profile.watermark();

    Ok(bodies
        .into_iter()
        .enumerate()
        .map(|(i, body)| {
            let mut runs = header(profile);
            runs.extend(body);
            runs.extend(footer(profile, footer_text, i + 1, total));
            Page {
                runs,
                watermark: watermark.clone(),
            }
        })
        .collect())
}
