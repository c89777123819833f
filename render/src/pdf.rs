//! Minimal PDF 1.4 writer.
//!
//! Only what a text transcript needs: the base-14 fonts with WinAnsi
//! encoding, one uncompressed content stream per page, and a classic xref
//! table. Output depends only on the input pages and metadata, so the same
//! certificate always serializes to the same bytes.

use crate::layout::{Font, Page, TextRun};
use crate::PageSize;

/// Document-level metadata written to the Info dictionary.
#[derive(Clone, Debug)]
pub struct DocumentInfo {
    pub title: String,
    pub producer: String,
    /// PDF date string, e.g. `D:20261019083000Z`.
    pub creation_date: String,
}

const CATALOG: usize = 1;
const PAGES: usize = 2;
const INFO: usize = 3;
const FIRST_FONT: usize = 4;

fn font_object(font: Font) -> usize {
    FIRST_FONT + Font::ALL.iter().position(|f| *f == font).unwrap_or(0)
}

/// Map a char to its WinAnsiEncoding byte. Unmappable chars become `?`.
fn win_ansi(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{20AC}' => 0x80,
        '\u{00A0}'..='\u{00FF}' => c as u32 as u8,
        _ => b'?',
    }
}

/// Encode `text` as a PDF literal string, parentheses included.
pub fn literal_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for byte in text.chars().map(win_ansi) {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            0x20..=0x7E => out.push(byte),
            _ => out.extend_from_slice(format!("\\{byte:03o}").as_bytes()),
        }
    }
    out.push(b')');
    out
}

fn text_op(out: &mut Vec<u8>, run: &TextRun) {
    out.extend_from_slice(
        format!("BT /{} {} Tf {} {} Td ", run.font.resource(), run.size, run.x, run.y).as_bytes(),
    );
    out.extend_from_slice(&literal_string(&run.text));
    out.extend_from_slice(b" Tj ET\n");
}

/// Content stream for one page: watermark first so text draws over it.
fn content_stream(page: &Page, size: PageSize) -> Vec<u8> {
    let mut out = Vec::new();
    let x = size.width / 6;
    let y = size.height / 4;
    out.extend_from_slice(
        format!(
            "q 0.88 g BT /{} 36 Tf 0.7071 0.7071 -0.7071 0.7071 {x} {y} Tm ",
            Font::Heading.resource()
        )
        .as_bytes(),
    );
    out.extend_from_slice(&literal_string(&page.watermark));
    out.extend_from_slice(b" Tj ET Q\n0 g\n");
    for run in &page.runs {
        text_op(&mut out, run);
    }
    out
}

/// Serialize laid-out pages into a complete PDF file.
pub fn write_document(pages: &[Page], size: PageSize, info: &DocumentInfo) -> Vec<u8> {
    let first_page = FIRST_FONT + Font::ALL.len();
    // Each page takes two objects: the page dictionary and its content stream.
    let page_obj = |i: usize| first_page + 2 * i;

    let mut objects: Vec<Vec<u8>> = Vec::new();
    objects.push(format!("<< /Type /Catalog /Pages {PAGES} 0 R >>").into_bytes());

    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", page_obj(i))).collect();
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .into_bytes(),
    );

    let mut info_dict = b"<< /Title ".to_vec();
    info_dict.extend_from_slice(&literal_string(&info.title));
    info_dict.extend_from_slice(b" /Producer ");
    info_dict.extend_from_slice(&literal_string(&info.producer));
    info_dict.extend_from_slice(b" /CreationDate ");
    info_dict.extend_from_slice(&literal_string(&info.creation_date));
    info_dict.extend_from_slice(b" >>");
    objects.push(info_dict);

    for font in Font::ALL {
        objects.push(
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            )
            .into_bytes(),
        );
    }

    let font_resources: Vec<String> = Font::ALL
        .iter()
        .map(|f| format!("/{} {} 0 R", f.resource(), font_object(*f)))
        .collect();
    for (i, page) in pages.iter().enumerate() {
        objects.push(
            format!(
                "<< /Type /Page /Parent {PAGES} 0 R /MediaBox [0 0 {} {}] /Resources << /Font << {} >> >> /Contents {} 0 R >>",
                size.width,
                size.height,
                font_resources.join(" "),
                page_obj(i) + 1
            )
            .into_bytes(),
        );
        let stream = content_stream(page, size);
        let mut obj = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        obj.extend_from_slice(&stream);
        obj.extend_from_slice(b"\nendstream");
        objects.push(obj);
    }

    assemble(&objects)
}

/// Number objects from 1, then append the xref table and trailer.
fn assemble(objects: &[Vec<u8>]) -> Vec<u8> {
    let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root {CATALOG} 0 R /Info {INFO} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}
