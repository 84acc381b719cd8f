//! Minimal PDF 1.4 writer for laid-out report documents.
//!
//! Uncompressed content streams, the two standard Helvetica faces and
//! WinAnsi text encoding. Output is plain ASCII with no random
//! identifiers, so exports of one report vary only in the timestamp.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::layout::{Document, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, TextItem};

const PT_PER_MM: f32 = 72.0 / 25.4;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_REGULAR_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;
const INFO_ID: usize = 5;
const FIRST_PAGE_ID: usize = 6;

impl Document {
    /// Serialize the document as PDF bytes.
    pub fn to_pdf(&self) -> Vec<u8> {
        let mut writer = PdfWriter::default();
        let page_count = self.pages.len();
        let page_ids: Vec<usize> = (0..page_count).map(|i| FIRST_PAGE_ID + i * 2).collect();

        writer.object(
            CATALOG_ID,
            format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>").as_bytes(),
        );

        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        writer.object(
            PAGES_ID,
            format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>").as_bytes(),
        );

        writer.object(
            FONT_REGULAR_ID,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        );
        writer.object(
            FONT_BOLD_ID,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
        );

        let mut info = Vec::new();
        info.extend_from_slice(b"<< /Title ");
        info.extend_from_slice(&pdf_string(&self.title));
        info.extend_from_slice(b" /Subject ");
        info.extend_from_slice(&pdf_string(&format!("Report {}", self.identifier)));
        info.extend_from_slice(b" /Producer (biasbuster-export) /CreationDate ");
        info.extend_from_slice(&pdf_string(&pdf_date(self.generated_at)));
        info.extend_from_slice(b" >>");
        writer.object(INFO_ID, &info);

        let media_box = format!(
            "[0 0 {} {}]",
            fmt_num(PAGE_WIDTH_MM * PT_PER_MM),
            fmt_num(PAGE_HEIGHT_MM * PT_PER_MM)
        );
        for (page, page_id) in self.pages.iter().zip(&page_ids) {
            let content_id = page_id + 1;
            writer.object(
                *page_id,
                format!(
                    "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox {media_box} \
                     /Resources << /Font << /F1 {FONT_REGULAR_ID} 0 R /F2 {FONT_BOLD_ID} 0 R >> >> \
                     /Contents {content_id} 0 R >>"
                )
                .as_bytes(),
            );

            let stream = content_stream(&page.items);
            let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            body.extend_from_slice(&stream);
            body.extend_from_slice(b"\nendstream");
            writer.object(content_id, &body);
        }

        writer.finish(CATALOG_ID, INFO_ID)
    }
}

#[derive(Default)]
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl PdfWriter {
    fn object(&mut self, id: usize, body: &[u8]) {
        if self.buf.is_empty() {
            self.buf.extend_from_slice(b"%PDF-1.4\n");
        }
        self.offsets.push((id, self.buf.len()));
        self.buf.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        self.offsets.sort_by_key(|(id, _)| *id);
        let size = self.offsets.len() + 1;
        let xref_offset = self.buf.len();

        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for (_, offset) in &self.offsets {
            let _ = write!(xref, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {size} /Root {root} 0 R /Info {info} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

fn content_stream(items: &[TextItem]) -> Vec<u8> {
    let mut out = Vec::new();
    for item in items {
        let font = if item.role.is_bold() { "F2" } else { "F1" };
        let x = item.x * PT_PER_MM;
        let y = (PAGE_HEIGHT_MM - item.y) * PT_PER_MM;
        out.extend_from_slice(
            format!(
                "BT /{font} {} Tf {} {} Td ",
                fmt_num(item.size),
                fmt_num(x),
                fmt_num(y)
            )
            .as_bytes(),
        );
        out.extend_from_slice(&pdf_string(&item.text));
        out.extend_from_slice(b" Tj ET\n");
    }
    if out.last() == Some(&b'\n') {
        out.pop();
    }
    out
}

fn fmt_num(value: f32) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn pdf_date(at: DateTime<Utc>) -> String {
    format!("D:{}Z", at.format("%Y%m%d%H%M%S"))
}

/// Literal string in WinAnsi encoding; unmappable characters become `?`.
fn pdf_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for ch in text.chars() {
        match win_ansi(ch) {
            Some(b'(') => out.extend_from_slice(b"\\("),
            Some(b')') => out.extend_from_slice(b"\\)"),
            Some(b'\\') => out.extend_from_slice(b"\\\\"),
            Some(byte @ 0x20..=0x7E) => out.push(byte),
            Some(byte) => out.extend_from_slice(format!("\\{byte:03o}").as_bytes()),
            None => out.push(b'?'),
        }
    }
    out.push(b')');
    out
}

fn win_ansi(ch: char) -> Option<u8> {
    let byte = match ch {
        '\t' => b' ',
        ' '..='~' => ch as u8,
        '\u{A0}'..='\u{FF}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        _ => return None,
    };
    Some(byte)
}
