//! Test utilities for fintrack-core
//!
//! Builds small but well-formed statement PDFs so the extraction stage runs
//! against real content streams instead of pre-split text.

/// Build a PDF with one page per entry of `pages`, each line drawn with
/// Helvetica on its own baseline. An empty page has no text layer.
pub fn statement_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let page_count = pages.len();
    // 1 catalog, 2 page tree, 3 font, then a (page, content) pair per page
    let page_id = |i: usize| 4 + 2 * i;
    let content_id = |i: usize| 5 + 2 * i;

    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            (0..page_count)
                .map(|i| format!("{} 0 R", page_id(i)))
                .collect::<Vec<_>>()
                .join(" "),
            page_count
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    for (i, lines) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            content_id(i)
        ));
        let content = content_stream(lines);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

/// 10pt text with 20pt line spacing so each line extracts on its own row
fn content_stream(lines: &[&str]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut ops = String::from("BT\n/F1 10 Tf\n72 740 Td\n");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            ops.push_str("0 -20 Td\n");
        }
        ops.push_str(&format!("({}) Tj\n", escape(line)));
    }
    ops.push_str("ET");
    ops
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '(' | ')' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let pdf = statement_pdf(&[&["HELLO (WORLD)"], &[]]);
        let text = String::from_utf8(pdf).unwrap();

        let xref_start: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .unwrap()
            .parse()
            .unwrap();
        assert!(text[xref_start..].starts_with("xref\n0 8\n"));

        let entries: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take(7)
            .map(|l| l[..10].parse().unwrap())
            .collect();
        for (i, offset) in entries.iter().enumerate() {
            assert!(text[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
        assert!(text.contains("(HELLO \\(WORLD\\)) Tj"));
    }
}
