//! Self-contained HTML document carrying the store payload.
//!
//! The exported store is base64-encoded into a single script element. The
//! element is located by its exact opening tag; everything up to the next
//! `</script>` is payload. Base64 never contains `<`, so the close tag
//! cannot appear inside it.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use vellum_verify::{BADGE_BEGIN, BADGE_END};

use crate::error::{PersistError, PersistResult};

pub const PAYLOAD_OPEN: &str = r#"<script type="application/vnd.vellum.store+base64" id="vellum-store">"#;
pub const PAYLOAD_CLOSE: &str = "</script>";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    text: String,
    payload_start: usize,
    payload_end: usize,
}

impl Document {
    /// Locate the payload region in `text`.
    pub fn parse(text: impl Into<String>) -> PersistResult<Self> {
        let text = text.into();
        let open = text
            .find(PAYLOAD_OPEN)
            .ok_or(PersistError::MissingPayloadRegion)?;
        let payload_start = open + PAYLOAD_OPEN.len();
        let close = text[payload_start..]
            .find(PAYLOAD_CLOSE)
            .ok_or(PersistError::MissingPayloadRegion)?;
        Ok(Self {
            payload_end: payload_start + close,
            payload_start,
            text,
        })
    }

    /// Minimal document with an empty payload and a badge region.
    pub fn blank(title: &str) -> Self {
        let title = escape_html(title);
        let text = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n\
             {BADGE_BEGIN}{BADGE_END}\n<main id=\"vellum-app\"></main>\n{PAYLOAD_OPEN}{PAYLOAD_CLOSE}\n</body>\n</html>\n"
        );
        // The template always contains the region.
        let payload_start = text.find(PAYLOAD_OPEN).unwrap_or(0) + PAYLOAD_OPEN.len();
        Self {
            payload_end: payload_start,
            payload_start,
            text,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn payload_text(&self) -> &str {
        &self.text[self.payload_start..self.payload_end]
    }

    /// Decode the embedded payload. `None` for an empty region (a document
    /// that has never been saved).
    pub fn extract_payload(&self) -> PersistResult<Option<Vec<u8>>> {
        let encoded: String = self
            .payload_text()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        if encoded.is_empty() {
            return Ok(None);
        }
        STANDARD
            .decode(encoded.as_bytes())
            .map(Some)
            .map_err(|e| PersistError::PayloadEncoding(e.to_string()))
    }

    /// Copy of this document with `payload` embedded.
    pub fn with_payload(&self, payload: &[u8]) -> Self {
        let encoded = STANDARD.encode(payload);
        let mut text = String::with_capacity(
            self.text.len() - (self.payload_end - self.payload_start) + encoded.len(),
        );
        text.push_str(&self.text[..self.payload_start]);
        text.push_str(&encoded);
        text.push_str(&self.text[self.payload_end..]);
        Self {
            payload_end: self.payload_start + encoded.len(),
            payload_start: self.payload_start,
            text,
        }
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_has_empty_payload() {
        let doc = Document::blank("Notes");
        assert_eq!(doc.payload_text(), "");
        assert_eq!(doc.extract_payload().unwrap(), None);
        assert!(doc.text().contains("<title>Notes</title>"));
        assert!(doc.text().contains(BADGE_BEGIN));
    }

    #[test]
    fn blank_reparses_identically() {
        let doc = Document::blank("Notes");
        assert_eq!(Document::parse(doc.text().to_string()).unwrap(), doc);
    }

    #[test]
    fn embed_and_extract() {
        let doc = Document::blank("t").with_payload(&[0, 1, 2, 250, 251]);
        let reparsed = Document::parse(doc.clone().into_text()).unwrap();
        assert_eq!(reparsed.extract_payload().unwrap(), Some(vec![0, 1, 2, 250, 251]));
    }

    #[test]
    fn replacing_payload_keeps_surroundings() {
        let first = Document::blank("t").with_payload(b"first payload, fairly long");
        let second = first.with_payload(b"2nd");
        assert_eq!(second.extract_payload().unwrap(), Some(b"2nd".to_vec()));
        assert!(second.text().ends_with("</body>\n</html>\n"));
        assert_eq!(
            second.text().len(),
            Document::blank("t").text().len() + second.payload_text().len()
        );
    }

    #[test]
    fn whitespace_in_payload_is_ignored() {
        let text = format!("<html>{PAYLOAD_OPEN}\n  AAEC\n{PAYLOAD_CLOSE}</html>");
        let doc = Document::parse(text).unwrap();
        assert_eq!(doc.extract_payload().unwrap(), Some(vec![0, 1, 2]));
    }

    #[test]
    fn missing_region_rejected() {
        assert!(matches!(
            Document::parse("<html><body>no store</body></html>"),
            Err(PersistError::MissingPayloadRegion)
        ));
        assert!(matches!(
            Document::parse(format!("<html>{PAYLOAD_OPEN}AAEC")),
            Err(PersistError::MissingPayloadRegion)
        ));
    }

    #[test]
    fn invalid_base64_rejected() {
        let text = format!("{PAYLOAD_OPEN}not*base64{PAYLOAD_CLOSE}");
        let doc = Document::parse(text).unwrap();
        assert!(matches!(
            doc.extract_payload(),
            Err(PersistError::PayloadEncoding(_))
        ));
    }

    #[test]
    fn title_is_escaped() {
        let doc = Document::blank("<b>&</b>");
        assert!(doc.text().contains("<title>&lt;b&gt;&amp;&lt;/b&gt;</title>"));
    }
}
