//! `.eml` body extraction.
//!
//! Multipart messages are scanned depth-first in stored order. An HTML part
//! is preferred over a plain-text part even when the plain part comes first;
//! attachments are never treated as the body.

use encoding_rs::Encoding;
use mailparse::{DispositionType, ParsedMail};

use super::html::html_to_text;
use crate::error::CoreError;

const MIME_TEXT_HTML: &str = "text/html";
const MIME_TEXT_PLAIN: &str = "text/plain";

/// Extract the readable body of an RFC 5322 message.
pub fn extract(bytes: &[u8]) -> Result<String, CoreError> {
    let mail = mailparse::parse_mail(bytes).map_err(|e| CoreError::Parse(e.to_string()))?;

    if !is_multipart(&mail) {
        let body = decode_payload(&mail)?;
        return Ok(if mail.ctype.mimetype == MIME_TEXT_HTML {
            html_to_text(&body)
        } else {
            body
        });
    }

    let mut html_part = None;
    let mut plain_part = None;
    find_text_parts(&mail, &mut html_part, &mut plain_part);

    match (html_part, plain_part) {
        (Some(part), _) => Ok(html_to_text(&decode_payload(part)?)),
        (None, Some(part)) => decode_payload(part),
        (None, None) => Err(CoreError::NoBodyFound),
    }
}

fn is_multipart(mail: &ParsedMail<'_>) -> bool {
    mail.ctype.mimetype.starts_with("multipart/")
}

fn is_attachment(part: &ParsedMail<'_>) -> bool {
    matches!(
        part.get_content_disposition().disposition,
        DispositionType::Attachment
    )
}

/// Record the first HTML and first plain-text leaf parts under `mail`.
fn find_text_parts<'a, 'b>(
    mail: &'b ParsedMail<'a>,
    html_part: &mut Option<&'b ParsedMail<'a>>,
    plain_part: &mut Option<&'b ParsedMail<'a>>,
) {
    for part in &mail.subparts {
        if html_part.is_some() {
            return;
        }
        if is_multipart(part) {
            find_text_parts(part, html_part, plain_part);
            continue;
        }
        if is_attachment(part) {
            continue;
        }
        match part.ctype.mimetype.as_str() {
            MIME_TEXT_HTML => *html_part = Some(part),
            MIME_TEXT_PLAIN if plain_part.is_none() => *plain_part = Some(part),
            _ => {}
        }
    }
}

/// Undo the transfer encoding and decode the declared charset.
///
/// Decoding is strict: an unknown charset label or bytes that are invalid in
/// the declared charset fail instead of turning into replacement characters.
fn decode_payload(part: &ParsedMail<'_>) -> Result<String, CoreError> {
    let mimetype = &part.ctype.mimetype;
    let charset = &part.ctype.charset;

    let raw = part
        .get_body_raw()
        .map_err(|e| CoreError::Parse(format!("undecodable {mimetype} payload: {e}")))?;

    let encoding = Encoding::for_label(charset.as_bytes())
        .ok_or_else(|| CoreError::Parse(format!("unknown charset {charset:?} in {mimetype} part")))?;

    encoding
        .decode_without_bom_handling_and_without_replacement(&raw)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            CoreError::Parse(format!("{mimetype} payload is not valid {}", encoding.name()))
        })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const HTML_BODY: &str = "<html><body><p>Quarterly numbers are in.</p></body></html>";

    fn multipart(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut raw = String::from(
            "From: alice@example.com\r\n\
             To: bob@example.com\r\n\
             Subject: Report\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/alternative; boundary=\"XYZ\"\r\n\r\n",
        );
        for (ctype, body) in parts {
            raw.push_str("--XYZ\r\n");
            raw.push_str(&format!("Content-Type: {ctype}; charset=utf-8\r\n\r\n"));
            raw.push_str(body);
            raw.push_str("\r\n");
        }
        raw.push_str("--XYZ--\r\n");
        raw.into_bytes()
    }

    #[test]
    fn single_part_plain_text_is_returned_unchanged() {
        let raw = b"From: alice@example.com\r\n\
                    Subject: Hi\r\n\
                    Content-Type: text/plain; charset=utf-8\r\n\r\n\
                    Hello Bob,\r\nsee you at 10.\r\n";
        let body = extract(raw).unwrap();
        assert_eq!(body, "Hello Bob,\r\nsee you at 10.\r\n");
    }

    #[test]
    fn single_part_without_content_type_defaults_to_plain() {
        let raw = b"Subject: bare\r\n\r\njust text";
        assert_eq!(extract(raw).unwrap(), "just text");
    }

    #[test]
    fn single_part_html_is_converted() {
        let raw = format!("Subject: Hi\r\nContent-Type: text/html\r\n\r\n{HTML_BODY}");
        let body = extract(raw.as_bytes()).unwrap();
        assert_eq!(body.trim_end(), html_to_text(HTML_BODY).trim_end());
        assert!(!body.contains("<p>"));
    }

    #[test]
    fn html_part_wins_even_when_plain_comes_first() {
        let raw = multipart(&[
            ("text/plain", "Plain version"),
            ("text/html", HTML_BODY),
        ]);
        let body = extract(&raw).unwrap();
        assert_eq!(body.trim_end(), html_to_text(HTML_BODY).trim_end());
        assert!(!body.contains("Plain version"));
    }

    #[test]
    fn plain_part_used_when_no_html() {
        let raw = multipart(&[("text/plain", "Only plain here")]);
        assert_eq!(extract(&raw).unwrap().trim_end(), "Only plain here");
    }

    #[test]
    fn nested_alternative_inside_mixed_is_found() {
        let raw = b"Subject: nested\r\n\
                    Content-Type: multipart/mixed; boundary=\"OUTER\"\r\n\r\n\
                    --OUTER\r\n\
                    Content-Type: multipart/alternative; boundary=\"INNER\"\r\n\r\n\
                    --INNER\r\n\
                    Content-Type: text/plain\r\n\r\n\
                    inner plain\r\n\
                    --INNER--\r\n\
                    --OUTER\r\n\
                    Content-Type: application/pdf\r\n\
                    Content-Disposition: attachment; filename=\"a.pdf\"\r\n\r\n\
                    %PDF-1.4\r\n\
                    --OUTER--\r\n";
        assert_eq!(extract(raw).unwrap().trim_end(), "inner plain");
    }

    #[test]
    fn text_attachment_is_not_the_body() {
        let raw = b"Subject: attached\r\n\
                    Content-Type: multipart/mixed; boundary=\"B\"\r\n\r\n\
                    --B\r\n\
                    Content-Type: text/plain\r\n\
                    Content-Disposition: attachment; filename=\"notes.txt\"\r\n\r\n\
                    attachment text\r\n\
                    --B--\r\n";
        assert_matches!(extract(raw), Err(CoreError::NoBodyFound));
    }

    #[test]
    fn multipart_without_text_parts_has_no_body() {
        let raw = multipart(&[("application/octet-stream", "AAAA")]);
        assert_matches!(extract(&raw), Err(CoreError::NoBodyFound));
    }

    #[test]
    fn quoted_printable_and_charset_are_decoded() {
        let raw = b"Subject: qp\r\n\
                    Content-Type: text/plain; charset=iso-8859-1\r\n\
                    Content-Transfer-Encoding: quoted-printable\r\n\r\n\
                    caf=E9 cr=E8me";
        assert_eq!(extract(raw).unwrap(), "caf\u{e9} cr\u{e8}me");
    }

    #[test]
    fn base64_payload_is_decoded() {
        let raw = b"Subject: b64\r\n\
                    Content-Type: text/plain; charset=utf-8\r\n\
                    Content-Transfer-Encoding: base64\r\n\r\n\
                    SGVsbG8gd29ybGQ=\r\n";
        assert_eq!(extract(raw).unwrap(), "Hello world");
    }

    #[test]
    fn invalid_utf8_payload_is_a_parse_error() {
        let raw = b"Subject: broken\r\n\
                    Content-Type: text/plain; charset=utf-8\r\n\r\n\
                    bad \xff\xfe bytes";
        assert_matches!(extract(raw), Err(CoreError::Parse(msg)) if msg.contains("UTF-8"));
    }

    #[test]
    fn unknown_charset_is_a_parse_error() {
        let raw = b"Subject: bogus\r\n\
                    Content-Type: text/plain; charset=x-bogus\r\n\r\n\
                    caf\xe9";
        assert_matches!(extract(raw), Err(CoreError::Parse(msg)) if msg.contains("x-bogus"));
    }

    #[test]
    fn invalid_bytes_in_chosen_part_fail_multipart_extraction() {
        let mut raw = multipart(&[("text/plain", "fine"), ("text/html", "<p>x</p>")]);
        let at = raw.windows(8).position(|w| w == b"<p>x</p>").unwrap();
        raw[at + 3] = 0xC3;
        assert_matches!(extract(&raw), Err(CoreError::Parse(_)));
    }

    #[test]
    fn bad_base64_is_a_parse_error() {
        let raw = b"Subject: b64\r\n\
                    Content-Type: text/plain; charset=utf-8\r\n\
                    Content-Transfer-Encoding: base64\r\n\r\n\
                    !!!not base64!!!\r\n";
        assert_matches!(extract(raw), Err(CoreError::Parse(_)));
    }
}
