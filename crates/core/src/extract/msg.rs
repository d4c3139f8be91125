//! `.msg` body extraction.
//!
//! An Outlook message is an OLE compound file. Each MAPI property lives in a
//! stream named `__substg1.0_{id:04X}{type:04X}`; fixed-size properties such
//! as codepages sit in the `__properties_version1.0` table.

use std::io::{Cursor, Read, Seek};

use encoding_rs::Encoding;

use super::html::html_to_text;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// MAPI property identifiers
// ---------------------------------------------------------------------------

const PROP_ID_BODY: u16 = 0x1000;
const PROP_ID_HTML: u16 = 0x1013;

const PT_STRING8: u16 = 0x001E;
const PT_UNICODE: u16 = 0x001F;
const PT_BINARY: u16 = 0x0102;

const PR_INTERNET_CPID: u32 = 0x3FDE_0003;
const PR_MESSAGE_CODEPAGE: u32 = 0x3FFD_0003;

const PROPERTIES_STREAM: &str = "/__properties_version1.0";
/// Header size of the property table of a top-level message.
const PROPERTIES_HEADER_LEN: usize = 32;
const PROPERTY_ENTRY_LEN: usize = 16;

/// Body text as stored in the message, before any HTML conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgBody {
    pub text: String,
    pub is_html: bool,
}

/// Codepages declared in the message property table.
#[derive(Debug, Default, Clone, Copy)]
struct Codepages {
    /// Applies to `PT_STRING8` properties.
    message: Option<u32>,
    /// Applies to the binary HTML body.
    internet: Option<u32>,
}

/// Extract the readable body of an Outlook message.
pub fn extract(bytes: &[u8]) -> Result<String, CoreError> {
    let body = read_body(bytes)?;
    if body.is_html {
        Ok(html_to_text(&body.text))
    } else {
        Ok(body.text)
    }
}

/// Read the stored body and whether it is HTML.
///
/// A non-blank plain-text body wins; the HTML body is the fallback.
pub fn read_body(bytes: &[u8]) -> Result<MsgBody, CoreError> {
    let mut file = cfb::CompoundFile::open(Cursor::new(bytes))
        .map_err(|e| CoreError::Parse(format!("not an Outlook message: {e}")))?;

    let codepages = read_codepages(&mut file)?;

    if let Some(text) = read_text_property(&mut file, PROP_ID_BODY, codepages.message)? {
        if !text.trim().is_empty() {
            return Ok(MsgBody {
                text,
                is_html: false,
            });
        }
    }

    let html = match read_stream(&mut file, &property_stream(PROP_ID_HTML, PT_BINARY))? {
        Some(raw) => Some(decode(&raw, codepages.internet, encoding_rs::UTF_8)),
        None => read_text_property(&mut file, PROP_ID_HTML, codepages.message)?,
    };

    match html {
        Some(text) if !text.trim().is_empty() => Ok(MsgBody {
            text,
            is_html: true,
        }),
        _ => Err(CoreError::NoBodyFound),
    }
}

fn property_stream(id: u16, ty: u16) -> String {
    format!("/__substg1.0_{id:04X}{ty:04X}")
}

fn read_stream<F: Read + Seek>(
    file: &mut cfb::CompoundFile<F>,
    path: &str,
) -> Result<Option<Vec<u8>>, CoreError> {
    if !file.is_stream(path) {
        return Ok(None);
    }
    let mut stream = file
        .open_stream(path)
        .map_err(|e| CoreError::Parse(format!("unreadable stream {path}: {e}")))?;
    let mut data = Vec::new();
    stream
        .read_to_end(&mut data)
        .map_err(|e| CoreError::Parse(format!("unreadable stream {path}: {e}")))?;
    Ok(Some(data))
}

/// Read a string property, preferring the UTF-16 variant over the 8-bit one.
fn read_text_property<F: Read + Seek>(
    file: &mut cfb::CompoundFile<F>,
    id: u16,
    codepage: Option<u32>,
) -> Result<Option<String>, CoreError> {
    if let Some(raw) = read_stream(file, &property_stream(id, PT_UNICODE))? {
        return Ok(Some(decode(&raw, None, encoding_rs::UTF_16LE)));
    }
    Ok(read_stream(file, &property_stream(id, PT_STRING8))?
        .map(|raw| decode(&raw, codepage, encoding_rs::WINDOWS_1252)))
}

fn read_codepages<F: Read + Seek>(
    file: &mut cfb::CompoundFile<F>,
) -> Result<Codepages, CoreError> {
    let mut codepages = Codepages::default();
    let Some(table) = read_stream(file, PROPERTIES_STREAM)? else {
        return Ok(codepages);
    };

    for entry in table
        .get(PROPERTIES_HEADER_LEN..)
        .unwrap_or_default()
        .chunks_exact(PROPERTY_ENTRY_LEN)
    {
        let tag = u32::from_le_bytes([entry[0], entry[1], entry[2], entry[3]]);
        let value = u32::from_le_bytes([entry[8], entry[9], entry[10], entry[11]]);
        match tag {
            PR_MESSAGE_CODEPAGE => codepages.message = Some(value),
            PR_INTERNET_CPID => codepages.internet = Some(value),
            _ => {}
        }
    }
    Ok(codepages)
}

/// Decode property bytes with the declared codepage, or `fallback` when the
/// codepage is absent or unknown. Trailing NUL terminators are dropped.
fn decode(raw: &[u8], codepage: Option<u32>, fallback: &'static Encoding) -> String {
    let encoding = codepage.and_then(encoding_for_codepage).unwrap_or(fallback);
    let (text, _, _) = encoding.decode(raw);
    text.trim_end_matches('\0').to_string()
}

/// Map a Windows codepage identifier to an `encoding_rs` encoding.
fn encoding_for_codepage(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        65001 => Some(encoding_rs::UTF_8),
        1200 => Some(encoding_rs::UTF_16LE),
        1201 => Some(encoding_rs::UTF_16BE),
        874 => Some(encoding_rs::WINDOWS_874),
        932 => Some(encoding_rs::SHIFT_JIS),
        936 => Some(encoding_rs::GBK),
        949 => Some(encoding_rs::EUC_KR),
        950 => Some(encoding_rs::BIG5),
        1250..=1258 => Encoding::for_label(format!("windows-{codepage}").as_bytes()),
        10000 => Some(encoding_rs::MACINTOSH),
        20127 | 28591 => Some(encoding_rs::WINDOWS_1252),
        20866 => Some(encoding_rs::KOI8_R),
        21866 => Some(encoding_rs::KOI8_U),
        28592..=28606 => {
            Encoding::for_label(format!("iso-8859-{}", codepage - 28590).as_bytes())
        }
        50220..=50222 => Some(encoding_rs::ISO_2022_JP),
        51932 => Some(encoding_rs::EUC_JP),
        54936 => Some(encoding_rs::GB18030),
        _ => None,
    }
}
