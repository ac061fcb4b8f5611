//! Field extraction from E-utilities response documents.
//!
//! Tag names are matched case-insensitively, so `dbname` finds `<DbName>`.
//! A field that is not in the document is `None`: not every response carries
//! every field, and callers treat that as normal.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How to interpret the text of a matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text of the first match
    Str,
    /// Text of the first match, parsed as an integer
    Int,
    /// Text of every match, in document order
    List,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    List(Vec<String>),
}

impl FieldValue {
    pub fn into_string(self) -> Option<String> {
        match self {
            FieldValue::Str(s) => Some(s),
            FieldValue::Int(n) => Some(n.to_string()),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<String>> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Extract `field` from `document` as `kind`.
pub fn extract(document: &str, field: &str, kind: FieldKind) -> Option<FieldValue> {
    let limit = if kind == FieldKind::List { usize::MAX } else { 1 };
    let mut texts = find_texts(document, field, limit);
    if texts.is_empty() {
        return None;
    }

    match kind {
        FieldKind::Str => Some(FieldValue::Str(texts.swap_remove(0))),
        FieldKind::Int => {
            let raw = texts.swap_remove(0);
            match raw.trim().parse::<i64>() {
                Ok(n) => Some(FieldValue::Int(n)),
                Err(_) => {
                    warn!(field, value = %raw, "Expected an integer field");
                    None
                }
            }
        }
        FieldKind::List => Some(FieldValue::List(texts)),
    }
}

/// Article count from an esearch response. Accepts `<Count>N</Count>` markup
/// or a bare integer body.
pub fn parse_count(document: &str) -> Option<u64> {
    if let Some(n) = extract(document, "count", FieldKind::Int).and_then(|v| v.as_int()) {
        return u64::try_from(n).ok();
    }
    document.trim().parse::<u64>().ok()
}

/// Text content of up to `limit` elements named `field`, nested text included.
fn find_texts(document: &str, field: &str, limit: usize) -> Vec<String> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut found = Vec::new();
    // Depth inside the current match; 0 means not inside one
    let mut depth = 0usize;
    let mut current = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if depth > 0 {
                    depth += 1;
                } else if e.local_name().as_ref().eq_ignore_ascii_case(field.as_bytes()) {
                    depth = 1;
                    current.clear();
                }
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 0 && e.local_name().as_ref().eq_ignore_ascii_case(field.as_bytes()) {
                    found.push(String::new());
                }
            }
            Ok(Event::Text(ref e)) if depth > 0 => {
                let text = e.unescape().unwrap_or_default();
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&text);
            }
            Ok(Event::CData(e)) if depth > 0 => {
                current.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::End(_)) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    found.push(std::mem::take(&mut current));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("XML parse error while extracting '{}': {}", field, e);
                break;
            }
            _ => {}
        }
        if found.len() >= limit {
            break;
        }
        buf.clear();
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: &str = r#"<?xml version="1.0"?>
<eInfoResult>
  <DbInfo>
    <DbName>pubmed</DbName>
    <MenuName>PubMed</MenuName>
    <Count>37012345</Count>
    <FieldList>
      <Field><Name>ALL</Name></Field>
      <Field><Name>TIAB</Name></Field>
    </FieldList>
  </DbInfo>
</eInfoResult>"#;

    #[test]
    fn test_extract_is_case_insensitive() {
        assert_eq!(
            extract(INFO, "dbname", FieldKind::Str),
            Some(FieldValue::Str("pubmed".to_string()))
        );
    }

    #[test]
    fn test_extract_int_and_list() {
        assert_eq!(extract(INFO, "count", FieldKind::Int), Some(FieldValue::Int(37_012_345)));
        assert_eq!(
            extract(INFO, "name", FieldKind::List).and_then(FieldValue::into_list),
            Some(vec!["ALL".to_string(), "TIAB".to_string()])
        );
    }

    #[test]
    fn test_absent_field_is_none() {
        assert_eq!(extract(INFO, "lastupdate", FieldKind::Str), None);
    }

    #[test]
    fn test_non_numeric_int_is_none() {
        assert_eq!(extract(INFO, "menuname", FieldKind::Int), None);
    }

    #[test]
    fn test_nested_text_is_joined() {
        let doc = "<r><Description>PubMed <i>bibliographic</i> record</Description></r>";
        assert_eq!(
            extract(doc, "description", FieldKind::Str),
            Some(FieldValue::Str("PubMed bibliographic record".to_string()))
        );
    }

    #[test]
    fn test_parse_count_markup_and_plain() {
        assert_eq!(parse_count("<eSearchResult><Count>42</Count></eSearchResult>"), Some(42));
        assert_eq!(parse_count("  17\n"), Some(17));
        assert_eq!(parse_count("<eSearchResult><ERROR>bad</ERROR></eSearchResult>"), None);
    }
}
