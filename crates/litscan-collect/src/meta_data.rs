//! Provenance for a collection run: which database, which build, and how the
//! requests were paced and logged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::process::{extract, FieldKind, FieldValue};
use crate::requester::RequesterSummary;

/// Fields read from an einfo response, with how to read each.
pub const DB_INFO_FIELDS: [(&str, FieldKind); 6] = [
    ("dbname",      FieldKind::Str),
    ("menuname",    FieldKind::Str),
    ("description", FieldKind::Str),
    ("dbbuild",     FieldKind::Str),
    ("count",       FieldKind::Int),
    ("lastupdate",  FieldKind::Str),
];

/// Database identity as reported by einfo. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbInfo {
    pub dbname: Option<String>,
    pub menuname: Option<String>,
    pub description: Option<String>,
    pub dbbuild: Option<String>,
    pub count: Option<u64>,
    pub lastupdate: Option<String>,
}

impl DbInfo {
    pub fn from_document(document: &str) -> Self {
        let mut info = DbInfo::default();
        for (field, kind) in DB_INFO_FIELDS {
            let value = extract(document, field, kind);
            match field {
                "dbname"      => info.dbname = value.and_then(FieldValue::into_string),
                "menuname"    => info.menuname = value.and_then(FieldValue::into_string),
                "description" => info.description = value.and_then(FieldValue::into_string),
                "dbbuild"     => info.dbbuild = value.and_then(FieldValue::into_string),
                "count"       => {
                    info.count = value
                        .and_then(|v| v.as_int())
                        .and_then(|n| u64::try_from(n).ok())
                }
                "lastupdate"  => info.lastupdate = value.and_then(FieldValue::into_string),
                _ => {}
            }
        }
        info
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    date: DateTime<Utc>,
    db_info: Option<DbInfo>,
    requester: RequesterSummary,
}

impl MetaData {
    pub fn new(db_info: Option<DbInfo>, requester: RequesterSummary) -> Self {
        Self { date: Utc::now(), db_info, requester }
    }

    /// When the record was created.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn db_info(&self) -> Option<&DbInfo> {
        self.db_info.as_ref()
    }

    pub fn requester(&self) -> &RequesterSummary {
        &self.requester
    }

    /// Pretty-printed JSON record of the collection.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
