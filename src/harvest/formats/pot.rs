//! GNU gettext POT rendering.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::harvest::traits::TemplateFormat;
use crate::model::TranslationEntry;

/// Placeholder in [`POT_HEADER`] replaced by the creation timestamp.
const CREATION_DATE: &str = "{creation_date}";

/// `POT-Creation-Date` layout.
pub const CREATION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M+0000";

/// Standard xgettext boilerplate. Only the creation date is filled in.
pub const POT_HEADER: &str = r#"# SOME DESCRIPTIVE TITLE.
# Copyright (C) YEAR THE PACKAGE'S COPYRIGHT HOLDER
# This file is distributed under the same license as the PACKAGE package.
# FIRST AUTHOR <EMAIL@ADDRESS>, YEAR.
#
msgid ""
msgstr ""
"Project-Id-Version: PACKAGE VERSION\n"
"Report-Msgid-Bugs-To: \n"
"POT-Creation-Date: {creation_date}\n"
"PO-Revision-Date: YEAR-MO-DA HO:MI+ZONE\n"
"Last-Translator: FULL NAME <EMAIL@ADDRESS>\n"
"Language-Team: LANGUAGE <LL@li.org>\n"
"Language: \n"
"MIME-Version: 1.0\n"
"Content-Type: text/plain; charset=UTF-8\n"
"Content-Transfer-Encoding: 8bit\n"
"#;

/// Renders entries as a gettext template, one `msgctxt`/`msgid`/`msgstr`
/// block per entry.
#[derive(Debug, Clone, Copy)]
pub struct PotFormat {
    emit_header: bool,
}

impl Default for PotFormat {
    fn default() -> Self {
        Self { emit_header: true }
    }
}

impl PotFormat {
    pub fn new(emit_header: bool) -> Self {
        Self { emit_header }
    }

    pub fn emits_header(&self) -> bool {
        self.emit_header
    }
}

/// Turns line breaks into gettext continuations: every line but the last
/// ends in `\n"` and the next starts a new quoted segment. A carriage return
/// outside a CRLF pair is written as the `\r` escape.
pub fn format_msgid(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\\r")
        .replace('\n', "\\n\"\n\"")
}

impl TemplateFormat for PotFormat {
    fn name(&self) -> &str {
        "pot"
    }

    fn extension(&self) -> &str {
        "pot"
    }

    fn render(&self, entries: &BTreeSet<TranslationEntry>, created: DateTime<Utc>) -> String {
        let mut out = String::new();
        if self.emit_header {
            let stamp = created.format(CREATION_DATE_FORMAT).to_string();
            out.push_str(&POT_HEADER.replace(CREATION_DATE, &stamp));
        }

        for entry in entries {
            // Blank line separates each block from whatever precedes it.
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!(
                "msgctxt \"{}\"\nmsgid \"{}\"\nmsgstr \"\"\n",
                entry.scope,
                format_msgid(&entry.text)
            ));
        }
        out
    }
}
