use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::analyzer::{EntityType, PiiAnalyzer, PiiSpan};

/// Replace each span with `<ENTITY_TYPE>`. Spans must be sorted and disjoint,
/// as returned by [`PiiAnalyzer::analyze`].
pub fn anonymize(text: &str, spans: &[PiiSpan]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for span in spans {
        if span.start < cursor || span.end > text.len() {
            continue;
        }
        out.push_str(&text[cursor..span.start]);
        out.push('<');
        out.push_str(span.entity_type.as_str());
        out.push('>');
        cursor = span.end;
    }

    out.push_str(&text[cursor..]);
    out
}

/// Counts of replaced entities across a redaction run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedactionReport {
    pub cells_scanned: usize,
    pub cells_redacted: usize,
    pub entities: BTreeMap<EntityType, usize>,
}

impl RedactionReport {
    pub fn total_entities(&self) -> usize {
        self.entities.values().sum()
    }
}

/// Analyzer plus anonymizer
#[derive(Default)]
pub struct Redactor {
    analyzer: PiiAnalyzer,
}

impl Redactor {
    /// Redacted text; borrowed when nothing was found
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let spans = self.analyzer.analyze(text);
        if spans.is_empty() {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(anonymize(text, &spans))
        }
    }

    /// Like [`Redactor::redact`], tallying into `report`
    pub fn redact_counted<'a>(&self, text: &'a str, report: &mut RedactionReport) -> Cow<'a, str> {
        report.cells_scanned += 1;
        let spans = self.analyzer.analyze(text);
        if spans.is_empty() {
            return Cow::Borrowed(text);
        }

        report.cells_redacted += 1;
        for span in &spans {
            *report.entities.entry(span.entity_type).or_insert(0) += 1;
        }
        Cow::Owned(anonymize(text, &spans))
    }
}
