//! Change signals
//!
//! Every rewrite reports what it did. The driver uses the count to decide on
//! another pass; users see the rendered list to learn why code changed.

use bitflags::bitflags;
use pyrite_core::SourceRef;
use serde::{Serialize, Serializer};
use tracing::trace;

bitflags! {
    /// Classification of a rewrite
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangeTags: u16 {
        const NEW_BUILTIN = 1 << 0;
        const NEW_IMPORT = 1 << 1;
        const NEW_RAISE = 1 << 2;
        const NEW_VARIABLE = 1 << 3;
        const NEW_EXPRESSION = 1 << 4;
        const NEW_CONSTANT = 1 << 5;
        const VAR_USAGE = 1 << 6;
        const NEW_STATEMENTS = 1 << 7;
    }
}

impl ChangeTags {
    /// Lower-case tag names, e.g. `["new_raise", "new_variable"]`
    pub fn names(self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect()
    }
}

fn serialize_tags<S: Serializer>(tags: &ChangeTags, serializer: S) -> Result<S::Ok, S::Error> {
    tags.names().serialize(serializer)
}

/// One rewrite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSignal {
    #[serde(serialize_with = "serialize_tags")]
    pub tags: ChangeTags,
    pub source_ref: SourceRef,
    pub message: String,
}

/// Signals of one or more passes, in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeLog {
    signals: Vec<ChangeSignal>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal_change(&mut self, tags: ChangeTags, source_ref: &SourceRef, message: impl Into<String>) {
        let message = message.into();
        trace!(tags = ?tags.names(), location = %source_ref, "{}", message);
        self.signals.push(ChangeSignal {
            tags,
            source_ref: source_ref.clone(),
            message,
        });
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn signals(&self) -> &[ChangeSignal] {
        &self.signals
    }

    /// Union of all tags seen
    pub fn tags(&self) -> ChangeTags {
        self.signals
            .iter()
            .fold(ChangeTags::empty(), |tags, signal| tags | signal.tags)
    }

    /// One line per signal, ordered by location; signals at the same
    /// location keep their emission order.
    pub fn render_by_location(&self) -> String {
        let mut ordered: Vec<&ChangeSignal> = self.signals.iter().collect();
        ordered.sort_by(|a, b| a.source_ref.cmp(&b.source_ref));

        ordered
            .iter()
            .map(|signal| {
                format!(
                    "{}:{}: [{}] {}",
                    signal.source_ref.file(),
                    signal.source_ref.line(),
                    signal.tags.names().join(" "),
                    signal.message
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names() {
        let tags = ChangeTags::NEW_RAISE | ChangeTags::NEW_VARIABLE;
        assert_eq!(tags.names(), vec!["new_raise", "new_variable"]);
    }

    #[test]
    fn test_render_sorted_by_location() {
        let mut log = ChangeLog::new();
        log.signal_change(ChangeTags::NEW_CONSTANT, &SourceRef::new("m.py", 9, 0), "late");
        log.signal_change(ChangeTags::NEW_BUILTIN, &SourceRef::new("m.py", 2, 4), "early");

        assert_eq!(
            log.render_by_location(),
            "m.py:2: [new_builtin] early\nm.py:9: [new_constant] late"
        );
        assert_eq!(log.tags(), ChangeTags::NEW_CONSTANT | ChangeTags::NEW_BUILTIN);
    }

    #[test]
    fn test_json_lists_tag_names() {
        let mut log = ChangeLog::new();
        log.signal_change(ChangeTags::NEW_IMPORT, &SourceRef::new("m.py", 1, 0), "import");

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json[0]["tags"][0], "new_import");
        assert_eq!(json[0]["message"], "import");
        assert_eq!(json[0]["source_ref"]["line"], 1);
    }
}
