//! Line tokenizer: `key=value` entries, `#` comments and blank lines.

use crate::error::{FixtureError, FixtureResult};

/// One `key=value` line, both sides trimmed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry<'a> {
    pub line: usize,
    pub key: &'a str,
    pub value: &'a str,
}

/// Shape of an entry key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key<'a> {
    /// `domain_id`
    Scalar(&'a str),
    /// `goal_count`
    Count(&'a str),
    /// `policy.cost_full`
    Section(&'a str, &'a str),
    /// `goal.0.priority`
    Row {
        kind: &'a str,
        index: usize,
        field: &'a str,
    },
}

impl<'a> Entry<'a> {
    pub fn parse_key(&self) -> FixtureResult<Key<'a>> {
        let mut parts = self.key.split('.');
        let key = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(name), None, None, None) => match name.strip_suffix("_count") {
                Some(kind) if !kind.is_empty() => Key::Count(kind),
                _ => Key::Scalar(name),
            },
            (Some(section), Some(field), None, None) => Key::Section(section, field),
            (Some(kind), Some(index), Some(field), None) => {
                let index = index.parse().map_err(|_| self.unknown_key())?;
                Key::Row { kind, index, field }
            }
            _ => return Err(self.unknown_key()),
        };
        Ok(key)
    }

    pub fn unknown_key(&self) -> FixtureError {
        FixtureError::UnknownKey {
            line: self.line,
            key: self.key.to_owned(),
        }
    }
}

pub struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines().enumerate(),
        }
    }

    fn next_content(&mut self) -> Option<(usize, &'a str)> {
        self.inner.by_ref().find_map(|(idx, raw)| {
            let text = raw.trim();
            (!text.is_empty() && !text.starts_with('#')).then_some((idx + 1, text))
        })
    }

    /// First non-comment line, returned as `(line, text)`.
    pub fn header(&mut self) -> FixtureResult<(usize, &'a str)> {
        self.next_content().ok_or(FixtureError::MissingHeader)
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = FixtureResult<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let (line, text) = self.next_content()?;
        let entry = match text.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(Entry {
                line,
                key: key.trim(),
                value: value.trim(),
            }),
            _ => Err(FixtureError::Malformed {
                line,
                text: text.to_owned(),
            }),
        };
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_numbers_lines() {
        let text = "HEADER\n\n# note\n  goal.0.priority = 0.5 \nbroken\n";
        let mut lines = Lines::new(text);
        assert_eq!(lines.header().unwrap(), (1, "HEADER"));
        let entry = lines.next().unwrap().unwrap();
        assert_eq!(entry.line, 4);
        assert_eq!(entry.key, "goal.0.priority");
        assert_eq!(entry.value, "0.5");
        assert!(matches!(
            lines.next(),
            Some(Err(FixtureError::Malformed { line: 5, .. }))
        ));
        assert!(lines.next().is_none());
    }

    #[test]
    fn key_shapes() {
        let entry = |key| Entry {
            line: 1,
            key,
            value: "",
        };
        assert_eq!(entry("domain_id").parse_key().unwrap(), Key::Scalar("domain_id"));
        assert_eq!(entry("plan_count").parse_key().unwrap(), Key::Count("plan"));
        assert_eq!(
            entry("policy.cost_full").parse_key().unwrap(),
            Key::Section("policy", "cost_full")
        );
        assert_eq!(
            entry("event.12.process").parse_key().unwrap(),
            Key::Row {
                kind: "event",
                index: 12,
                field: "process"
            }
        );
        assert!(entry("event.x.process").parse_key().is_err());
        assert!(entry("a.b.c.d").parse_key().is_err());
    }
}
