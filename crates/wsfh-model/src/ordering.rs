//! Numeric-aware ordering of section names.

use std::cmp::Ordering;

/// Suffix after the last hyphen of a section name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SuffixKey {
    Number(Digits),
    Text(String),
}

/// An unbounded non-negative integer; more digits means larger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Digits {
    len: usize,
    digits: String,
}

impl Digits {
    /// Accepts an optional `+` followed by ASCII digits.
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.strip_prefix('+').unwrap_or(text);
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = body.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        Some(Self {
            len: digits.len(),
            digits: digits.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionKey {
    pub prefix: String,
    pub suffix: SuffixKey,
    name: String,
}

impl Ord for SectionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.prefix
            .cmp(&other.prefix)
            .then_with(|| self.suffix.cmp(&other.suffix))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for SectionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `Section-2` sorts before `Section-10`; names without a hyphen fall into an
/// empty prefix group ordered by their full name.
pub fn section_sort_key(name: &str) -> SectionKey {
    let trimmed = name.trim();
    let (prefix, suffix) = match trimmed.rsplit_once('-') {
        Some((base, num)) => {
            let num = num.trim();
            let suffix = match Digits::parse(num) {
                Some(n) => SuffixKey::Number(n),
                None => SuffixKey::Text(num.to_string()),
            };
            (base.trim().to_string(), suffix)
        }
        None => (String::new(), SuffixKey::Text(trimmed.to_string())),
    };
    SectionKey {
        prefix,
        suffix,
        name: name.to_string(),
    }
}

pub fn sorted_section_names<'a, I>(names: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut keyed: Vec<(SectionKey, &'a str)> = names
        .into_iter()
        .map(|name| (section_sort_key(name), name.as_str()))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, name)| name).collect()
}
