//! Place name canonicalization and alias resolution
//!
//! District names arrive in many spellings (upstream exports, user input,
//! transliterations). Canonicalization is purely mechanical: strip
//! punctuation, collapse whitespace, uppercase. Alias resolution is a
//! separate table-driven step so the table can grow through configuration
//! without touching this code.

use std::collections::BTreeMap;

/// Canonicalize a free-text place name.
///
/// Characters outside the word/space class become spaces, runs of
/// whitespace collapse to one space, the result is trimmed and uppercased.
/// Total and idempotent: any input (including empty) yields a stable
/// canonical form.
pub fn normalize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Alias table mapping canonical district names to known spelling variants.
///
/// Both keys and variants are normalized at construction, so lookups are
/// exact matches against already-canonicalized names.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    /// canonical -> variants, in configured order
    aliases: BTreeMap<String, Vec<String>>,
}

impl NameTable {
    pub fn new(aliases: &BTreeMap<String, Vec<String>>) -> Self {
        let aliases = aliases
            .iter()
            .map(|(canonical, variants)| {
                (
                    normalize(canonical),
                    variants.iter().map(|v| normalize(v)).collect(),
                )
            })
            .collect();
        Self { aliases }
    }

    /// Resolve an already-canonicalized name to its configured canonical
    /// form. A canonical key maps to itself; a known variant maps to its
    /// key; anything else passes through unchanged.
    pub fn resolve_alias(&self, canonical: &str) -> String {
        if self.aliases.contains_key(canonical) {
            return canonical.to_string();
        }
        for (key, variants) in &self.aliases {
            if variants.iter().any(|v| v == canonical) {
                return key.clone();
            }
        }
        canonical.to_string()
    }

    /// Configured variants to try after the canonical form came up empty,
    /// in configured order, excluding the canonical form itself.
    pub fn fallback_variants(&self, canonical: &str) -> Vec<String> {
        self.aliases
            .get(canonical)
            .map(|variants| {
                variants
                    .iter()
                    .filter(|v| v.as_str() != canonical)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
