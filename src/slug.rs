//! Slug normalization pipeline.
//!
//! Every transformation is a [`Stage`]; [`run`] folds a list of stages over
//! the input from left to right. [`format_url`] and [`canonicalize`] are the
//! two pipelines used by the URL builder.

use crate::words::{WordLists, WordSet};
use itertools::Itertools;
use lazy_regex::regex;
use once_cell::sync::Lazy;
use regex::Captures;
use unicode_normalization::UnicodeNormalization;

static DEFAULT_LISTS: Lazy<WordLists> = Lazy::new(WordLists::default);

/// Removes `remove` from a slug, but only when `must_contain` is already
/// present in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlugRule {
    pub must_contain: String,
    pub remove: String,
}

impl SlugRule {
    pub fn new<M: Into<String>, R: Into<String>>(must_contain: M, remove: R) -> Self {
        Self {
            must_contain: must_contain.into(),
            remove: remove.into(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Stage<'a> {
    StripFullStrength,
    Degrees,
    StripAccents,
    Slugify,
    RemoveStopWords(&'a WordSet),
    ConditionalRules(&'a [SlugRule]),
    ContractMeasures,
    CompactUnits(&'a [String]),
    SingularFixup,
    Dedup,
    Cleanup,
}

impl Stage<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::StripFullStrength => "strip_full_strength",
            Stage::Degrees => "degrees",
            Stage::StripAccents => "strip_accents",
            Stage::Slugify => "slugify",
            Stage::RemoveStopWords(_) => "remove_stop_words",
            Stage::ConditionalRules(_) => "conditional_rules",
            Stage::ContractMeasures => "contract_measures",
            Stage::CompactUnits(_) => "compact_units",
            Stage::SingularFixup => "singular_fixup",
            Stage::Dedup => "dedup",
            Stage::Cleanup => "cleanup",
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            Stage::StripFullStrength => strip_full_strength(input),
            Stage::Degrees => degrees(input),
            Stage::StripAccents => strip_accents(input),
            Stage::Slugify => slugify(input),
            Stage::RemoveStopWords(words) => remove_stop_words(input, words),
            Stage::ConditionalRules(rules) => apply_conditional_rules(input, rules),
            Stage::ContractMeasures => contract_measures(input),
            Stage::CompactUnits(units) => compact_units(input, units),
            Stage::SingularFixup => singular_fixup(input),
            Stage::Dedup => dedup(input),
            Stage::Cleanup => cleanup(input),
        }
    }
}

pub fn run(stages: &[Stage], input: &str) -> String {
    stages.iter().fold(input.to_string(), |acc, stage| {
        let out = stage.apply(&acc);
        log::trace!("{}: {acc:?} -> {out:?}", stage.name());
        out
    })
}

/// Drops the "100%" marketing token so it is not read as an alcohol degree.
pub fn strip_full_strength(input: &str) -> String {
    regex!(r"\b100\s?%").replace_all(input, "").into_owned()
}

/// Rounds a number written with either `.` or `,` as decimal separator,
/// half away from zero. Numbers outside the `i64` range yield `None`.
pub fn round_to_integer(value: &str) -> Option<i64> {
    value
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .map(f64::round)
        .filter(|v| v.is_finite() && *v >= i64::MIN as f64 && *v < i64::MAX as f64)
        .map(|v| v as i64)
}

/// `40,5°`, `43%`, `40 pour cent` become `41 degrés`, `43 degrés`, `40 degrés`.
pub fn degrees(input: &str) -> String {
    regex!(r"(?i)([0-9]+(?:[.,][0-9]+)?)\s?(°|%|pour cent)")
        .replace_all(input, |caps: &Captures| match round_to_integer(&caps[1]) {
            Some(n) => format!("{n} degrés"),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Canonical decomposition, then every combining diacritical mark
/// (U+0300..=U+036F) is dropped.
pub fn strip_accents(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036F}').contains(c))
        .collect()
}

/// Post: only `[a-z0-9-]`, no repeated, leading or trailing hyphens.
pub fn slugify(input: &str) -> String {
    let replaced = regex!(r"[^a-zA-Z0-9]+").replace_all(input, "-");
    cleanup(&replaced.to_ascii_lowercase())
}

fn tokens(slug: &str) -> Vec<&str> {
    slug.split('-').filter(|t| !t.is_empty()).collect()
}

/// Removes whole-token occurrences of every entry of `words`.
/// Pre: input is a slug.
pub fn remove_stop_words(slug: &str, words: &WordSet) -> String {
    let tokens = tokens(slug);
    let mut kept = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        match words.match_len(&tokens[i..]) {
            Some(len) => i += len,
            None => {
                kept.push(tokens[i]);
                i += 1;
            }
        }
    }
    kept.join("-")
}

/// For each rule in order, removes the first token equal to `remove` if the
/// slug contains `must_contain`.
pub fn apply_conditional_rules(slug: &str, rules: &[SlugRule]) -> String {
    rules.iter().fold(slug.to_string(), |slug, rule| {
        if rule.must_contain.is_empty() || !slug.contains(rule.must_contain.as_str()) {
            return slug;
        }
        let mut tokens = tokens(&slug);
        if let Some(pos) = tokens
            .iter()
            .position(|t| t.eq_ignore_ascii_case(&rule.remove))
        {
            tokens.remove(pos);
        }
        tokens.join("-")
    })
}

fn measure(token: &str) -> Option<&'static str> {
    match token {
        "milliliter" | "milliliters" | "millilitre" | "millilitres" => Some("ml"),
        "centiliter" | "centiliters" | "centilitre" | "centilitres" => Some("cl"),
        "liter" | "liters" | "litre" | "litres" => Some("l"),
        _ => None,
    }
}

/// Spelled-out volume units become their abbreviation.
pub fn contract_measures(slug: &str) -> String {
    tokens(slug)
        .into_iter()
        .map(|t| measure(t).unwrap_or(t))
        .join("-")
}

fn is_unit(token: &str, units: &[String]) -> bool {
    units.iter().any(|u| {
        let u = u.as_str();
        if token.eq_ignore_ascii_case(u) {
            return true;
        }
        token.len() == u.len() + 1
            && token
                .get(..u.len())
                .map(|head| head.eq_ignore_ascii_case(u))
                .unwrap_or(false)
            && token.ends_with(['s', 'S'])
    })
}

/// `18-ans` → `18ans`, `70-cl` → `70cl`: the hyphen between a number and a
/// unit word (or its plural) is dropped.
pub fn compact_units(slug: &str, units: &[String]) -> String {
    let mut out: Vec<String> = Vec::new();
    for token in tokens(slug) {
        let after_number = out
            .last()
            .map(|prev| prev.ends_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(false);
        if after_number && is_unit(token, units) {
            if let Some(prev) = out.last_mut() {
                prev.push_str(token);
            }
        } else {
            out.push(token.to_string());
        }
    }
    out.join("-")
}

/// French singular after compaction: `1ans` → `1an`.
pub fn singular_fixup(slug: &str) -> String {
    tokens(slug)
        .into_iter()
        .map(|t| if t == "1ans" { "1an" } else { t })
        .join("-")
}

/// Keeps the first occurrence of every token, in order.
pub fn dedup(slug: &str) -> String {
    tokens(slug)
        .into_iter()
        .unique_by(|t| t.to_ascii_lowercase())
        .join("-")
}

pub fn cleanup(slug: &str) -> String {
    regex!(r"-+")
        .replace_all(slug, "-")
        .trim_matches('-')
        .to_string()
}

/// Normalizes free text into a slug: degree rewrite, accent stripping and
/// slugification. Idempotent.
pub fn format_url(text: &str) -> String {
    run(&[Stage::Degrees, Stage::StripAccents, Stage::Slugify], text)
}

pub fn canonical_stages<'a>(
    stop_words: &'a WordSet,
    rules: &'a [SlugRule],
    units: &'a [String],
) -> [Stage<'a>; 11] {
    [
        Stage::StripFullStrength,
        Stage::Degrees,
        Stage::StripAccents,
        Stage::Slugify,
        Stage::RemoveStopWords(stop_words),
        Stage::ConditionalRules(rules),
        Stage::ContractMeasures,
        Stage::CompactUnits(units),
        Stage::SingularFixup,
        Stage::Dedup,
        Stage::Cleanup,
    ]
}

/// Product-name slug with the default rules and unit words.
pub fn canonicalize(name: &str, stop_words: &WordSet) -> String {
    canonicalize_with(name, stop_words, &DEFAULT_LISTS.rules, &DEFAULT_LISTS.units)
}

/// Runs the full product pipeline until the output is stable, so that
/// re-canonicalizing a canonical slug is a no-op.
pub fn canonicalize_with(
    name: &str,
    stop_words: &WordSet,
    rules: &[SlugRule],
    units: &[String],
) -> String {
    let stages = canonical_stages(stop_words, rules, units);
    // every pass that changes the slug drops tokens or contracts a measure
    let mut slug = run(&stages, name);
    loop {
        let next = run(&stages, &slug);
        if next == slug {
            return slug;
        }
        slug = next;
    }
}
