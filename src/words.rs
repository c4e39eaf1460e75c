use crate::slug::{format_url, SlugRule};
use itertools::Itertools;

static BLACKLIST: &[&str] = &[
    "d", "a", "de", "et", "en", "le", "la", "du", "un", "une", "ou", "au", "in", "sur", "les",
    "des", "pour", "sous", "avec", "cette", "notes", "origine", "bouteille", "degustation",
    "pendant", "minimum", "servir", "glace", "explorez", "monde", "selection", "exception",
    "experience", "guidee", "unique", "amateurs", "livraison", "offerte", "connaisseurs",
    "offrir", "cadeau", "homme", "femme", "feuille", "certificat", "or", "affinage", "futs",
    "premium", "medaille", "concours", "mondial", "general", "agricole", "maturation", "style",
    "onctueux", "elegant", "riche", "vieilli", "specially", "selected", "patissieres", "minis",
    "balles", "golf", "triplement", "distille", "offre", "deguster",
];

static WHITELIST: &[&str] = &[
    "whiskey", "whisky", "bourbon", "blended", "blend", "scotch", "single", "triple", "malt",
    "tourbé", "coffret", "giftbox",
];

static TYPE_SYNONYMS: &[&str] = &["whisky", "whiskey", "whiksy", "whiskys"];

static SKIP_AFTER_BRAND: &[&str] = &["whisky", "whiskey", "whiksy"];

static UNITS: &[&str] = &["ml", "cl", "l", "an", "year", "degre", "verre", "carat"];

static RULES: &[(&str, &str)] = &[
    ("blended", "blend"),
    ("roasted", "roast"),
    ("smoked", "smoke"),
    ("tennessee", "tenessee"),
];

/// Immutable set of words to strip from a slug. Every word is stored in its
/// slug form, split into tokens, so multi-word entries match as a sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordSet {
    entries: Vec<Vec<String>>,
}

impl WordSet {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = words
            .into_iter()
            .map(|w| format_url(w.as_ref()))
            .filter(|w| !w.is_empty())
            .unique()
            .map(|w| w.split('-').map(str::to_string).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        // longest sequences first so "single-malt" wins over "single"
        entries.sort_by(|a, b| b.len().cmp(&a.len()));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        let word = format_url(word);
        self.entries.iter().any(|e| e.join("-") == word)
    }

    /// Length in tokens of the longest entry matching the head of `tokens`.
    pub fn match_len(&self, tokens: &[&str]) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| {
                e.len() <= tokens.len()
                    && e.iter()
                        .zip(tokens.iter())
                        .all(|(w, t)| w.eq_ignore_ascii_case(t))
            })
            .map(Vec::len)
    }
}

/// Vocabulary used to build product slugs. `Default` carries the curated
/// catalog lists; tests substitute smaller ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordLists {
    pub blacklist: Vec<String>,
    pub whitelist: Vec<String>,
    pub type_synonyms: Vec<String>,
    pub skip_after_brand: Vec<String>,
    pub units: Vec<String>,
    pub rules: Vec<SlugRule>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for WordLists {
    fn default() -> Self {
        Self {
            blacklist: owned(BLACKLIST),
            whitelist: owned(WHITELIST),
            type_synonyms: owned(TYPE_SYNONYMS),
            skip_after_brand: owned(SKIP_AFTER_BRAND),
            units: owned(UNITS),
            rules: RULES
                .iter()
                .map(|(must, remove)| SlugRule::new(*must, *remove))
                .collect(),
        }
    }
}

impl WordLists {
    /// Stop words for one product: its category, the type synonyms, its
    /// brand slug and the blacklist.
    pub fn stop_words(&self, category: &str, brand: &str) -> WordSet {
        WordSet::new(
            [category]
                .into_iter()
                .chain(self.type_synonyms.iter().map(String::as_str))
                .chain([brand])
                .chain(self.blacklist.iter().map(String::as_str)),
        )
    }
}
