use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

use crate::error::{Result, SubvocabError};
use super::Lemmatizer;

/// Irregular forms grouped by lemma
const IRREGULAR_FORMS: &[(&str, &[&str])] = &[
    ("be", &["am", "is", "are", "was", "were", "been", "being"]),
    ("have", &["has", "had", "having"]),
    ("do", &["does", "did", "done", "doing"]),
    ("go", &["goes", "went", "gone", "going"]),
    ("say", &["said"]),
    ("make", &["made"]),
    ("take", &["took", "taken"]),
    ("come", &["came"]),
    ("see", &["saw", "seen", "seeing"]),
    ("know", &["knew", "known"]),
    ("get", &["got", "gotten"]),
    ("give", &["gave", "given"]),
    ("find", &["found"]),
    ("think", &["thought"]),
    ("tell", &["told"]),
    ("become", &["became"]),
    ("leave", &["left"]),
    ("feel", &["felt"]),
    ("bring", &["brought"]),
    ("begin", &["began", "begun"]),
    ("keep", &["kept"]),
    ("hold", &["held"]),
    ("write", &["wrote", "written"]),
    ("stand", &["stood"]),
    ("hear", &["heard"]),
    ("mean", &["meant"]),
    ("meet", &["met"]),
    ("run", &["ran"]),
    ("pay", &["paid"]),
    ("sit", &["sat"]),
    ("speak", &["spoke", "spoken"]),
    ("lead", &["led"]),
    ("grow", &["grew", "grown"]),
    ("lose", &["lost"]),
    ("fall", &["fell", "fallen"]),
    ("send", &["sent"]),
    ("build", &["built"]),
    ("understand", &["understood"]),
    ("draw", &["drew", "drawn"]),
    ("break", &["broke", "broken"]),
    ("spend", &["spent"]),
    ("drive", &["drove", "driven"]),
    ("buy", &["bought"]),
    ("wear", &["wore", "worn"]),
    ("choose", &["chose", "chosen"]),
    ("seek", &["sought"]),
    ("throw", &["threw", "thrown"]),
    ("catch", &["caught"]),
    ("deal", &["dealt"]),
    ("win", &["won"]),
    ("fight", &["fought"]),
    ("teach", &["taught"]),
    ("sell", &["sold"]),
    ("sleep", &["slept"]),
    ("fly", &["flew", "flown"]),
    ("forget", &["forgot", "forgotten"]),
    ("forgive", &["forgave", "forgiven"]),
    ("eat", &["ate", "eaten", "eating"]),
    ("hide", &["hid", "hidden"]),
    ("bite", &["bitten"]),
    ("shoot", &["shot"]),
    ("sing", &["sang", "sung"]),
    ("swim", &["swam", "swum"]),
    ("wake", &["woke", "woken"]),
    ("drink", &["drank"]),
    ("ride", &["rode", "ridden"]),
    ("steal", &["stole", "stolen"]),
    ("freeze", &["froze", "frozen"]),
    ("hang", &["hung"]),
    ("feed", &["fed"]),
    ("flee", &["fled"]),
    ("bleed", &["bled"]),
    ("slide", &["slid"]),
    ("stick", &["stuck"]),
    ("strike", &["struck"]),
    ("swear", &["swore", "sworn"]),
    ("tear", &["tore", "torn"]),
    ("shake", &["shook", "shaken"]),
    ("sink", &["sank", "sunk"]),
    ("ring", &["rang", "rung"]),
    ("blow", &["blew", "blown"]),
    ("dig", &["dug"]),
    ("die", &["died", "dying"]),
    ("lie", &["lied", "lying"]),
    ("tie", &["tied", "tying"]),
    ("agree", &["agreed"]),
    ("disagree", &["disagreed"]),
    ("free", &["freed"]),
    ("guarantee", &["guaranteed"]),
    ("add", &["added", "adding"]),
    ("focus", &["focused", "focusing"]),
    ("adore", &["adored", "adoring"]),
    ("color", &["colored", "coloring"]),
    ("honor", &["honored"]),
    ("favor", &["favored"]),
    ("labor", &["labored"]),
    ("mirror", &["mirrored"]),
    ("man", &["men"]),
    ("woman", &["women"]),
    ("child", &["children"]),
    ("foot", &["feet"]),
    ("tooth", &["teeth"]),
    ("goose", &["geese"]),
    ("mouse", &["mice"]),
    ("life", &["lives"]),
    ("wife", &["wives"]),
    ("knife", &["knives"]),
    ("wolf", &["wolves"]),
    ("leaf", &["leaves"]),
    ("half", &["halves"]),
    ("self", &["selves"]),
    ("shelf", &["shelves"]),
    ("thief", &["thieves"]),
    ("loaf", &["loaves"]),
    ("calf", &["calves"]),
    ("elf", &["elves"]),
    ("scarf", &["scarves"]),
    ("bus", &["buses"]),
    ("crisis", &["crises"]),
    ("criterion", &["criteria"]),
    ("phenomenon", &["phenomena"]),
    ("movie", &["movies"]),
    ("cookie", &["cookies"]),
    ("zombie", &["zombies"]),
    ("rookie", &["rookies"]),
    ("calorie", &["calories"]),
    ("hippie", &["hippies"]),
    ("brownie", &["brownies"]),
    ("selfie", &["selfies"]),
    ("auntie", &["aunties"]),
    ("genie", &["genies"]),
    ("ache", &["aches"]),
    ("headache", &["headaches"]),
];

/// Words that look inflected but are already in dictionary form
const INVARIANT: &[&str] = &[
    "this", "his", "hers", "ours", "yours", "theirs", "yes", "news", "always", "perhaps",
    "sometimes", "towards", "afterwards", "besides", "whereas", "nevertheless", "series",
    "species", "physics", "mathematics", "politics", "economics", "ethics", "alias", "atlas",
    "canvas", "christmas", "themselves", "ourselves", "yourselves", "nothing", "something",
    "anything", "everything", "morning", "evening", "during", "ceiling", "wedding", "pudding",
    "darling", "sibling", "interesting", "amazing", "boring", "exciting", "tired", "scared",
    "interested", "excited", "worried", "hundred", "naked", "wicked", "sacred", "kindred",
    "rugged", "ragged", "wretched", "crooked", "building", "meeting", "feeling", "greeting",
    "beginning", "painting", "clothing", "ending", "earring", "stocking",
];

const MAX_RULE_PASSES: usize = 8;

static EXCEPTIONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    IRREGULAR_FORMS
        .iter()
        .flat_map(|(lemma, forms)| forms.iter().map(move |form| (*form, *lemma)))
        .collect()
});

static INVARIANT_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    INVARIANT.iter().copied().collect()
});

/// In-process English lemmatizer.
///
/// Resolution order for every token: the optional lookup table, contraction
/// splitting, the irregular-form table, the invariant list, and finally suffix
/// rules for plurals and verb inflections. Anything no rule claims is returned
/// unchanged.
pub struct RuleLemmatizer {
    lookup: HashMap<String, String>,
    /// Right-hand side of the lookup table, kept as is when seen again
    lemmas: HashSet<String>,
}

impl RuleLemmatizer {
    pub fn new() -> Self {
        Self::from_lookup(HashMap::new())
    }

    fn from_lookup(lookup: HashMap<String, String>) -> Self {
        let lemmas = lookup.values().cloned().collect();
        Self { lookup, lemmas }
    }

    /// Load a `form<TAB>lemma` table whose entries take precedence over the rules
    pub fn with_lookup_table<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SubvocabError::Lemmatizer(format!("Failed to read lookup table {}: {}", path.display(), e))
        })?;

        let lookup = parse_lookup_table(&content)?;
        info!("Loaded {} lookup entries from {}", lookup.len(), path.display());

        Ok(Self::from_lookup(lookup))
    }

    /// Lemmas for a single token; contractions expand to two
    pub fn lemmatize_token(&self, token: &str) -> Vec<String> {
        let token = token.to_lowercase();
        if token.is_empty() {
            return Vec::new();
        }

        if let Some(lemma) = self.lookup.get(&token) {
            return vec![lemma.clone()];
        }
        if self.lemmas.contains(&token) {
            return vec![token];
        }

        if let Some((base, suffix_lemma)) = split_contraction(&token) {
            let mut lemmas = Vec::with_capacity(2);
            if !base.is_empty() {
                lemmas.extend(self.lemmatize_token(&base));
            }
            if let Some(lemma) = suffix_lemma {
                lemmas.push(lemma.to_string());
            }
            return lemmas;
        }

        vec![lemmatize_word(&token)]
    }
}

impl Default for RuleLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Lemmatizer for RuleLemmatizer {
    async fn lemmatize(&self, tokens: &[String]) -> Result<Vec<String>> {
        Ok(tokens
            .iter()
            .flat_map(|token| self.lemmatize_token(token))
            .collect())
    }

    fn name(&self) -> &str {
        "rules"
    }
}

fn parse_lookup_table(content: &str) -> Result<HashMap<String, String>> {
    let mut lookup = HashMap::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (form, lemma) = line.split_once('\t').ok_or_else(|| {
            SubvocabError::Lemmatizer(format!("Lookup table line {}: expected form<TAB>lemma", index + 1))
        })?;

        lookup.insert(form.trim().to_lowercase(), lemma.trim().to_lowercase());
    }

    Ok(lookup)
}

/// Split "don't", "i'm", "we'd" into a base word and the lemma of the clitic
fn split_contraction(token: &str) -> Option<(String, Option<&'static str>)> {
    if let Some(base) = token.strip_suffix("n't") {
        let base = match base {
            "ca" => "can",
            "wo" => "will",
            "ai" => "be",
            "sha" => "shall",
            other => other,
        };
        return Some((base.to_string(), Some("not")));
    }

    let (base, clitic) = token.rsplit_once('\'')?;
    let lemma = match clitic {
        "m" | "re" => Some("be"),
        "d" => Some("would"),
        "ll" => Some("will"),
        "ve" => Some("have"),
        "s" => None,
        _ => return None,
    };

    Some((base.to_string(), lemma))
}

/// Apply the rules until the word stops changing, so a lemma maps to itself
fn lemmatize_word(word: &str) -> String {
    let mut current = word.to_string();
    for _ in 0..MAX_RULE_PASSES {
        let next = lemmatize_step(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn lemmatize_step(word: &str) -> String {
    if let Some(lemma) = EXCEPTIONS.get(word) {
        return lemma.to_string();
    }

    if INVARIANT_WORDS.contains(word) || word.chars().count() <= 3 {
        return word.to_string();
    }

    if let Some((head, tail)) = word.rsplit_once('-') {
        if head.is_empty() || tail.is_empty() {
            return word.to_string();
        }
        return format!("{}-{}", head, lemmatize_word(tail));
    }

    // Rules below slice by byte offset
    if !word.bytes().all(|b| b.is_ascii_lowercase()) {
        return word.to_string();
    }

    plural_singular(word)
        .or_else(|| verb_base(word))
        .unwrap_or_else(|| word.to_string())
}

/// Plural nouns and third person singular verbs
fn plural_singular(word: &str) -> Option<String> {
    let n = word.len();

    if word.ends_with("ies") && n > 4 {
        return Some(format!("{}y", &word[..n - 3]));
    }

    if word.ends_with("ves") {
        return Some(word[..n - 1].to_string());
    }

    if ["sses", "shes", "ches", "xes", "zzes"].iter().any(|s| word.ends_with(s)) {
        return Some(word[..n - 2].to_string());
    }

    if word.ends_with("oes") && n > 5 {
        return Some(word[..n - 2].to_string());
    }

    if word.ends_with('s') && !["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
        return Some(word[..n - 1].to_string());
    }

    None
}

/// Past tense, past participle and gerund forms
fn verb_base(word: &str) -> Option<String> {
    let n = word.len();

    if word.ends_with("ied") && n > 4 {
        return Some(format!("{}y", &word[..n - 3]));
    }

    if word.ends_with("eed") {
        return None;
    }

    let stem = word.strip_suffix("ed").or_else(|| word.strip_suffix("ing"))?;
    if stem.len() < 2 || !has_vowel(stem) {
        return None;
    }

    Some(restore_stem(stem))
}

/// Undo consonant doubling or put back a silent "e" dropped by inflection
fn restore_stem(stem: &str) -> String {
    let b = stem.as_bytes();
    let n = b.len();
    let last = b[n - 1];
    let prev = b[n - 2];

    if n >= 3 && last == prev && is_consonant(b, n - 1) && !matches!(last, b'l' | b's' | b'z' | b'f') {
        return stem[..n - 1].to_string();
    }

    let with_e = || format!("{}e", stem);

    if stem.ends_with("creat") {
        return with_e();
    }

    match last {
        b't' if prev == b'a' => {
            if n < 3 || is_consonant(b, n - 3) || matches!(b[n - 3], b'i' | b'u') {
                return with_e();
            }
        }
        b'l' if matches!(prev, b'b' | b'c' | b'd' | b'f' | b'g' | b'k' | b'p' | b's' | b't' | b'z') => {
            return with_e();
        }
        b'v' | b'c' | b'u' => return with_e(),
        b'z' if prev != b'z' => return with_e(),
        b's' if prev != b's' => return with_e(),
        b'g' => {
            if !is_consonant(b, n - 2) || matches!(prev, b'd' | b'r' | b'l') {
                return with_e();
            }
            if prev == b'n' && n >= 5 && matches!(b[n - 3], b'a' | b'e' | b'u') {
                return with_e();
            }
        }
        b'r' => {
            if prev == b'i' {
                return with_e();
            }
            if prev == b'u' && n >= 3 && is_consonant(b, n - 3) {
                return with_e();
            }
            if ["par", "lar", "plor", "gnor", "stor"].iter().any(|s| stem.ends_with(s)) {
                return with_e();
            }
        }
        _ => {}
    }

    if measure(b) == 1 && ends_cvc(b) {
        return with_e();
    }

    stem.to_string()
}

fn is_consonant(b: &[u8], i: usize) -> bool {
    match b[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(b, i - 1),
        _ => true,
    }
}

fn has_vowel(stem: &str) -> bool {
    let b = stem.as_bytes();
    (0..b.len()).any(|i| !is_consonant(b, i))
}

/// Number of vowel-consonant sequences in the stem
fn measure(b: &[u8]) -> usize {
    let mut count = 0;
    let mut previous_vowel = false;

    for i in 0..b.len() {
        let consonant = is_consonant(b, i);
        if consonant && previous_vowel {
            count += 1;
        }
        previous_vowel = !consonant;
    }

    count
}

/// Consonant-vowel-consonant ending where the final consonant is not w, x or y
fn ends_cvc(b: &[u8]) -> bool {
    let n = b.len();
    n >= 3
        && is_consonant(b, n - 3)
        && !is_consonant(b, n - 2)
        && is_consonant(b, n - 1)
        && !matches!(b[n - 1], b'w' | b'x' | b'y')
}
