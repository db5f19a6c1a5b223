//! Verb lemmatization filter and lemmatizer implementations.
//!
//! Lemmatization here is restricted to the verb part of speech: inflected
//! verb forms are mapped to their base form (`"needed"` → `"need"`,
//! `"went"` → `"go"`). The lookup works like WordNet's morphological
//! processor: irregular forms come from an exception table, regular forms
//! are produced by detaching suffixes and accepting a candidate only when
//! it is a known base verb. Words that cannot be resolved are returned
//! unchanged, so nouns such as `"people"` pass through untouched.

use std::sync::LazyLock;

use ahash::{AHashMap, AHashSet};

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Trait for lemmatization algorithms.
pub trait Lemmatizer: Send + Sync {
    /// Reduce a word to its base form.
    fn lemmatize(&self, word: &str) -> String;

    /// Get the name of this lemmatizer.
    fn name(&self) -> &'static str;
}

/// Suffix detachment rules for verbs, tried in order.
const VERB_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
];

/// Irregular verb forms mapped to their base form.
const VERB_EXCEPTIONS: &[(&str, &str)] = &[
    ("am", "be"), ("are", "be"), ("is", "be"), ("was", "be"), ("were", "be"), ("been", "be"),
    ("being", "be"), ("has", "have"), ("had", "have"), ("having", "have"), ("does", "do"),
    ("did", "do"), ("done", "do"), ("doing", "do"), ("went", "go"), ("gone", "go"),
    ("goes", "go"), ("ate", "eat"), ("eaten", "eat"), ("began", "begin"), ("begun", "begin"),
    ("bent", "bend"), ("bit", "bite"), ("bitten", "bite"), ("bled", "bleed"), ("blew", "blow"),
    ("blown", "blow"), ("broke", "break"), ("broken", "break"), ("brought", "bring"),
    ("built", "build"), ("burnt", "burn"), ("bought", "buy"), ("caught", "catch"),
    ("chose", "choose"), ("chosen", "choose"), ("came", "come"), ("crept", "creep"),
    ("dealt", "deal"), ("dug", "dig"), ("drew", "draw"), ("drawn", "draw"), ("drank", "drink"),
    ("drunk", "drink"), ("drove", "drive"), ("driven", "drive"), ("fed", "feed"), ("felt", "feel"),
    ("fell", "fall"), ("fallen", "fall"), ("fought", "fight"), ("found", "find"), ("fled", "flee"),
    ("flew", "fly"), ("flown", "fly"), ("forgot", "forget"), ("forgotten", "forget"),
    ("froze", "freeze"), ("frozen", "freeze"), ("got", "get"), ("gotten", "get"), ("gave", "give"),
    ("given", "give"), ("grew", "grow"), ("grown", "grow"), ("hung", "hang"), ("heard", "hear"),
    ("hid", "hide"), ("hidden", "hide"), ("held", "hold"), ("kept", "keep"), ("knew", "know"),
    ("known", "know"), ("laid", "lay"), ("led", "lead"), ("left", "leave"), ("lent", "lend"),
    ("lay", "lie"), ("lain", "lie"), ("lost", "lose"), ("made", "make"), ("meant", "mean"),
    ("met", "meet"), ("paid", "pay"), ("ran", "run"), ("rang", "ring"), ("rung", "ring"),
    ("rose", "rise"), ("risen", "rise"), ("rode", "ride"), ("ridden", "ride"), ("said", "say"),
    ("saw", "see"), ("seen", "see"), ("sought", "seek"), ("sold", "sell"), ("sent", "send"),
    ("shook", "shake"), ("shaken", "shake"), ("shot", "shoot"), ("showed", "show"),
    ("shown", "show"), ("shrank", "shrink"), ("sang", "sing"), ("sung", "sing"), ("sank", "sink"),
    ("sunk", "sink"), ("sat", "sit"), ("slept", "sleep"), ("slid", "slide"), ("spoke", "speak"),
    ("spoken", "speak"), ("spent", "spend"), ("spun", "spin"), ("stood", "stand"),
    ("stole", "steal"), ("stolen", "steal"), ("stuck", "stick"), ("struck", "strike"),
    ("swept", "sweep"), ("swam", "swim"), ("swum", "swim"), ("took", "take"), ("taken", "take"),
    ("taught", "teach"), ("tore", "tear"), ("torn", "tear"), ("told", "tell"),
    ("thought", "think"), ("threw", "throw"), ("thrown", "throw"), ("understood", "understand"),
    ("woke", "wake"), ("woken", "wake"), ("wore", "wear"), ("worn", "wear"), ("won", "win"),
    ("wrote", "write"), ("written", "write"), ("wept", "weep"), ("withdrew", "withdraw"),
    ("withdrawn", "withdraw"), ("died", "die"), ("dying", "die"), ("lying", "lie"),
    ("tied", "tie"), ("tying", "tie"), ("fleeing", "flee"), ("seeing", "see"),
    ("agreed", "agree"), ("freed", "free"), ("could", "can"), ("would", "will"),
    ("should", "shall"), ("might", "may"), ("spread", "spread"), ("hurt", "hurt"),
    ("destroyed", "destroy"), ("stayed", "stay"), ("prayed", "pray"), ("delayed", "delay"),
];

/// Known base forms of verbs used to validate rule-derived candidates.
const BASE_VERBS: &str = "
    accept access accompany accuse achieve acquire act adapt add address adjust admit adopt
    advise affect afford agree aid aim alert allow alter announce answer appear apply appoint
    appreciate approach approve argue arise arrange arrest arrive ask assess assign assist
    assume assure attach attack attempt attend attract avoid await bake ban bathe battle be
    bear beat become beg begin behave believe belong bend bite blame bleed bless block blow
    board boil bomb book borrow bother bounce break breathe bring broadcast build burn burst
    bury buy calculate call calm camp can care carry cause cease celebrate change charge chase
    check cheer choose clean clear climb close collapse collect combat come comfort command
    commit communicate compare compensate compete complain complete concern conclude conduct
    confirm connect consider consist construct consult consume contact contain continue
    contribute control convert convince cook cooperate coordinate cope copy correct cost cough
    count cover crash crawl create creep cross crush cry cure cut damage dance dare deal
    decide declare decline decrease defend define delay deliver demand deny depend deploy
    describe deserve design desire destroy detect determine develop die dig direct disappear
    discover discuss displace distribute disturb dive divide do donate doubt drag drain draw
    dream dress drift drink drive drop drown dry dump earn ease eat educate elect eliminate
    embrace emerge employ enable encourage end endure engage enjoy ensure enter equip erupt
    escape establish estimate evacuate evaluate examine exceed exist expand expect experience
    explain explode explore expose express extend face fail fall farm fear feed feel fetch
    fight fill find finish fire fish fit fix flee float flood flow fly focus fold follow force
    forget forgive form found free freeze fuel function fund gather get give go govern grab
    grant greet grow guarantee guard guess guide halt handle hang happen harm harvest hate
    have head heal hear heat help hide hit hold hope host house hunt hurry hurt identify
    ignore imagine implement import improve include increase indicate infect inform injure
    inquire insist inspect install instruct insure intend interest interview introduce invest
    investigate invite involve issue join judge jump keep kick kill knock know lack land last
    laugh launch lay lead leak learn leave lend let lie lift light like limit link list listen
    live load locate lock look loot lose love lower maintain make manage march mark marry
    matter mean measure meet melt mention migrate mind miss mix monitor move need negotiate
    note notice notify obtain occupy occur offer open operate order organize overcome owe own
    pack paint park participate pass pay perform permit persuade pick place plan plant play
    plead please point pollute possess post pour pray predict prefer prepare present preserve
    press prevent print proceed process produce promise promote protect protest prove provide
    publish pull pump punish purchase push put qualify question raise rain reach react read
    realize receive recognize recommend record recover reduce refer reflect refuse register
    regret reinforce reject relate relax release relieve rely remain remember remind remove
    rent repair repeat replace reply report represent request require rescue reserve resettle
    resist resolve respect respond rest restore result resume retire return reveal ride ring
    rise risk rob rock roll ruin rule run rush sail save say scare schedule scream search
    secure see seek seem seize select sell send sense separate serve set settle shake shall
    shape share shelter shift shine shiver shoot shop shout show shower shrink shut sign
    sing sink sit sleep slide slip smell smile smoke solve sort sound speak spend spill spin
    spread stand star start starve state stay steal step stick stock stop store strike
    struggle study submit succeed suffer suggest supply support suppose surround survive
    suspect sustain swallow sweep swim tackle take talk target taste teach tear tell tend
    test thank think threaten throw tie touch tour trace trade train transfer transport trap
    travel treat tremble trust try turn type understand unite update urge use vaccinate visit
    vote wait wake walk want warn wash waste watch water wear weep welcome win wish withdraw
    wonder work worry wound wrap write yield
";

static EXCEPTIONS: LazyLock<AHashMap<&'static str, &'static str>> =
    LazyLock::new(|| VERB_EXCEPTIONS.iter().copied().collect());

static VERBS: LazyLock<AHashSet<&'static str>> =
    LazyLock::new(|| BASE_VERBS.split_whitespace().collect());

/// Dictionary-backed verb lemmatizer.
#[derive(Clone, Debug, Default)]
pub struct VerbLemmatizer;

impl VerbLemmatizer {
    /// Create a new verb lemmatizer.
    pub fn new() -> Self {
        VerbLemmatizer
    }

    /// Check whether a word is a known base verb.
    pub fn is_base_verb(&self, word: &str) -> bool {
        VERBS.contains(word)
    }

    /// Collapse a trailing doubled consonant (`"stopp"` → `"stop"`).
    fn undouble(stem: &str) -> Option<&str> {
        let mut chars = stem.chars().rev();
        let last = chars.next()?;
        let previous = chars.next()?;
        if last == previous && !matches!(last, 'a' | 'e' | 'i' | 'o' | 'u' | 'l' | 's') {
            Some(&stem[..stem.len() - last.len_utf8()])
        } else {
            None
        }
    }
}

impl Lemmatizer for VerbLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        if let Some(base) = EXCEPTIONS.get(word) {
            return (*base).to_string();
        }
        if self.is_base_verb(word) {
            return word.to_string();
        }

        for (suffix, replacement) in VERB_RULES {
            if let Some(stem) = word.strip_suffix(suffix) {
                if stem.is_empty() {
                    continue;
                }
                let candidate = format!("{stem}{replacement}");
                if self.is_base_verb(&candidate) {
                    return candidate;
                }
                if replacement.is_empty()
                    && matches!(*suffix, "ed" | "ing")
                    && let Some(undoubled) = Self::undouble(stem)
                    && self.is_base_verb(undoubled)
                {
                    return undoubled.to_string();
                }
            }
        }

        word.to_string()
    }

    fn name(&self) -> &'static str {
        "verb"
    }
}

/// Filter that applies lemmatization to tokens.
pub struct LemmaFilter {
    /// The lemmatizer to use.
    lemmatizer: Box<dyn Lemmatizer>,
}

impl std::fmt::Debug for LemmaFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemmaFilter")
            .field("lemmatizer", &self.lemmatizer.name())
            .finish()
    }
}

impl LemmaFilter {
    /// Create a new lemma filter with the verb lemmatizer.
    pub fn new() -> Self {
        LemmaFilter {
            lemmatizer: Box::new(VerbLemmatizer::new()),
        }
    }

    /// Create a lemma filter with a custom lemmatizer.
    pub fn with_lemmatizer(lemmatizer: Box<dyn Lemmatizer>) -> Self {
        LemmaFilter { lemmatizer }
    }
}

impl Default for LemmaFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for LemmaFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                let lemma = self.lemmatizer.lemmatize(&token.text);
                token.with_text(lemma)
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lemma"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_regular_verbs() {
        let lemmatizer = VerbLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("needs"), "need");
        assert_eq!(lemmatizer.lemmatize("needed"), "need");
        assert_eq!(lemmatizer.lemmatize("living"), "live");
        assert_eq!(lemmatizer.lemmatize("flooded"), "flood");
        assert_eq!(lemmatizer.lemmatize("cries"), "cry");
        assert_eq!(lemmatizer.lemmatize("provides"), "provide");
    }

    #[test]
    fn test_doubled_consonants() {
        let lemmatizer = VerbLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("stopped"), "stop");
        assert_eq!(lemmatizer.lemmatize("trapped"), "trap");
    }

    #[test]
    fn test_irregular_verbs() {
        let lemmatizer = VerbLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("went"), "go");
        assert_eq!(lemmatizer.lemmatize("was"), "be");
        assert_eq!(lemmatizer.lemmatize("sent"), "send");
        assert_eq!(lemmatizer.lemmatize("died"), "die");
    }

    #[test]
    fn test_unknown_words_unchanged() {
        let lemmatizer = VerbLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("people"), "people");
        assert_eq!(lemmatizer.lemmatize("tents"), "tents");
        assert_eq!(lemmatizer.lemmatize("earthquake"), "earthquake");
    }

    #[test]
    fn test_lemma_filter() {
        let filter = LemmaFilter::new();
        let tokens = vec![
            Token::new("needed", 0),
            Token::new("running", 1),
            Token::new("went", 2),
        ];

        let result: Vec<Token> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(result[0].text, "need");
        assert_eq!(result[1].text, "run");
        assert_eq!(result[2].text, "go");
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(LemmaFilter::new().name(), "lemma");
    }
}
