use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const BUILTIN_VERSION: &str = "builtin-3.0";

const AI_NGRAMS: &[&str] = &[
    "is a",
    "it is",
    "this is",
    "that is",
    "there are",
    "there is",
    "can be",
    "will be",
    "would be",
    "could be",
    "should be",
    "must be",
    "has been",
    "have been",
    "had been",
    "being a",
    "such as",
    "as well",
    "in order",
    "due to",
    "based on",
    "according to",
    "refers to",
    "known as",
    "defined as",
    "allows for",
    "enables the",
    "one of the",
    "in order to",
    "as well as",
    "on the other",
    "the other hand",
    "due to the",
    "in the context",
    "plays a role",
    "a wide range",
    "a variety of",
    "in terms of",
    "with respect to",
    "it should be",
    "can be seen",
    "is known for",
    "is defined as",
];

const AI_FORMAL_WORDS: &[&str] = &[
    "furthermore",
    "moreover",
    "additionally",
    "consequently",
    "nevertheless",
    "nonetheless",
    "whereby",
    "wherein",
    "thereof",
    "hereby",
    "thereby",
    "crucial",
    "essential",
    "vital",
    "paramount",
    "fundamental",
    "pivotal",
    "comprehensive",
    "extensive",
    "thorough",
    "holistic",
    "nuanced",
    "intricate",
    "facilitate",
    "leverage",
    "utilize",
    "implement",
    "optimize",
    "streamline",
    "robust",
    "scalable",
    "seamless",
    "innovative",
    "dynamic",
    "versatile",
    "paradigm",
    "framework",
    "methodology",
    "mechanism",
    "infrastructure",
    "significantly",
    "substantially",
    "considerably",
    "notably",
    "particularly",
    "inherently",
    "intrinsically",
    "fundamentally",
    "essentially",
    "primarily",
    "multifaceted",
    "encompass",
    "elucidate",
    "delineate",
    "ascertain",
    "aforementioned",
    "henceforth",
    "therein",
    "heretofore",
    "notwithstanding",
];

const AI_PHRASES: &[&str] = &[
    "it's important to note",
    "it is important to note",
    "it's worth noting",
    "in conclusion",
    "to summarize",
    "in summary",
    "let me explain",
    "furthermore",
    "moreover",
    "additionally",
    "in essence",
    "ultimately",
    "plays a crucial role",
    "plays a vital role",
    "serves as a",
    "acts as a",
    "it should be noted",
    "one might argue",
    "needless to say",
    "at its core",
    "on the other hand",
    "that being said",
    "with that in mind",
    "when it comes to",
    "in terms of",
    "with respect to",
    "as such",
    "this is because",
    "the reason is",
    "this allows",
    "this enables",
    "wide range of",
    "variety of",
    "plethora of",
    "myriad of",
    "ensure that",
    "in order to",
    "so as to",
    "thereby",
    "hence",
    "therefore",
    "as a result",
    "due to this",
    "because of this",
    "for this reason",
    "provides a",
    "offers a",
    "presents a",
    "demonstrates a",
    "is characterized by",
    "is defined by",
    "is known for",
    "take into account",
    "bear in mind",
    "keep in mind",
    "first and foremost",
    "last but not least",
    "by and large",
    "delve into",
    "delve deeper",
    "comprehensive understanding",
    "cutting-edge",
    "state-of-the-art",
    "game-changer",
    "it can be argued",
    "one could say",
    "speaking of which",
    "having said that",
    "to put it simply",
    "in other words",
    "broadly speaking",
    "generally speaking",
    "to be more specific",
];

/// Hand-authored word lists the detector matches against. Kept as data so the
/// lists can be tuned and versioned without touching the signal code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    pub version: String,
    /// Two- and three-word sequences that read as filler.
    pub ngrams: Vec<String>,
    pub formal_words: Vec<String>,
    pub phrases: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Lexicon {
    pub fn builtin() -> Self {
        fn owned(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            version: BUILTIN_VERSION.to_string(),
            ngrams: owned(AI_NGRAMS),
            formal_words: owned(AI_FORMAL_WORDS),
            phrases: owned(AI_PHRASES),
        }
    }

    pub fn from_ron_str(content: &str) -> Result<Self, LexiconError> {
        Ok(ron::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let content = fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&content)
    }

    pub fn compile(&self) -> Result<CompiledLexicon, LexiconError> {
        CompiledLexicon::new(self)
    }
}

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse lexicon: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("n-gram '{0}' must have two or three words")]
    NgramArity(String),
    #[error("{list} contains an empty entry")]
    EmptyEntry { list: &'static str },
    #[error("failed to build formal vocabulary matcher: {0}")]
    Pattern(#[from] regex::Error),
}

/// Read-only lookup structure built once from a [`Lexicon`].
#[derive(Debug, Clone)]
pub struct CompiledLexicon {
    version: String,
    bigrams: HashSet<String>,
    trigrams: HashSet<String>,
    formal_words: Option<Regex>,
    phrases: Vec<String>,
}

impl CompiledLexicon {
    fn new(lexicon: &Lexicon) -> Result<Self, LexiconError> {
        let mut bigrams = HashSet::new();
        let mut trigrams = HashSet::new();

        for ngram in &lexicon.ngrams {
            let words: Vec<String> = ngram
                .split_whitespace()
                .map(|w| w.to_lowercase())
                .collect();
            match words.len() {
                0 => return Err(LexiconError::EmptyEntry { list: "ngrams" }),
                2 => {
                    bigrams.insert(words.join(" "));
                }
                3 => {
                    trigrams.insert(words.join(" "));
                }
                _ => return Err(LexiconError::NgramArity(ngram.clone())),
            }
        }

        if lexicon.formal_words.iter().any(|w| w.trim().is_empty()) {
            return Err(LexiconError::EmptyEntry {
                list: "formal_words",
            });
        }
        let formal_words = if lexicon.formal_words.is_empty() {
            None
        } else {
            let alternation = lexicon
                .formal_words
                .iter()
                .map(|w| regex::escape(w.trim()))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
                    .case_insensitive(true)
                    .build()?,
            )
        };

        if lexicon.phrases.iter().any(|p| p.is_empty()) {
            return Err(LexiconError::EmptyEntry { list: "phrases" });
        }
        let phrases = lexicon.phrases.iter().map(|p| p.to_lowercase()).collect();

        Ok(Self {
            version: lexicon.version.clone(),
            bigrams,
            trigrams,
            formal_words,
            phrases,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_bigram(&self, first: &str, second: &str) -> bool {
        self.bigrams.contains(&format!("{first} {second}"))
    }

    pub fn is_trigram(&self, first: &str, second: &str, third: &str) -> bool {
        self.trigrams.contains(&format!("{first} {second} {third}"))
    }

    pub fn count_formal_words(&self, text: &str) -> usize {
        self.formal_words
            .as_ref()
            .map(|re| re.find_iter(text).count())
            .unwrap_or(0)
    }

    /// Lowercased signature phrases, in lexicon order.
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}
