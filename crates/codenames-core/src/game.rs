//! Game, clue and oversight records exchanged with the training loop.
//!
//! Only counts matter to reward calibration: how many good and bad words a
//! game has, how many targets a clue claims, and how many targets the judge
//! reports as surviving.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CodenamesError, Result};

/// Prompt marker that precedes the generated clue.
pub const CLUE_MARKER: &str = "Clue:";

/// A board: the words the clue should point at and the words it must avoid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGame")]
pub struct Game {
    good_words: Vec<String>,
    bad_words: Vec<String>,
}

#[derive(Deserialize)]
struct RawGame {
    good_words: Vec<String>,
    #[serde(default)]
    bad_words: Vec<String>,
}

impl TryFrom<RawGame> for Game {
    type Error = CodenamesError;

    fn try_from(raw: RawGame) -> Result<Self> {
        Game::new(raw.good_words, raw.bad_words)
    }
}

impl Game {
    /// Create a game. At least one good word is required.
    pub fn new(good_words: Vec<String>, bad_words: Vec<String>) -> Result<Self> {
        if good_words.is_empty() {
            return Err(CodenamesError::InvalidGame(
                "game must have at least one good word".into(),
            ));
        }
        Ok(Self {
            good_words,
            bad_words,
        })
    }

    pub fn good_words(&self) -> &[String] {
        &self.good_words
    }

    pub fn bad_words(&self) -> &[String] {
        &self.bad_words
    }

    /// Number of good (target) words; never zero.
    pub fn good_count(&self) -> usize {
        self.good_words.len()
    }

    pub fn bad_words_in_game(&self) -> usize {
        self.bad_words.len()
    }
}

/// Outcome of adversarially judging one clue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oversight {
    /// Intended targets that survived the challenge.
    pub valid_targets: Vec<String>,
}

impl Oversight {
    pub fn new(valid_targets: Vec<String>) -> Self {
        Self { valid_targets }
    }

    /// Number of targets the judge let through, as reported.
    pub fn n_surviving(&self) -> usize {
        self.valid_targets.len()
    }
}

/// A one-word clue and the number of targets it claims.
///
/// Deserializes from either `{"one_word_clue": .., "num_words": ..}` or the
/// raw completion text (see the `FromStr` impl).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClueRepr")]
pub struct Clue {
    pub one_word_clue: String,
    pub num_words: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClueRepr {
    Text(String),
    Fields {
        one_word_clue: String,
        num_words: usize,
    },
}

impl TryFrom<ClueRepr> for Clue {
    type Error = CodenamesError;

    fn try_from(repr: ClueRepr) -> Result<Self> {
        match repr {
            ClueRepr::Text(text) => text.parse(),
            ClueRepr::Fields {
                one_word_clue,
                num_words,
            } => Ok(Self::new(one_word_clue, num_words)),
        }
    }
}

impl Clue {
    pub fn new(one_word_clue: impl Into<String>, num_words: usize) -> Self {
        Self {
            one_word_clue: one_word_clue.into(),
            num_words,
        }
    }
}

/// Parses completions such as `" Paris, 2"` or `"Clue: Paris, 2"`.
///
/// Only the first line is considered.
impl FromStr for Clue {
    type Err = CodenamesError;

    fn from_str(s: &str) -> Result<Self> {
        let fail = |reason: &str| CodenamesError::ClueParse {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let line = s.trim_start().lines().next().unwrap_or("").trim();
        let line = line.strip_prefix(CLUE_MARKER).unwrap_or(line).trim();

        let (word, count) = line
            .rsplit_once(',')
            .ok_or_else(|| fail("missing target count"))?;
        let word = word.trim();
        if word.is_empty() {
            return Err(fail("empty clue word"));
        }
        if word.split_whitespace().count() != 1 {
            return Err(fail("clue must be a single word"));
        }
        let num_words = count
            .trim()
            .parse::<usize>()
            .map_err(|e| fail(&format!("bad target count: {}", e)))?;

        Ok(Self::new(word, num_words))
    }
}

/// Renders the prompt form, e.g. `Paris, 2`.
impl fmt::Display for Clue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chars = self.one_word_clue.chars();
        if let Some(first) = chars.next() {
            write!(f, "{}", first.to_uppercase())?;
            write!(f, "{}", chars.as_str().to_lowercase())?;
        }
        write!(f, ", {}", self.num_words)
    }
}

/// One judged sample of a batch (one JSONL line).
///
/// A verdict may not report more surviving targets than the game has good
/// words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawJudgedClue")]
pub struct JudgedClue {
    game: Game,
    clue: Clue,
    /// Absent when judging failed or was skipped.
    oversight: Option<Oversight>,
}

#[derive(Deserialize)]
struct RawJudgedClue {
    game: Game,
    clue: Clue,
    #[serde(default)]
    oversight: Option<Oversight>,
}

impl TryFrom<RawJudgedClue> for JudgedClue {
    type Error = CodenamesError;

    fn try_from(raw: RawJudgedClue) -> Result<Self> {
        JudgedClue::new(raw.game, raw.clue, raw.oversight)
    }
}

impl JudgedClue {
    pub fn new(game: Game, clue: Clue, oversight: Option<Oversight>) -> Result<Self> {
        if let Some(verdict) = &oversight {
            if verdict.n_surviving() > game.good_count() {
                return Err(CodenamesError::InvalidGame(format!(
                    "oversight reports {} surviving targets but the game has {} good words",
                    verdict.n_surviving(),
                    game.good_count()
                )));
            }
        }
        Ok(Self {
            game,
            clue,
            oversight,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn clue(&self) -> &Clue {
        &self.clue
    }

    /// `None` when the sample was not judged.
    pub fn oversight(&self) -> Option<&Oversight> {
        self.oversight.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_game_requires_good_words() {
        assert!(Game::new(vec![], words(&["ice"])).is_err());
        let game = Game::new(words(&["paris", "rome"]), words(&["ice"])).unwrap();
        assert_eq!(game.good_count(), 2);
        assert_eq!(game.bad_words_in_game(), 1);
    }

    #[test]
    fn test_game_deserialize_validates() {
        let err = serde_json::from_str::<Game>(r#"{"good_words": [], "bad_words": ["x"]}"#);
        assert!(err.is_err());

        let game: Game = serde_json::from_str(r#"{"good_words": ["a"]}"#).unwrap();
        assert_eq!(game.bad_words_in_game(), 0);
    }

    #[test]
    fn test_surviving_counts_reported_targets() {
        assert_eq!(Oversight::new(words(&["Paris"])).n_surviving(), 1);
        assert_eq!(Oversight::new(words(&["a", "a"])).n_surviving(), 2);
        assert_eq!(Oversight::default().n_surviving(), 0);
    }

    #[test]
    fn test_judged_clue_rejects_oversized_verdict() {
        let game = Game::new(words(&["paris", "rome"]), words(&["ice"])).unwrap();
        let verdict = Oversight::new(words(&["paris", "rome", "berlin"]));
        assert!(JudgedClue::new(game.clone(), Clue::new("city", 2), Some(verdict)).is_err());

        let verdict = Oversight::new(words(&["Paris", "Paris"]));
        let sample = JudgedClue::new(game, Clue::new("city", 2), Some(verdict)).unwrap();
        assert_eq!(sample.oversight().map(Oversight::n_surviving), Some(2));

        let line = r#"{"game": {"good_words": ["a"], "bad_words": ["c"]},
                       "clue": "X, 1",
                       "oversight": {"valid_targets": ["a", "b"]}}"#;
        assert!(serde_json::from_str::<JudgedClue>(line).is_err());
    }

    #[test]
    fn test_parse_clue_completion() {
        let clue: Clue = " Paris, 2\n\nsome trailing text".parse().unwrap();
        assert_eq!(clue, Clue::new("Paris", 2));

        let clue: Clue = "Clue: capital,3".parse().unwrap();
        assert_eq!(clue, Clue::new("capital", 3));
    }

    #[test]
    fn test_parse_clue_rejects_malformed() {
        assert!("Paris".parse::<Clue>().is_err());
        assert!(", 2".parse::<Clue>().is_err());
        assert!("New York, 2".parse::<Clue>().is_err());
        assert!("Paris, two".parse::<Clue>().is_err());
        assert!("Paris, -1".parse::<Clue>().is_err());
    }

    #[test]
    fn test_clue_display_title_case() {
        assert_eq!(Clue::new("pARIS", 2).to_string(), "Paris, 2");
        let reparsed: Clue = Clue::new("ocean", 4).to_string().parse().unwrap();
        assert_eq!(reparsed, Clue::new("Ocean", 4));
    }

    #[test]
    fn test_judged_clue_missing_oversight() {
        let line = r#"{"game": {"good_words": ["a", "b"], "bad_words": ["c"]},
                       "clue": {"one_word_clue": "x", "num_words": 2}}"#;
        let sample: JudgedClue = serde_json::from_str(line).unwrap();
        assert!(sample.oversight().is_none());
    }

    #[test]
    fn test_judged_clue_raw_completion() {
        let line = r#"{"game": {"good_words": ["a"], "bad_words": ["c"]},
                       "clue": " Ocean, 1",
                       "oversight": {"valid_targets": ["a"]}}"#;
        let sample: JudgedClue = serde_json::from_str(line).unwrap();
        assert_eq!(sample.clue(), &Clue::new("Ocean", 1));
        assert_eq!(sample.oversight().map(Oversight::n_surviving), Some(1));

        let bad = r#"{"game": {"good_words": ["a"]}, "clue": "no count here"}"#;
        assert!(serde_json::from_str::<JudgedClue>(bad).is_err());
    }
}
