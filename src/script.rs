//! Query scripts: a stream of insertions and range counts replayed against a set.
//!
//! A script is free-form whitespace separated tokens. `k <key>` inserts a key and
//! `q <lhs> <rhs>` counts the stored keys in `[lhs, rhs]`. Line breaks carry no meaning.
//!
//! ```text
//! k 5 k 3
//! k 7
//! q 2 6
//! q 3 7
//! ```
//!
//! The same script can be replayed against a [`Tree`] and the standard library's [`BTreeSet`]
//! to check answers and compare timings, see [`compare`].
//!
//! # Examples
//!
//! ```
//! use avl_range::script::{self, Script};
//! use avl_range::Tree;
//!
//! let script: Script = "k 5 k 3 k 7 q 2 6 q 3 7".parse().unwrap();
//!
//! let report = script.run(&mut Tree::<i64>::new());
//! assert_eq!(report.answers, vec![2, 3]);
//!
//! let comparison = script::compare(&script);
//! assert!(comparison.agrees());
//! ```

use std::collections::BTreeSet;
use std::io::Read;
use std::num::ParseIntError;
use std::ops::Bound;
use std::str::{FromStr, SplitWhitespace};
use std::time::Duration;

use crate::timer::Timer;
use crate::tree::Tree;

/// Token introducing an insertion.
pub const INSERT: &str = "k";
/// Token introducing a range count.
pub const COUNT: &str = "q";

/// Everything that can go wrong reading a script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// A token where an instruction was expected isn't one.
    #[error("unknown instruction `{0}`")]
    UnknownInstruction(String),
    /// The script ended in the middle of an instruction.
    #[error("instruction `{instruction}` is missing an operand")]
    MissingOperand {
        /// The instruction token.
        instruction: &'static str,
    },
    /// An operand isn't an integer.
    #[error("invalid operand `{token}`")]
    InvalidOperand {
        /// The offending token.
        token: String,
        /// Why it didn't parse.
        #[source]
        source: ParseIntError,
    },
    /// The script couldn't be read.
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
}

/// One step of a script.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Instruction {
    /// Insert a key.
    Insert(i64),
    /// Count the keys in `[lhs, rhs]`.
    Count {
        /// Smallest key counted.
        lhs: i64,
        /// Largest key counted.
        rhs: i64,
    },
}

/// Lazily parses instructions out of a script, see [`instructions`].
#[derive(Debug)]
pub struct Instructions<'a> {
    tokens: SplitWhitespace<'a>,
    failed: bool,
}

/// Parses `input` one instruction at a time.
///
/// Iteration stops after the first error.
pub fn instructions(input: &str) -> Instructions<'_> {
    Instructions {
        tokens: input.split_whitespace(),
        failed: false,
    }
}

impl Instructions<'_> {
    fn operand(&mut self, instruction: &'static str) -> Result<i64, ScriptError> {
        let token = self
            .tokens
            .next()
            .ok_or(ScriptError::MissingOperand { instruction })?;
        token
            .parse()
            .map_err(|source| ScriptError::InvalidOperand {
                token: token.to_owned(),
                source,
            })
    }

    fn instruction(&mut self, token: &str) -> Result<Instruction, ScriptError> {
        match token {
            INSERT => Ok(Instruction::Insert(self.operand(INSERT)?)),
            COUNT => {
                let lhs = self.operand(COUNT)?;
                let rhs = self.operand(COUNT)?;
                Ok(Instruction::Count { lhs, rhs })
            }
            other => Err(ScriptError::UnknownInstruction(other.to_owned())),
        }
    }
}

impl Iterator for Instructions<'_> {
    type Item = Result<Instruction, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let token = self.tokens.next()?;
        let instruction = self.instruction(token);
        self.failed = instruction.is_err();
        Some(instruction)
    }
}

/// A fully parsed script.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Script {
    instructions: Vec<Instruction>,
}

impl FromStr for Script {
    type Err = ScriptError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let instructions = instructions(input).collect::<Result<_, _>>()?;
        Ok(Self { instructions })
    }
}

impl From<Vec<Instruction>> for Script {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }
}

impl Script {
    /// Reads and parses a whole script.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, ScriptError> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        input.parse()
    }

    /// The parsed instructions, in order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Replays the script against `set`, collecting the answer to every range count.
    pub fn run<S: RangeSet + ?Sized>(&self, set: &mut S) -> Report {
        let timer = Timer::started();
        let mut answers = Vec::new();
        for instruction in &self.instructions {
            match *instruction {
                Instruction::Insert(key) => set.insert(key),
                Instruction::Count { lhs, rhs } => answers.push(set.range_count(lhs, rhs)),
            }
        }

        Report {
            answers,
            elapsed: timer.elapsed(),
        }
    }
}

/// Parses and runs `input` against `set`, treating a malformed script as one with no answers.
///
/// `set` is left untouched when the script doesn't parse.
pub fn run_lossy<S: RangeSet + ?Sized>(input: &str, set: &mut S) -> Report {
    input
        .parse::<Script>()
        .map(|script| script.run(set))
        .unwrap_or_default()
}

/// The outcome of [`Script::run`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    /// One answer per range count, in script order.
    pub answers: Vec<i64>,
    /// Wall-clock time spent replaying the script.
    pub elapsed: Duration,
}

impl Report {
    /// [`Report::elapsed`] in milliseconds.
    pub fn elapsed_milliseconds(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1e3
    }
}

/// A set of integer keys that can answer inclusive range counts.
pub trait RangeSet {
    /// Adds `key`; adding a key twice is a no-op.
    fn insert(&mut self, key: i64);

    /// Number of stored keys in `[lhs, rhs]`.
    ///
    /// When `lhs > rhs` this is `0` if no key lies strictly between `rhs` and `lhs` and `-1`
    /// otherwise, matching the positional definition used by [`Tree::range_count`].
    fn range_count(&self, lhs: i64, rhs: i64) -> i64;
}

impl RangeSet for Tree<i64> {
    fn insert(&mut self, key: i64) {
        Tree::insert(self, key);
    }

    fn range_count(&self, lhs: i64, rhs: i64) -> i64 {
        Tree::range_count(self, &lhs, &rhs)
    }
}

/// The reference implementation.
impl RangeSet for BTreeSet<i64> {
    fn insert(&mut self, key: i64) {
        BTreeSet::insert(self, key);
    }

    fn range_count(&self, lhs: i64, rhs: i64) -> i64 {
        if lhs <= rhs {
            let count = self.range(lhs..=rhs).count();
            return i64::try_from(count).unwrap_or(i64::MAX);
        }

        // Crossed bounds: the lower bound of `lhs` sits at or after the upper bound of `rhs`.
        let between = (Bound::Excluded(rhs), Bound::Excluded(lhs));
        if self.range(between).next().is_none() {
            0
        } else {
            -1
        }
    }
}

/// A position where the tree and the reference set disagree.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Mismatch {
    /// Index into the answers.
    pub index: usize,
    /// What the tree answered, if it answered at all.
    pub tree: Option<i64>,
    /// What the reference set answered, if it answered at all.
    pub reference: Option<i64>,
}

/// The result of running one script against both a [`Tree`] and a [`BTreeSet`].
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    /// The tree's run.
    pub tree: Report,
    /// The reference set's run.
    pub reference: Report,
}

impl Comparison {
    /// Every answer that differs, including answers only one side produced.
    pub fn mismatches(&self) -> Vec<Mismatch> {
        let (tree, reference) = (&self.tree.answers, &self.reference.answers);
        (0..tree.len().max(reference.len()))
            .filter_map(|index| {
                let mismatch = Mismatch {
                    index,
                    tree: tree.get(index).copied(),
                    reference: reference.get(index).copied(),
                };
                (mismatch.tree != mismatch.reference).then_some(mismatch)
            })
            .collect()
    }

    /// Whether both runs produced identical answers.
    pub fn agrees(&self) -> bool {
        self.tree.answers == self.reference.answers
    }

    /// How many times slower the tree was than the reference set.
    pub fn slowdown(&self) -> f64 {
        self.tree.elapsed.as_secs_f64() / self.reference.elapsed.as_secs_f64()
    }
}

/// Runs `script` against a fresh [`Tree`] and a fresh [`BTreeSet`].
pub fn compare(script: &Script) -> Comparison {
    Comparison {
        tree: script.run(&mut Tree::<i64>::new()),
        reference: script.run(&mut BTreeSet::<i64>::new()),
    }
}
