//! String alignment.
//!
//! Walks both strings with independent cursors, emitting runs of shared
//! tokens and, at each mismatch, jumping to the nearest resynchronization
//! point. This is a greedy alignment, not a longest-common-subsequence
//! search, and its tie-break is part of its observable behavior.
//!
//! In character mode every Unicode scalar is a token. In word mode each
//! break character is a token of its own and each maximal run of other
//! characters is one word token. Span indices are character offsets into
//! the original strings in both modes.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use vcmp_types::{CompareOptions, StringCompareMode, StringCompareOptions};

use crate::comparison::Side;
use crate::flags::ComparisonFlags;

/// Which strings a span belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanOwner {
    Common,
    OnlyInA,
    OnlyInB,
}

/// One aligned span of a string diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringDifference {
    /// Character offset in A; `None` for spans only in B.
    pub a_index: Option<usize>,
    /// Character offset in B; `None` for spans only in A.
    pub b_index: Option<usize>,
    pub text: String,
}

impl StringDifference {
    pub fn owner(&self) -> SpanOwner {
        match (self.a_index, self.b_index) {
            (Some(_), None) => SpanOwner::OnlyInA,
            (None, Some(_)) => SpanOwner::OnlyInB,
            _ => SpanOwner::Common,
        }
    }

    pub fn is_common(&self) -> bool {
        self.owner() == SpanOwner::Common
    }

    /// The span's ownership as comparison flags (empty for common spans).
    pub fn flags(&self) -> ComparisonFlags {
        match self.owner() {
            SpanOwner::Common => ComparisonFlags::NONE,
            SpanOwner::OnlyInA => ComparisonFlags::ONLY_IN_A,
            SpanOwner::OnlyInB => ComparisonFlags::ONLY_IN_B,
        }
    }
}

/// Result of `compare_strings`.
#[derive(Clone, Debug)]
pub struct StringCompareResult {
    pub a: String,
    pub b: String,
    pub options: CompareOptions,
    pub string_diffs: Vec<StringDifference>,
}

impl StringCompareResult {
    /// `true` when the strings are equal.
    pub fn is_empty(&self) -> bool {
        self.string_diffs.is_empty()
    }

    /// Concatenate the spans belonging to one side.
    pub fn reconstruct(&self, side: Side) -> String {
        reconstruct(&self.string_diffs, side)
    }
}

/// Concatenate the texts of the spans that carry an index for `side`.
pub fn reconstruct(spans: &[StringDifference], side: Side) -> String {
    spans
        .iter()
        .filter(|span| match side {
            Side::A => span.a_index.is_some(),
            Side::B => span.b_index.is_some(),
        })
        .map(|span| span.text.as_str())
        .collect()
}

/// A token and where it sits in its source string.
#[derive(Clone, Copy, Debug)]
struct Token<'s> {
    text: &'s str,
    byte: usize,
    offset: usize,
}

fn tokenize<'s>(s: &'s str, options: &StringCompareOptions) -> Vec<Token<'s>> {
    match options.mode {
        StringCompareMode::Character => s
            .char_indices()
            .enumerate()
            .map(|(offset, (byte, c))| Token {
                text: &s[byte..byte + c.len_utf8()],
                byte,
                offset,
            })
            .collect(),
        StringCompareMode::Word => {
            let mut tokens = Vec::new();
            let mut word: Option<(usize, usize)> = None;
            for (offset, (byte, c)) in s.char_indices().enumerate() {
                if options.is_word_break(c) {
                    if let Some((start, start_offset)) = word.take() {
                        tokens.push(Token {
                            text: &s[start..byte],
                            byte: start,
                            offset: start_offset,
                        });
                    }
                    tokens.push(Token {
                        text: &s[byte..byte + c.len_utf8()],
                        byte,
                        offset,
                    });
                } else if word.is_none() {
                    word = Some((byte, offset));
                }
            }
            if let Some((start, start_offset)) = word {
                tokens.push(Token {
                    text: &s[start..],
                    byte: start,
                    offset: start_offset,
                });
            }
            tokens
        }
    }
}

/// A span in token coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
enum RawSpan {
    Common(Range<usize>, Range<usize>),
    OnlyInA(Range<usize>),
    OnlyInB(Range<usize>),
}

/// Nearest pair `(p, q)` with `a[p] == b[q]`, `p >= i`, `q >= j`.
///
/// The A-driven candidate takes the first position of A that occurs
/// anywhere in B from `j`; the B-driven candidate is the mirror image. The
/// B-driven candidate wins only when its total skip is strictly smaller.
fn resync<T: PartialEq>(a: &[T], b: &[T], i: usize, j: usize) -> Option<(usize, usize)> {
    let from_a = (i..a.len()).find_map(|p| {
        b[j..]
            .iter()
            .position(|t| *t == a[p])
            .map(|q| (p, j + q))
    });
    let from_b = (j..b.len()).find_map(|q| {
        a[i..]
            .iter()
            .position(|t| *t == b[q])
            .map(|p| (i + p, q))
    });
    let skip = |(p, q): (usize, usize)| (p - i) + (q - j);
    match (from_a, from_b) {
        (Some(ca), Some(cb)) if skip(cb) < skip(ca) => Some(cb),
        (Some(ca), _) => Some(ca),
        (None, cb) => cb,
    }
}

fn align<T: PartialEq>(a: &[T], b: &[T]) -> Vec<RawSpan> {
    let mut spans = Vec::new();
    let (mut i, mut j) = (0, 0);
    loop {
        let (start_i, start_j) = (i, j);
        while i < a.len() && j < b.len() && a[i] == b[j] {
            i += 1;
            j += 1;
        }
        if i > start_i {
            spans.push(RawSpan::Common(start_i..i, start_j..j));
        }

        match (i < a.len(), j < b.len()) {
            (false, false) => break,
            (true, false) => {
                spans.push(RawSpan::OnlyInA(i..a.len()));
                break;
            }
            (false, true) => {
                spans.push(RawSpan::OnlyInB(j..b.len()));
                break;
            }
            (true, true) => {}
        }

        match resync(a, b, i, j) {
            Some((next_i, next_j)) => {
                if next_i > i {
                    spans.push(RawSpan::OnlyInA(i..next_i));
                }
                if next_j > j {
                    spans.push(RawSpan::OnlyInB(j..next_j));
                }
                i = next_i;
                j = next_j;
            }
            None => {
                spans.push(RawSpan::OnlyInA(i..a.len()));
                spans.push(RawSpan::OnlyInB(j..b.len()));
                break;
            }
        }
    }
    spans
}

/// Source text and first offset covered by a token range.
fn slice<'s>(source: &'s str, tokens: &[Token<'s>], range: &Range<usize>) -> (usize, &'s str) {
    let first = tokens[range.start];
    let last = tokens[range.end - 1];
    (first.offset, &source[first.byte..last.byte + last.text.len()])
}

/// Align two strings and return the ordered spans.
///
/// Equal strings produce no spans. Otherwise, concatenating the texts of
/// the spans with an `a_index` gives back `a`, and likewise for `b`.
pub fn diff_strings(a: &str, b: &str, options: &StringCompareOptions) -> Vec<StringDifference> {
    if a == b {
        return Vec::new();
    }
    let tokens_a = tokenize(a, options);
    let tokens_b = tokenize(b, options);
    let texts_a: Vec<&str> = tokens_a.iter().map(|t| t.text).collect();
    let texts_b: Vec<&str> = tokens_b.iter().map(|t| t.text).collect();

    align(&texts_a, &texts_b)
        .into_iter()
        .map(|span| match span {
            RawSpan::Common(ra, rb) => {
                let (a_index, text) = slice(a, &tokens_a, &ra);
                let (b_index, _) = slice(b, &tokens_b, &rb);
                StringDifference {
                    a_index: Some(a_index),
                    b_index: Some(b_index),
                    text: text.to_string(),
                }
            }
            RawSpan::OnlyInA(ra) => {
                let (a_index, text) = slice(a, &tokens_a, &ra);
                StringDifference {
                    a_index: Some(a_index),
                    b_index: None,
                    text: text.to_string(),
                }
            }
            RawSpan::OnlyInB(rb) => {
                let (b_index, text) = slice(b, &tokens_b, &rb);
                StringDifference {
                    a_index: None,
                    b_index: Some(b_index),
                    text: text.to_string(),
                }
            }
        })
        .collect()
}
