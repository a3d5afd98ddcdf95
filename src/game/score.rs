//! Guess Scoring
//!
//! Scores a guess against the secret word, one hint per position.
//!
//! ## Rules
//!
//! 1. Same letter in the same position is Green.
//! 2. A letter that occurs elsewhere in the secret may be Yellow, but each
//!    occurrence in the secret can be claimed by at most one guess position.
//! 3. Everything else is Grey.
//!
//! Duplicate letters make "which occurrence owns the match" ambiguous, so the
//! Yellow budget at position `i` is checked twice: against the secret prefix
//! ending at `i` and against the secret suffix starting at `i`. A position is
//! Yellow if the guess has not used more of that letter than the secret offers
//! under either view. No letter is ever matched more times than it occurs in
//! the secret.

use super::engine::GameError;
use super::hint::LetterHint;
use super::state::Rejection;

#[inline]
fn occurrences(letters: &[char], letter: char) -> usize {
    letters.iter().filter(|&&c| c == letter).count()
}

/// Can position `i` of the guess be Yellow.
fn has_yellow_budget(secret: &[char], guess: &[char], i: usize) -> bool {
    let letter = guess[i];

    let secret_left = occurrences(&secret[..=i], letter);
    if secret_left > 0 && occurrences(&guess[..=i], letter) <= secret_left {
        return true;
    }

    let secret_right = occurrences(&secret[i..], letter);
    secret_right > 0 && occurrences(&guess[i..], letter) <= secret_right
}

/// Score `guess` against `secret` into `result`.
///
/// `result` must hold exactly one hint per letter; an unallocated buffer is
/// [`GameError::NilResult`]. Both words must already be the same length and
/// in the same case.
pub fn score_word(secret: &str, guess: &str, result: &mut [LetterHint]) -> Result<(), GameError> {
    let secret: Vec<char> = secret.chars().collect();
    let guess: Vec<char> = guess.chars().collect();

    if result.len() != secret.len() {
        return Err(GameError::NilResult {
            expected: secret.len(),
            actual: result.len(),
        });
    }
    if guess.len() != secret.len() {
        return Err(Rejection::WordLength.into());
    }

    for (i, hint) in result.iter_mut().enumerate() {
        *hint = if secret[i] == guess[i] {
            LetterHint::Green
        } else if has_yellow_budget(&secret, &guess, i) {
            LetterHint::Yellow
        } else {
            LetterHint::Grey
        };
    }

    Ok(())
}

/// Score into a freshly allocated hint vector.
pub fn score(secret: &str, guess: &str) -> Result<Vec<LetterHint>, GameError> {
    let mut result = vec![LetterHint::Blank; secret.chars().count()];
    score_word(secret, guess, &mut result)?;
    Ok(result)
}
