//! Reading-time estimation.
//!
//! A word is any whitespace-separated token containing at least one letter or
//! digit, so markdown syntax tokens (`#`, `-`, `---`, fences) don't count while
//! code does. Minutes are `ceil(words / words_per_minute)`, so any post with at
//! least one word reads in at least one minute.
//!
//! The count never decreases when text is appended to a body: appending can
//! only add tokens or extend the last one.

use crate::error::PipelineError;
use crate::types::{AnnotatedPost, Post, ReadingTime};
use rayon::prelude::*;

/// Count words in a markdown body.
pub fn count_words(body: &str) -> usize {
    body.split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .count()
}

/// Estimate reading time for a body at the given speed.
///
/// `words_per_minute` of zero is treated as one; config validation rejects it
/// before it gets here.
pub fn reading_time(body: &str, words_per_minute: u32) -> ReadingTime {
    let words = count_words(body);
    let wpm = words_per_minute.max(1) as usize;
    let minutes = words.div_ceil(wpm) as u32;
    ReadingTime {
        words,
        minutes,
        text: format!("{} min read", minutes),
    }
}

/// Attach a reading time to one post.
///
/// Fails with [`PipelineError::MalformedPost`] when the body is missing.
pub fn annotate_post(post: Post, words_per_minute: u32) -> Result<AnnotatedPost, PipelineError> {
    let Some(body) = post.body.as_deref() else {
        return Err(PipelineError::MalformedPost {
            id: post.id.clone(),
            reason: "body is missing or unreadable".to_string(),
        });
    };
    let reading_time = reading_time(body, words_per_minute);
    Ok(AnnotatedPost { post, reading_time })
}

/// Attach reading times to a sequence of posts, preserving order.
///
/// Fails on the first malformed post (in input order).
pub fn annotate(
    posts: Vec<Post>,
    words_per_minute: u32,
) -> Result<Vec<AnnotatedPost>, PipelineError> {
    posts
        .into_par_iter()
        .map(|post| annotate_post(post, words_per_minute))
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}
