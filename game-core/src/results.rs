use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{pick_random, Counts, GameState};

pub const RESEARCH_QUOTES: &[&str] = &[
    "\"A fair division of household labor is linked to higher relationship satisfaction\" - Journal of Marriage and Family, 2019",
    "\"When men take on more household tasks, women show fewer symptoms of stress and burnout\" - American Psychological Association, 2020",
    "\"Housework and childcare are not only physical work but also a cognitive and emotional load\" - Mental Load Study, 2017",
];

/// Percentage shares of the decided tasks. Each share is rounded on its own,
/// so the three do not always add up to exactly 100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub p1_percent: u32,
    pub p2_percent: u32,
    pub together_percent: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("no tasks were assigned to anyone")]
    NoData,
}

pub fn summarize(state: &GameState) -> Result<Summary, SummaryError> {
    shares(&state.counts)
}

fn shares(counts: &Counts) -> Result<Summary, SummaryError> {
    let total = counts.total();
    if total == 0 {
        return Err(SummaryError::NoData);
    }
    Ok(Summary {
        p1_percent: rounded_percent(counts.participant1, total),
        p2_percent: rounded_percent(counts.participant2, total),
        together_percent: rounded_percent(counts.together, total),
    })
}

// round(100 * count / total) with halves rounded up, in integers.
fn rounded_percent(count: u32, total: u32) -> u32 {
    let (count, total) = (u64::from(count), u64::from(total));
    ((200 * count + total) / (2 * total)) as u32
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub participant1_name: String,
    pub participant2_name: String,
    pub counts: Counts,
    pub summary: Summary,
    pub quote: String,
}

/// Everything the results screen shows. The quote is drawn again on every
/// call.
pub fn present_results<R: Rng + ?Sized>(
    state: &GameState,
    rng: &mut R,
) -> Result<ResultView, SummaryError> {
    let summary = summarize(state)?;
    let quote = pick_random(RESEARCH_QUOTES, rng)
        .map(|q| (*q).to_string())
        .unwrap_or_default();
    Ok(ResultView {
        participant1_name: state.participant1_name.clone(),
        participant2_name: state.participant2_name.clone(),
        counts: state.counts,
        summary,
        quote,
    })
}
