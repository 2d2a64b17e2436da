//! Option weighting and multi-select parsing for choice groups

use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

lazy_static! {
    static ref NUMERIC_RE: Regex = Regex::new(r"^-?(\d*\.?\d+|\d+\.?\d*)$").unwrap();
    /// `M$$`, `M-N$$`, `-N$$` or `M-$$`, with an optional `sep$$` after
    static ref MULTI_SELECT_RE: Regex =
        Regex::new(r"^(?s)(?:(\d+)|(\d*)-(\d*))\$\$(?:(.*?)\$\$)?(.*)$").unwrap();
}

/// Split a leading `w::` weight off an option.
///
/// Options without a numeric prefix weigh 1. Negative weights count as 0.
pub fn split_weight(option: &str) -> (f64, &str) {
    if let Some((prefix, rest)) = option.split_once("::") {
        let prefix = prefix.trim();
        if NUMERIC_RE.is_match(prefix) {
            if let Ok(weight) = prefix.parse::<f64>() {
                return (weight.max(0.0), rest);
            }
        }
    }
    (1.0, option)
}

/// Multi-select header found at the start of a group's first option
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSelect {
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub separator: String,
    /// First option with the header removed
    pub rest: String,
}

impl MultiSelect {
    pub fn parse(first_option: &str) -> Option<Self> {
        let caps = MULTI_SELECT_RE.captures(first_option)?;

        let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<usize>().ok());
        let (min, max) = match caps.get(1) {
            Some(_) => (number(1), number(1)),
            None => (number(2), number(3)),
        };

        Some(Self {
            min,
            max,
            separator: caps
                .get(4)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| " ".to_string()),
            rest: caps.get(5).map(|m| m.as_str().to_string()).unwrap_or_default(),
        })
    }

    /// Draw a selection count, clamping both bounds to `available`
    pub fn count<R: Rng>(&self, available: usize, rng: &mut R) -> usize {
        let low = self.min.unwrap_or(1).min(available);
        let high = self.max.unwrap_or(available).min(available);

        if low >= high {
            high
        } else {
            rng.gen_range(low..=high)
        }
    }
}

/// Pick one index by weight; uniform when every weight is zero
pub fn pick_weighted<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Some(rng.gen_range(0..weights.len()));
    }

    let mut point = rng.gen_range(0.0..total);
    let mut last_positive = 0;
    for (i, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        if point < weight {
            return Some(i);
        }
        point -= weight;
        last_positive = i;
    }

    Some(last_positive)
}

/// Pick `count` distinct indices by weight, in draw order.
///
/// Asking for every option (or more) returns a uniform shuffle of all of them.
pub fn sample_weighted<R: Rng>(weights: &[f64], count: usize, rng: &mut R) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..weights.len()).collect();

    if count >= remaining.len() {
        remaining.shuffle(rng);
        return remaining;
    }

    let mut picked = Vec::with_capacity(count);
    while picked.len() < count {
        let current: Vec<f64> = remaining.iter().map(|&i| weights[i]).collect();
        match pick_weighted(&current, rng) {
            Some(pos) => picked.push(remaining.remove(pos)),
            None => break,
        }
    }

    picked
}
