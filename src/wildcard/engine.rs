//! Template expansion over a loaded wildcard set
//!
//! One pass: rewrite quantifiers, evaluate choice groups until none remain,
//! then resolve every wildcard reference once. Text that opens with a
//! multi-select header (`2$$__colors__`) is treated as one implicit group. Passes repeat until the text
//! stops changing or [`MAX_PASSES`] is reached. Output is a pure function of
//! (text, seed, loaded wildcards).

use std::path::PathBuf;

use parking_lot::{RwLock, RwLockReadGuard};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::loader::{self, LoadStats};
use super::select::{pick_weighted, sample_weighted, split_weight, MultiSelect};
use super::set::WildcardSet;
use super::syntax::{self, Node};

/// Upper bound on expansion passes per call
pub const MAX_PASSES: usize = 100;

pub struct TemplateEngine {
    dirs: Vec<PathBuf>,
    wildcards: RwLock<WildcardSet>,
}

impl TemplateEngine {
    /// Engine reading from `dirs` in priority order; nothing is loaded yet
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            wildcards: RwLock::new(WildcardSet::new()),
        }
    }

    /// Engine over an already-built set
    pub fn with_wildcards(wildcards: WildcardSet) -> Self {
        Self {
            dirs: Vec::new(),
            wildcards: RwLock::new(wildcards),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Load all directories. A loaded engine is left alone unless `force`.
    pub fn load(&self, force: bool) -> LoadStats {
        let mut wildcards = self.wildcards.write();
        let mut stats = LoadStats::default();

        if !wildcards.is_empty() && !force {
            return stats;
        }

        wildcards.clear();
        for dir in &self.dirs {
            stats.merge(loader::load_dir(&mut wildcards, dir));
        }

        info!(
            "Loaded {} wildcards from {} directories",
            wildcards.len(),
            self.dirs.len()
        );
        if stats.failed > 0 {
            warn!("{} wildcard files could not be read", stats.failed);
        }

        stats
    }

    pub fn unload(&self) {
        self.wildcards.write().clear();
    }

    pub fn is_loaded(&self) -> bool {
        !self.wildcards.read().is_empty()
    }

    pub fn read(&self) -> RwLockReadGuard<'_, WildcardSet> {
        self.wildcards.read()
    }

    /// `__key__` for every loaded wildcard
    pub fn wildcard_list(&self) -> Vec<String> {
        self.wildcards
            .read()
            .keys()
            .map(|key| format!("__{}__", key))
            .collect()
    }

    /// Expand `text` deterministically for `seed`
    pub fn expand(&self, text: &str, seed: u64) -> String {
        let wildcards = self.wildcards.read();
        Expander::new(&wildcards, seed).run(text)
    }
}

struct Expander<'a> {
    wildcards: &'a WildcardSet,
    rng: StdRng,
}

impl<'a> Expander<'a> {
    fn new(wildcards: &'a WildcardSet, seed: u64) -> Self {
        Self {
            wildcards,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn run(&mut self, text: &str) -> String {
        let mut current = syntax::strip_comments(text);

        for pass in 0..MAX_PASSES {
            let next = self.pass(&current);
            if next == current {
                debug!("Expansion settled after {} passes", pass + 1);
                return next;
            }
            current = next;
        }

        warn!("Expansion stopped after {} passes", MAX_PASSES);
        current
    }

    fn pass(&mut self, text: &str) -> String {
        let mut text = if MultiSelect::parse(text).is_some() {
            format!("{{{}}}", text)
        } else {
            text.to_string()
        };
        text = syntax::expand_quantifiers(&text).into_owned();

        loop {
            let nodes = syntax::parse(&text);
            if !syntax::has_choice(&nodes) {
                return self.resolve_wildcards(&nodes);
            }
            text = self.render_choices(&nodes);
        }
    }

    /// Evaluate every choice group; wildcard references are left as text
    fn render_choices(&mut self, nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                Node::Literal(text) => out.push_str(text),
                Node::Wildcard(name) => {
                    out.push_str("__");
                    out.push_str(name);
                    out.push_str("__");
                }
                Node::Choice(options) => {
                    let rendered: Vec<String> =
                        options.iter().map(|o| self.render_choices(o)).collect();
                    out.push_str(&self.choose(rendered));
                }
            }
        }
        out
    }

    fn choose(&mut self, mut options: Vec<String>) -> String {
        let multi = options.first().and_then(|first| MultiSelect::parse(first));

        let Some(multi) = multi else {
            let weights: Vec<f64> = options.iter().map(|o| split_weight(o).0).collect();
            return match pick_weighted(&weights, &mut self.rng) {
                Some(i) => split_weight(&options[i]).1.to_string(),
                None => String::new(),
            };
        };

        let pool: Vec<String> = if options.len() == 1 {
            let expanded = self.wildcards.options_in(&multi.rest);
            if expanded.is_empty() {
                vec![multi.rest.clone()]
            } else {
                expanded.into_iter().map(String::from).collect()
            }
        } else {
            options[0] = multi.rest.clone();
            options
        };

        let count = multi.count(pool.len(), &mut self.rng);
        let weights: Vec<f64> = pool.iter().map(|o| split_weight(o).0).collect();

        sample_weighted(&weights, count, &mut self.rng)
            .into_iter()
            .map(|i| split_weight(&pool[i]).1)
            .collect::<Vec<_>>()
            .join(&multi.separator)
    }

    /// Replace each resolvable reference with one weighted pick
    fn resolve_wildcards(&mut self, nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                Node::Wildcard(name) => match self.wildcards.resolve(name) {
                    Some(options) => {
                        let weights: Vec<f64> =
                            options.iter().map(|o| split_weight(o).0).collect();
                        if let Some(i) = pick_weighted(&weights, &mut self.rng) {
                            out.push_str(split_weight(options[i]).1);
                        }
                    }
                    None => {
                        out.push_str("__");
                        out.push_str(name);
                        out.push_str("__");
                    }
                },
                other => out.push_str(&syntax::to_text(std::slice::from_ref(other))),
            }
        }
        out
    }
}
