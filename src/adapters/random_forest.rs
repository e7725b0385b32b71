//! Bagged regression trees behind the `Regressor` port.
//!
//! Each tree is a CART regressor grown on a bootstrap sample with its own
//! seeded RNG, so a fixed `seed` gives identical predictions across runs.
//! Splits minimise the summed squared error of the two children.

use crate::domain::error::MacrossError;
use crate::ports::regressor_port::Regressor;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// `None` grows each tree until its leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split; `None` tries all of them.
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

struct Split {
    feature: usize,
    threshold: f64,
}

struct TreeBuilder<'a> {
    rows: &'a [Vec<f64>],
    targets: &'a [f64],
    config: &'a ForestConfig,
    n_features: usize,
    rng: StdRng,
}

impl TreeBuilder<'_> {
    fn build(&mut self, indices: &mut [usize], depth: usize) -> Node {
        let n = indices.len();
        let sum: f64 = indices.iter().map(|&i| self.targets[i]).sum();
        let mean = sum / n as f64;

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        let pure = indices.iter().all(|&i| self.targets[i] == self.targets[indices[0]]);
        if depth_reached || pure || n < self.config.min_samples_split {
            return Node::Leaf(mean);
        }

        let Some(split) = self.best_split(indices, sum) else {
            return Node::Leaf(mean);
        };

        let mid = partition(indices, |i| self.rows[i][split.feature] <= split.threshold);
        let (left_idx, right_idx) = indices.split_at_mut(mid);
        let left = self.build(left_idx, depth + 1);
        let right = self.build(right_idx, depth + 1);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Maximises SL²/nL + SR²/nR, which is equivalent to minimising the
    /// children's summed squared error. Only improvements over the parent count.
    fn best_split(&mut self, indices: &[usize], total: f64) -> Option<Split> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let k = self
            .config
            .max_features
            .unwrap_or(self.n_features)
            .clamp(1, self.n_features);
        let features: Vec<usize> = if k < self.n_features {
            sample(&mut self.rng, self.n_features, k).into_vec()
        } else {
            (0..self.n_features).collect()
        };

        let parent_score = total * total / n as f64;
        let mut best_score = parent_score;
        let mut best: Option<Split> = None;
        let mut sorted = indices.to_vec();

        for feature in features {
            sorted.sort_by(|&a, &b| self.rows[a][feature].total_cmp(&self.rows[b][feature]));

            let mut left_sum = 0.0;
            for pos in 0..n - 1 {
                left_sum += self.targets[sorted[pos]];
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let here = self.rows[sorted[pos]][feature];
                let next = self.rows[sorted[pos + 1]][feature];
                if here >= next {
                    continue;
                }

                let right_sum = total - left_sum;
                let score =
                    left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
                if score > best_score + f64::EPSILON * best_score.abs() {
                    let mut threshold = (here + next) / 2.0;
                    if threshold >= next {
                        threshold = here;
                    }
                    best_score = score;
                    best = Some(Split { feature, threshold });
                }
            }
        }

        best
    }
}

/// Moves elements matching `pred` to the front; returns how many matched.
fn partition(indices: &mut [usize], pred: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for j in 0..indices.len() {
        if pred(indices[j]) {
            indices.swap(mid, j);
            mid += 1;
        }
    }
    mid
}

#[derive(Debug, Clone, Default)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<Node>,
    n_features: usize,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn model_error(reason: impl Into<String>) -> MacrossError {
    MacrossError::Model {
        reason: reason.into(),
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, rows: &[Vec<f64>], targets: &[f64]) -> Result<(), MacrossError> {
        if rows.is_empty() {
            return Err(model_error("no training rows"));
        }
        if rows.len() != targets.len() {
            return Err(model_error(format!(
                "{} rows but {} targets",
                rows.len(),
                targets.len()
            )));
        }
        let n_features = rows[0].len();
        if n_features == 0 {
            return Err(model_error("training rows have no features"));
        }
        if rows.iter().any(|r| r.len() != n_features) {
            return Err(model_error("training rows differ in width"));
        }
        if rows.iter().flatten().chain(targets).any(|v| !v.is_finite()) {
            return Err(model_error("non-finite value in training data"));
        }
        if self.config.n_trees == 0 {
            return Err(model_error("forest needs at least one tree"));
        }

        let n = rows.len();
        let mut trees = Vec::with_capacity(self.config.n_trees);
        for t in 0..self.config.n_trees {
            let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(t as u64));
            let mut indices: Vec<usize> = if self.config.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            let mut builder = TreeBuilder {
                rows,
                targets,
                config: &self.config,
                n_features,
                rng,
            };
            trees.push(builder.build(&mut indices, 0));
        }

        tracing::debug!(
            trees = trees.len(),
            rows = n,
            features = n_features,
            "random forest fitted"
        );
        self.trees = trees;
        self.n_features = n_features;
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> Result<f64, MacrossError> {
        if self.trees.is_empty() {
            return Err(model_error("predict called before fit"));
        }
        if row.len() != self.n_features {
            return Err(model_error(format!(
                "expected {} features, got {}",
                self.n_features,
                row.len()
            )));
        }
        let total: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        Ok(total / self.trees.len() as f64)
    }
}
