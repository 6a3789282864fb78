//! CART regression tree

use super::data::{check_training_set, check_width};
use super::persistence;
use super::{Matrix, ModelError, ModelInterface, ModelResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

const KIND: &str = "decision_tree";

/// Growth limits for the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth, unbounded when `None`
    pub max_depth: Option<usize>,
    /// Minimum number of samples a node needs to be split
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Tree node; children are indices into [`FittedTree::nodes`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Fitted tree stored as a flat node list rooted at index 0
///
/// Children always sit after their parent, so walks never revisit a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedTree {
    params: TreeParams,
    n_features: usize,
    nodes: Vec<Node>,
}

impl FittedTree {
    fn predict_row(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = node {
                depths[*left] = depths[index] + 1;
                depths[*right] = depths[index] + 1;
            }
        }
        depths.into_iter().max().unwrap_or(0)
    }

    /// Reject node lists that would index out of bounds or loop
    fn check(&self) -> ModelResult<()> {
        if self.nodes.is_empty() {
            return Err(ModelError::Persistence("decision tree has no nodes".to_string()));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let Node::Split {
                feature,
                left,
                right,
                ..
            } = node
            else {
                continue;
            };

            let child_ok = |child: usize| child > index && child < self.nodes.len();
            if *feature >= self.n_features || !child_ok(*left) || !child_ok(*right) {
                return Err(ModelError::Persistence(format!(
                    "decision tree node {} is malformed",
                    index
                )));
            }
        }

        Ok(())
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    error: f64,
}

/// Decision tree regressor using the squared-error criterion
#[derive(Debug, Default)]
pub struct DecisionTreeModel {
    params: TreeParams,
    fitted: Option<FittedTree>,
}

impl DecisionTreeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: TreeParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    /// Depth of the fitted tree, `None` when untrained
    pub fn depth(&self) -> Option<usize> {
        self.fitted.as_ref().map(FittedTree::depth)
    }

    fn fit(&self, features: &Matrix, target: &[f64]) -> ModelResult<FittedTree> {
        let n_features = check_training_set(features, target)?;
        let fitted = FittedTree {
            params: self.params,
            n_features,
            nodes: self.build(features, target),
        };

        tracing::debug!(
            samples = features.len(),
            n_features,
            nodes = fitted.nodes.len(),
            depth = fitted.depth(),
            "Decision tree fitted"
        );

        Ok(fitted)
    }

    /// Grow the tree with an explicit work stack
    fn build(&self, features: &Matrix, target: &[f64]) -> Vec<Node> {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut pending = vec![(0usize, (0..features.len()).collect::<Vec<usize>>(), 0usize)];

        while let Some((slot, indices, depth)) = pending.pop() {
            let mean = indices.iter().map(|&i| target[i]).sum::<f64>() / indices.len() as f64;
            let leaf = Node::Leaf { value: mean };

            let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
            let constant = indices.iter().all(|&i| target[i] == target[indices[0]]);
            if indices.len() < self.params.min_samples_split || depth_reached || constant {
                nodes[slot] = leaf;
                continue;
            }

            let Some(best) = best_split(features, target, &indices) else {
                nodes[slot] = leaf;
                continue;
            };

            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .into_iter()
                .partition(|&i| features[i][best.feature] <= best.threshold);
            if left.is_empty() || right.is_empty() {
                nodes[slot] = leaf;
                continue;
            }

            let left_slot = nodes.len();
            let right_slot = left_slot + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[slot] = Node::Split {
                feature: best.feature,
                threshold: best.threshold,
                left: left_slot,
                right: right_slot,
            };

            pending.push((right_slot, right, depth + 1));
            pending.push((left_slot, left, depth + 1));
        }

        nodes
    }
}

/// Sum of squared deviations from the mean given running sums
fn squared_error(sum: f64, sum_sq: f64, count: f64) -> f64 {
    (sum_sq - sum * sum / count).max(0.0)
}

/// Find the threshold with the lowest total squared error across all features
fn best_split(features: &Matrix, target: &[f64], indices: &[usize]) -> Option<BestSplit> {
    let n_features = features[indices[0]].len();
    let total_sum: f64 = indices.iter().map(|&i| target[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| target[i] * target[i]).sum();
    let count = indices.len();

    let mut best: Option<BestSplit> = None;
    let mut sorted = indices.to_vec();

    for feature in 0..n_features {
        sorted.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;

        for pos in 0..count - 1 {
            let i = sorted[pos];
            left_sum += target[i];
            left_sq += target[i] * target[i];

            let here = features[i][feature];
            let next = features[sorted[pos + 1]][feature];
            if here >= next {
                continue;
            }

            let left_n = (pos + 1) as f64;
            let right_n = (count - pos - 1) as f64;
            let error = squared_error(left_sum, left_sq, left_n)
                + squared_error(total_sum - left_sum, total_sq - left_sq, right_n);

            if best.as_ref().is_none_or(|b| error < b.error) {
                let mut threshold = here + (next - here) / 2.0;
                // Midpoint can round up to `next` for adjacent floats
                if threshold >= next {
                    threshold = here;
                }
                best = Some(BestSplit {
                    feature,
                    threshold,
                    error,
                });
            }
        }
    }

    best
}

impl ModelInterface for DecisionTreeModel {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }

    fn train(&mut self, features: &Matrix, target: &[f64]) -> ModelResult<()> {
        self.fitted = Some(self.fit(features, target)?);
        tracing::info!(samples = features.len(), "Decision tree trained");
        Ok(())
    }

    fn predict(&self, features: &Matrix) -> ModelResult<Vec<f64>> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::Untrained)?;
        check_width(features, Some(fitted.n_features))?;
        Ok(features.iter().map(|row| fitted.predict_row(row)).collect())
    }

    fn save_model(&self, path: &Path) -> ModelResult<()> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::Untrained)?;
        persistence::save(path, KIND, fitted)
    }

    fn load_model(&mut self, path: &Path) -> ModelResult<()> {
        let fitted: FittedTree = persistence::load(path, KIND)?;
        fitted.check()?;
        self.params = fitted.params;
        self.fitted = Some(fitted);
        Ok(())
    }

    fn retrain(&mut self, features: &Matrix, target: &[f64]) -> ModelResult<()> {
        if self.fitted.is_none() {
            return Err(ModelError::Untrained);
        }
        self.fitted = Some(self.fit(features, target)?);
        tracing::info!(samples = features.len(), "Decision tree retrained");
        Ok(())
    }
}
