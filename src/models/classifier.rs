//! Обученные классификаторы
//!
//! Каждый вариант хранит атрибуты соответствующей модели scikit-learn
//! (`coef_`, `tree_.*`, `theta_` ...), выгруженные в JSON. Здесь только
//! инференс: обучение происходит вне сервиса.

#![allow(non_snake_case)]

use std::f64::consts::PI;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::preprocessing::normalization::check_input;
use crate::types::Prediction;

/// Индекс первого максимума (как `numpy.argmax`).
fn argmax<I: IntoIterator<Item = f64>>(values: I) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.into_iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn check_classes(classes: &[Prediction]) -> ModelResult<()> {
    if classes.is_empty() {
        return Err(ModelError::Invalid("classifier has no classes".to_string()));
    }
    Ok(())
}

fn check_rows(name: &str, rows: &[Vec<f64>], n_rows: usize, n_cols: usize) -> ModelResult<()> {
    if rows.len() != n_rows {
        return Err(ModelError::Invalid(format!(
            "{} has {} rows, expected {}",
            name,
            rows.len(),
            n_rows
        )));
    }
    if let Some(row) = rows.iter().find(|r| r.len() != n_cols) {
        return Err(ModelError::Invalid(format!(
            "{} row has {} columns, expected {}",
            name,
            row.len(),
            n_cols
        )));
    }
    if rows.iter().flatten().any(|v| !v.is_finite()) {
        return Err(ModelError::Invalid(format!("{} contains non-finite values", name)));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    Linear(LinearModel),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    GaussianNb(GaussianNb),
}

impl Classifier {
    pub fn name(&self) -> &'static str {
        match self {
            Classifier::Linear(_) => "LinearModel",
            Classifier::DecisionTree(_) => "DecisionTreeClassifier",
            Classifier::RandomForest(_) => "RandomForestClassifier",
            Classifier::GaussianNb(_) => "GaussianNB",
        }
    }

    pub fn classes(&self) -> &[Prediction] {
        match self {
            Classifier::Linear(m) => &m.classes,
            Classifier::DecisionTree(m) => &m.classes,
            Classifier::RandomForest(m) => &m.classes,
            Classifier::GaussianNb(m) => &m.classes,
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Classifier::Linear(m) => m.coef.first().map(|r| r.len()).unwrap_or(0),
            Classifier::DecisionTree(m) => m.n_features_in,
            Classifier::RandomForest(m) => m.n_features_in,
            Classifier::GaussianNb(m) => m.theta.first().map(|r| r.len()).unwrap_or(0),
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        check_classes(self.classes())?;
        if self.n_features() == 0 {
            return Err(ModelError::Invalid(format!("{} has no features", self.name())));
        }
        match self {
            Classifier::Linear(m) => m.validate(),
            Classifier::DecisionTree(m) => m.tree.validate(m.n_features_in, m.classes.len()),
            Classifier::RandomForest(m) => m.validate(),
            Classifier::GaussianNb(m) => m.validate(),
        }
    }

    /// Предсказание по одной метке на строку X.
    pub fn predict(&self, X: &Array2<f64>) -> ModelResult<Vec<Prediction>> {
        check_input(self.name(), self.n_features(), X)?;

        X.rows()
            .into_iter()
            .map(|x| {
                let idx = match self {
                    Classifier::Linear(m) => m.decide(x),
                    Classifier::DecisionTree(m) => m.tree.leaf_distribution(x).and_then(argmax_of),
                    Classifier::RandomForest(m) => m.decide(x),
                    Classifier::GaussianNb(m) => m.decide(x),
                }?;
                self.classes()
                    .get(idx)
                    .cloned()
                    .ok_or_else(|| ModelError::Invalid(format!("class index {} out of range", idx)))
            })
            .collect()
    }
}

fn argmax_of(values: &[f64]) -> ModelResult<usize> {
    argmax(values.iter().copied())
        .ok_or_else(|| ModelError::Invalid("empty decision vector".to_string()))
}

/// Линейная модель (LogisticRegression, LinearSVC, RidgeClassifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub classes: Vec<Prediction>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LinearModel {
    fn validate(&self) -> ModelResult<()> {
        let n_rows = self.coef.len();
        let binary = n_rows == 1 && self.classes.len() == 2;
        if !binary && n_rows != self.classes.len() {
            return Err(ModelError::Invalid(format!(
                "coef has {} rows for {} classes",
                n_rows,
                self.classes.len()
            )));
        }
        if self.intercept.len() != n_rows {
            return Err(ModelError::Invalid(format!(
                "intercept has {} entries, expected {}",
                self.intercept.len(),
                n_rows
            )));
        }
        let n_features = self.coef.first().map(|r| r.len()).unwrap_or(0);
        check_rows("coef", &self.coef, n_rows, n_features)
    }

    fn decide(&self, x: ArrayView1<f64>) -> ModelResult<usize> {
        let scores: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| w.iter().zip(x.iter()).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();

        // Бинарный случай: одна строка коэффициентов, знак выбирает класс
        if scores.len() == 1 {
            return Ok(usize::from(scores[0] > 0.0));
        }
        argmax_of(&scores)
    }
}

/// Массивы `tree_` из scikit-learn. `value` - по строке на узел
/// (распределение классов в узле).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNodes {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl TreeNodes {
    const LEAF: i64 = -1;

    fn len(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> ModelResult<()> {
        let n = self.len();
        if n == 0 {
            return Err(ModelError::Invalid("tree has no nodes".to_string()));
        }
        if self.children_right.len() != n || self.feature.len() != n || self.threshold.len() != n {
            return Err(ModelError::Invalid("tree arrays differ in length".to_string()));
        }
        if self.threshold.iter().any(|t| t.is_nan()) {
            return Err(ModelError::Invalid("tree threshold is NaN".to_string()));
        }
        check_rows("tree value", &self.value, n, n_classes)?;

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == Self::LEAF || right == Self::LEAF {
                if left != right {
                    return Err(ModelError::Invalid(format!("node {} has a single child", node)));
                }
                continue;
            }
            // Потомки всегда нумеруются после родителя, циклов быть не может
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(ModelError::Invalid(format!(
                        "node {} has invalid child {}",
                        node, child
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(ModelError::Invalid(format!(
                    "node {} splits on unknown feature {}",
                    node, feature
                )));
            }
        }
        Ok(())
    }

    fn leaf(&self, x: ArrayView1<f64>) -> ModelResult<usize> {
        let mut node = 0usize;
        for _ in 0..self.len() {
            let left = self.children_left[node];
            if left == Self::LEAF {
                return Ok(node);
            }
            let value = usize::try_from(self.feature[node])
                .ok()
                .and_then(|f| x.get(f))
                .ok_or_else(|| ModelError::Invalid(format!("node {} has bad feature", node)))?;
            let next = if *value <= self.threshold[node] {
                left
            } else {
                self.children_right[node]
            };
            node = usize::try_from(next)
                .ok()
                .filter(|&n| n < self.len())
                .ok_or_else(|| ModelError::Invalid(format!("node {} has bad child", node)))?;
        }
        Err(ModelError::Invalid("tree traversal did not reach a leaf".to_string()))
    }

    fn leaf_distribution(&self, x: ArrayView1<f64>) -> ModelResult<&[f64]> {
        let leaf = self.leaf(x)?;
        self.value
            .get(leaf)
            .map(Vec::as_slice)
            .ok_or_else(|| ModelError::Invalid(format!("leaf {} has no value", leaf)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub classes: Vec<Prediction>,
    pub n_features_in: usize,
    pub tree: TreeNodes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<Prediction>,
    pub n_features_in: usize,
    pub trees: Vec<TreeNodes>,
}

impl RandomForest {
    fn validate(&self) -> ModelResult<()> {
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features_in, self.classes.len())
                .map_err(|e| ModelError::Invalid(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }

    /// Усреднение вероятностей листьев по всем деревьям
    fn decide(&self, x: ArrayView1<f64>) -> ModelResult<usize> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let dist = tree.leaf_distribution(x)?;
            let total: f64 = dist.iter().sum();
            if total <= 0.0 {
                continue;
            }
            for (p, v) in proba.iter_mut().zip(dist) {
                *p += v / total;
            }
        }
        argmax_of(&proba)
    }
}

/// Гауссовский наивный Байес.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianNb {
    pub classes: Vec<Prediction>,
    pub theta: Vec<Vec<f64>>,
    pub var: Vec<Vec<f64>>,
    pub class_prior: Vec<f64>,
}

impl GaussianNb {
    fn validate(&self) -> ModelResult<()> {
        let n_classes = self.classes.len();
        let n_features = self.theta.first().map(|r| r.len()).unwrap_or(0);
        check_rows("theta", &self.theta, n_classes, n_features)?;
        check_rows("var", &self.var, n_classes, n_features)?;
        if self.var.iter().flatten().any(|v| *v <= 0.0) {
            return Err(ModelError::Invalid("var must be positive".to_string()));
        }
        if self.class_prior.len() != n_classes || self.class_prior.iter().any(|p| *p <= 0.0) {
            return Err(ModelError::Invalid(
                "class_prior must hold one positive entry per class".to_string(),
            ));
        }
        Ok(())
    }

    fn decide(&self, x: ArrayView1<f64>) -> ModelResult<usize> {
        let joint_log_likelihood: Vec<f64> = self
            .theta
            .iter()
            .zip(&self.var)
            .zip(&self.class_prior)
            .map(|((theta, var), prior)| {
                let norm: f64 = var.iter().map(|v| (2.0 * PI * v).ln()).sum();
                let dist: f64 = theta
                    .iter()
                    .zip(var)
                    .zip(x.iter())
                    .map(|((t, v), xi)| (xi - t).powi(2) / v)
                    .sum();
                prior.ln() - 0.5 * norm - 0.5 * dist
            })
            .collect();
        argmax_of(&joint_log_likelihood)
    }
}
