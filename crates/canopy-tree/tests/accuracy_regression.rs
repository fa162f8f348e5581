//! Accuracy regression tests for canopy-tree.
//!
//! These tests pin down profiling and fitting behaviour on the classic
//! 14-row weather table so that algorithmic changes cannot silently degrade
//! training-set accuracy.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use canopy_tree::{
    Dataset, ForestConfig, Leaf, Node, Parallelism, SplitMethod, TreeConfig, Value, bootstrap,
    profile,
};

// ---------------------------------------------------------------------------
// Helper: the weather table
// ---------------------------------------------------------------------------

const WEATHER: &str = "\
Outlook,Temperature,Humidity,Windy,Play
sunny,85,85,FALSE,no
sunny,80,90,TRUE,no
overcast,83,86,FALSE,yes
rainy,70,96,FALSE,yes
rainy,68,80,FALSE,yes
rainy,65,70,TRUE,no
overcast,64,65,TRUE,yes
sunny,72,95,FALSE,no
sunny,69,70,FALSE,yes
rainy,75,80,FALSE,yes
sunny,75,70,TRUE,yes
overcast,72,90,TRUE,yes
overcast,81,75,FALSE,yes
rainy,71,91,TRUE,no";

fn weather() -> Dataset {
    let mut lines = WEATHER.lines();
    let header = lines
        .next()
        .unwrap()
        .split(',')
        .map(str::to_string)
        .collect();
    let rows = lines
        .map(|line| line.split(',').map(Value::parse).collect())
        .collect();
    Dataset::new(header, rows).unwrap()
}

fn leaves(node: &Node) -> Vec<&Leaf> {
    match node {
        Node::Leaf(leaf) => vec![leaf],
        Node::Internal { left, right, .. } => {
            let mut out = leaves(left);
            out.extend(leaves(right));
            out
        }
    }
}

// ---------------------------------------------------------------------------
// a) column profile
// ---------------------------------------------------------------------------

#[test]
fn weather_columns_profile() {
    let columns = profile(&weather());
    let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
    assert_eq!(names, ["Outlook", "Temperature", "Humidity", "Windy", "Play"]);

    assert!(columns[0].is_categorical());
    assert_eq!(columns[0].unique_values(), 3);

    assert!(!columns[1].is_categorical());
    assert!(columns[1].is_numeric());
    assert_eq!(columns[1].unique_values(), 12);

    assert!(!columns[2].is_categorical());
    assert!(columns[2].is_numeric());
    assert_eq!(columns[2].unique_values(), 10);

    assert!(columns[3].is_categorical());
    assert!(columns[3].is_boolean());
    assert_eq!(columns[3].unique_values(), 2);

    assert!(columns[4].is_categorical());
    assert_eq!(columns[4].unique_values(), 2);
}

// ---------------------------------------------------------------------------
// b) single tree reproduces training labels
// ---------------------------------------------------------------------------

#[test]
fn deep_tree_resubstitution_is_perfect() {
    let ds = weather();
    let tree = TreeConfig::new()
        .with_max_depth(Some(1000))
        .fit(&ds, "Play")
        .unwrap();

    for row in ds.rows() {
        let prediction = tree.evaluate(row).unwrap();
        assert_eq!(prediction.top_class(), Some(&row[4]));
        // Evaluation is pure.
        assert_eq!(tree.evaluate(row).unwrap(), prediction);
    }
}

#[test]
fn leaf_distributions_are_normalized() {
    let ds = weather();
    let tree = TreeConfig::new()
        .with_max_depth(Some(2))
        .fit(&ds, "Play")
        .unwrap();

    for leaf in leaves(tree.root()) {
        let Leaf::Class { distribution, .. } = leaf else {
            panic!("Play is categorical");
        };
        let total: f64 = distribution.iter().map(|c| c.probability).sum();
        assert!((total - 1.0).abs() < 1e-10, "total = {total}");
        if distribution.len() == 1 {
            assert!((distribution[0].probability - 1.0).abs() < f64::EPSILON);
        }
    }
}

// ---------------------------------------------------------------------------
// c) forest reproduces training labels
// ---------------------------------------------------------------------------

fn forest_config() -> ForestConfig {
    ForestConfig::new(200)
        .unwrap()
        .with_max_depth(Some(10))
        .with_attributes(Some(3))
        .with_split_method(SplitMethod::Random { split_count: 10 })
}

#[test]
fn forest_resubstitution_is_perfect() {
    let ds = weather();
    let forest = forest_config().fit(&ds, "Play").unwrap();

    assert_eq!(forest.n_trees(), 200);
    for tree in forest.trees() {
        assert_eq!(tree.features().len(), 3);
        assert!(tree.depth() <= 10);
    }
    for row in ds.rows() {
        let prediction = forest.evaluate(row).unwrap();
        assert_eq!(prediction.top_class(), Some(&row[4]));
    }
}

#[test]
fn forest_is_reproducible() {
    let ds = weather();
    for parallelism in [Parallelism::Sequential, Parallelism::Parallel] {
        let config = forest_config().with_parallelism(parallelism).with_seed(2024);
        let a = config.fit(&ds, "Play").unwrap();
        let b = config.fit(&ds, "Play").unwrap();
        assert_eq!(a, b);
    }
}

// ---------------------------------------------------------------------------
// d) bootstrap shape
// ---------------------------------------------------------------------------

#[test]
fn bootstrap_five_by_ten() {
    let ds = weather();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let samples = bootstrap(&mut rng, &ds, 5, Some(10)).unwrap();
    assert_eq!(samples.len(), 5);
    for sample in &samples {
        assert_eq!(sample.n_rows(), 10);
        assert_eq!(sample.header(), ds.header());
    }
}

// ---------------------------------------------------------------------------
// e) regression on a numeric target
// ---------------------------------------------------------------------------

#[test]
fn temperature_regression_leaves_respect_min_rows() {
    let ds = weather();
    let tree = TreeConfig::new()
        .with_min_rows(Some(3))
        .fit(&ds, "Temperature")
        .unwrap();

    for leaf in leaves(tree.root()) {
        let Leaf::Value { mean, variance, n_rows } = leaf else {
            panic!("Temperature is numeric");
        };
        assert!((64.0..=85.0).contains(mean));
        assert!(*variance >= 0.0);
        assert!(*n_rows >= 1);
    }
    for row in ds.rows() {
        let predicted = tree.evaluate(row).unwrap().value().unwrap();
        assert!((64.0..=85.0).contains(&predicted));
    }
}
