//! Figure descriptions.

use indexmap::IndexMap;

/// One labelled curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    /// Legend label.
    pub label: String,
    /// Abscissae.
    pub x: Vec<f64>,
    /// Ordinates, same length as `x`.
    pub y: Vec<f64>,
}

/// A titled set of curves with axis labels, in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    /// Figure title.
    pub title: String,
    /// Label of the horizontal axis.
    pub x_label: String,
    /// Label of the vertical axis.
    pub y_label: String,
    series: IndexMap<String, Series>,
}

impl Figure {
    /// An empty figure.
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series: IndexMap::new(),
        }
    }

    /// Add a curve. A curve with the same label is replaced in place.
    pub fn push(&mut self, label: impl Into<String>, x: Vec<f64>, y: Vec<f64>) {
        debug_assert_eq!(x.len(), y.len());
        let label = label.into();
        self.series.insert(label.clone(), Series { label, x, y });
    }

    /// Curve with `label`, if present.
    pub fn get(&self, label: &str) -> Option<&Series> {
        self.series.get(label)
    }

    /// Curves in the order they were added.
    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.series.values()
    }

    /// Number of curves.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns `true` if the figure has no curves.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
