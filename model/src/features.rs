use ndarray::{Array2, ArrayView2};

/// A numeric sample matrix, `(samples, features)`, optionally tagged with column names.
///
/// Tagging never changes the values, it only tells the engine which schema the
/// columns follow.
#[derive(Debug, Clone, PartialEq)]
pub enum Features {
    Bare(Array2<f64>),
    Labeled {
        columns: Vec<String>,
        values: Array2<f64>,
    },
}

impl Features {
    pub fn values(&self) -> ArrayView2<'_, f64> {
        match self {
            Self::Bare(values) | Self::Labeled { values, .. } => values.view(),
        }
    }

    /// Returns the column names, if the matrix is labeled.
    pub fn columns(&self) -> Option<&[String]> {
        match self {
            Self::Bare(_) => None,
            Self::Labeled { columns, .. } => Some(columns),
        }
    }

    pub fn nrows(&self) -> usize {
        self.values().nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values().ncols()
    }
}

impl From<Array2<f64>> for Features {
    fn from(values: Array2<f64>) -> Self {
        Self::Bare(values)
    }
}
