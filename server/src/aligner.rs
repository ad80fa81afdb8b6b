use log::debug;
use model::{Features, Regressor};
use ndarray::Array2;

/// Tags `values` with the feature names `model` was fitted with.
///
/// Falls back to the bare matrix when the model didn't record names or when the
/// amount of names doesn't match the amount of columns. Never fails, a mismatch is
/// left for the engine to judge.
pub fn align<M>(values: Array2<f64>, model: &M) -> Features
where
    M: Regressor + ?Sized,
{
    match model.feature_names() {
        Some(names) if names.len() == values.ncols() => Features::Labeled {
            columns: names.to_vec(),
            values,
        },
        Some(names) => {
            debug!(
                "not labeling input: {} column(s) for {} trained feature name(s)",
                values.ncols(),
                names.len()
            );
            Features::Bare(values)
        }
        None => Features::Bare(values),
    }
}
