use super::records::Record;

/// Summary statistics over the `value` column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueStats {
    pub count: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

/// Computes count, mean, max and min of the non-empty values in `records`.
///
/// Returns `None` when no record carries a value.
pub fn value_stats(records: &[Record]) -> Option<ValueStats> {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|record| record.value)
        .filter(|value| value.is_finite())
        .collect();

    if values.is_empty() {
        return None;
    }

    let sum: f64 = values.iter().sum();
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    Some(ValueStats {
        count: values.len(),
        mean: sum / values.len() as f64,
        max,
        min,
    })
}
