use crate::data_frame::*;

/// Fraction of positions where the labels agree; both must have the same length
pub fn accuracy_score(true_y: &Labels, pred_y: &Labels) -> V {
    assert_eq!(true_y.len(), pred_y.len());
    if true_y.is_empty() {
        return 0.0;
    }
    let hits = true_y
        .iter()
        .zip(pred_y.iter())
        .filter(|(a, b)| a == b)
        .count();
    hits as V / true_y.len() as V
}

/// Column of the highest value in every row, ties go to the lowest column
pub fn argmax_rows(df: &DataFrame) -> Vec<usize> {
    df.outer_iter()
        .map(|row| {
            let mut best = 0;
            for (j, v) in row.iter().enumerate() {
                if *v > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect()
}
