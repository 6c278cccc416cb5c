/// Integer counterpart of `numpy.arange` that includes `stop`.
pub struct LoadRange {
    stop: usize,
    step: usize,
    current: usize,
}

impl LoadRange {
    fn new(start: usize, stop: usize, step: usize) -> Self {
        LoadRange {
            stop,
            step: step.max(1),
            current: start,
        }
    }
}

impl Iterator for LoadRange {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current <= self.stop {
            let result = self.current;
            self.current += self.step;
            Some(result)
        } else {
            None
        }
    }
}

pub fn load_range(start: usize, stop: usize, step: usize) -> LoadRange {
    LoadRange::new(start, stop, step)
}

pub fn load_levels(start: usize, stop: usize, step: usize) -> Vec<usize> {
    load_range(start, stop, step).collect()
}

/// Column-wise mean of ragged rows, ignoring missing cells.
pub fn column_means(rows: &[Vec<Option<f64>>]) -> Vec<Option<f64>> {
    let ncols = rows.iter().map(|r| r.len()).max().unwrap_or(0);

    (0..ncols)
        .map(|c| {
            let values: Vec<f64> = rows.iter().filter_map(|r| r.get(c).copied().flatten()).collect();
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        })
        .collect()
}

pub fn contains_subslice<T: PartialEq>(main_slice: &[T], sub_slice: &[T]) -> bool {
    // main_sliceをsub_sliceの長さのウィンドウでスライドしながら部分一致を探す
    !sub_slice.is_empty() && main_slice.windows(sub_slice.len()).any(|window| window == sub_slice)
}

#[test]
fn load_levels_include_stop() {
    assert_eq!(load_levels(30, 190, 20).len(), 9);
    assert_eq!(load_levels(1, 1, 1), vec![1]);
    assert_eq!(load_levels(5, 12, 4), vec![5, 9]);
}

#[test]
fn column_means_skip_missing() {
    let rows = vec![
        vec![Some(1.0), Some(4.0), Some(10.0)],
        vec![Some(3.0), None],
    ];
    assert_eq!(column_means(&rows), vec![Some(2.0), Some(4.0), Some(10.0)]);
    assert!(column_means(&[]).is_empty());
}
