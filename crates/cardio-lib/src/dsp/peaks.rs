/// Local maxima of `data` that reach `height`, thinned so that no two kept
/// peaks are closer than `distance` samples.
///
/// Flat tops resolve to their middle sample (rounding left) and the first and
/// last samples are never peaks. When two candidates conflict the taller one
/// wins; among equal heights the later one is kept. Output is ascending.
pub fn find_peaks(data: &[f64], height: f64, distance: usize) -> Vec<usize> {
    let candidates: Vec<usize> = local_maxima(data)
        .into_iter()
        .filter(|&i| data[i] >= height)
        .collect();
    if distance <= 1 || candidates.len() < 2 {
        return candidates;
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| data[candidates[a]].total_cmp(&data[candidates[b]]));

    let mut keep = vec![true; candidates.len()];
    for &i in order.iter().rev() {
        if !keep[i] {
            continue;
        }
        let peak = candidates[i];
        for j in (0..i).rev() {
            if peak - candidates[j] >= distance {
                break;
            }
            keep[j] = false;
        }
        for j in i + 1..candidates.len() {
            if candidates[j] - peak >= distance {
                break;
            }
            keep[j] = false;
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(idx, k)| k.then_some(idx))
        .collect()
}

fn local_maxima(data: &[f64]) -> Vec<usize> {
    let mut out = Vec::new();
    if data.len() < 3 {
        return out;
    }
    let last = data.len() - 1;
    let mut i = 1;
    while i < last {
        if data[i - 1] < data[i] {
            let mut ahead = i + 1;
            while ahead < last && data[ahead] == data[i] {
                ahead += 1;
            }
            if data[ahead] < data[i] {
                out.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    out
}
