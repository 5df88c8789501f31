//! Sales speed estimator: how often an item's price moves up between
//! consecutive sightings. A high ratio reads as "sells fast enough that
//! sellers keep raising the price".

use std::collections::{HashMap, HashSet};

use crate::types::PriceSample;

/// Computes the speed for every item in `samples`, optionally narrowed to
/// a candidate gid set. Speed = strict adjacent increases / sample count,
/// over the partition sorted by `recorded_at`. Items with fewer than two
/// priced samples are absent from the map: an undefined speed, never a
/// false zero.
pub fn sales_speed(
    samples: &[PriceSample],
    candidates: Option<&HashSet<i64>>,
) -> HashMap<i64, f64> {
    let mut by_gid: HashMap<i64, Vec<(i64, i64)>> = HashMap::new();
    for sample in samples {
        let Some(price) = sample.price else { continue };
        if let Some(set) = candidates {
            if !set.contains(&sample.gid) {
                continue;
            }
        }
        by_gid
            .entry(sample.gid)
            .or_default()
            .push((sample.recorded_at, price));
    }

    let mut speeds = HashMap::new();
    for (gid, mut series) in by_gid {
        if series.len() < 2 {
            continue;
        }
        series.sort_by_key(|&(recorded_at, _)| recorded_at);
        let increases = series
            .windows(2)
            .filter(|pair| pair[1].1 > pair[0].1)
            .count();
        speeds.insert(gid, increases as f64 / series.len() as f64);
    }
    speeds
}
