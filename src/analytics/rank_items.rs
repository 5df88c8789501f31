//! Resale ranking engine: orders items by how much room their recent
//! price history leaves between the cheap end and the average.

use statrs::statistics::Statistics;

use crate::analytics::{group_prices_by_gid, mean_price, round2};
use crate::catalog::Catalog;
use crate::types::{ItemRanking, PriceSample, RankingFilter};

/// Ranks items by profitability score over the fetched scope. The caller
/// fetches samples matching server/window/tier; taxonomy filtering, the
/// min-sample gate and the aggregation happen here.
pub fn rank_items(
    samples: &[PriceSample],
    catalog: &Catalog,
    filter: &RankingFilter,
) -> Vec<ItemRanking> {
    let allowed = catalog.allowed_gids(filter.category, filter.type_id);

    let mut ranked: Vec<(f64, ItemRanking)> = Vec::new();
    for (gid, prices) in group_prices_by_gid(samples) {
        if let Some(set) = &allowed {
            if !set.contains(&gid) {
                continue;
            }
        }
        if prices.len() < filter.min_samples {
            continue;
        }
        // No catalog entry at all: skip rather than rank an unknown id.
        // An entry without a localized name still ranks, under a
        // synthetic label.
        if catalog.item(gid).is_none() {
            continue;
        }

        let prices_f: Vec<f64> = prices.iter().map(|&p| p as f64).collect();
        let avg = mean_price(&prices);
        let min = prices.iter().copied().min().unwrap_or(0);
        let max = prices.iter().copied().max().unwrap_or(0);
        let volatility = prices_f.iter().population_std_dev();

        let profit_potential = avg - min as f64;
        let profit_margin_pct = if min > 0 {
            profit_potential / min as f64 * 100.0
        } else {
            0.0
        };
        let score = profit_potential * profit_margin_pct;

        ranked.push((
            score,
            ItemRanking {
                gid,
                name: catalog.display_name(gid),
                avg_price: round2(avg),
                min_price: min,
                max_price: max,
                volatility: round2(volatility),
                profit_potential: round2(profit_potential),
                profit_margin_pct: round2(profit_margin_pct),
                profitability_score: round2(score),
                samples: prices.len(),
            },
        ));
    }

    // Stable sort on the full-precision score keeps encounter order for
    // ties; reported fields above are already rounded for presentation.
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(filter.top_n);
    ranked.into_iter().map(|(_, ranking)| ranking).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ItemEntry, ItemTypeEntry};
    use crate::types::QuantityTier;

    fn sample(gid: i64, price: i64, recorded_at: i64) -> PriceSample {
        PriceSample {
            gid,
            quantity: QuantityTier::Hundred,
            price: Some(price),
            recorded_at,
            server_id: 1,
        }
    }

    fn catalog_with(gids: &[i64]) -> Catalog {
        Catalog::from_parts(
            gids.iter()
                .map(|&gid| ItemEntry {
                    gid,
                    type_id: 10,
                    name: Some(format!("Thing {gid}")),
                })
                .collect(),
            vec![ItemTypeEntry { id: 10, category_id: 100, name: "Things".into() }],
            vec![],
        )
    }

    fn series(gid: i64, prices: &[i64]) -> Vec<PriceSample> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| sample(gid, p, i as i64))
            .collect()
    }

    #[test]
    fn aggregates_match_known_series() {
        let samples = series(7001, &[100, 150, 200, 250, 300]);
        let catalog = catalog_with(&[7001]);
        let result = rank_items(&samples, &catalog, &RankingFilter::new(1));

        assert_eq!(result.len(), 1);
        let item = &result[0];
        assert_eq!(item.min_price, 100);
        assert_eq!(item.max_price, 300);
        assert_eq!(item.avg_price, 200.0);
        assert_eq!(item.profit_potential, 100.0);
        assert_eq!(item.profit_margin_pct, 100.0);
        assert_eq!(item.profitability_score, 10000.0);
        assert_eq!(item.samples, 5);
        // Population std-dev: sqrt(5000) ~= 70.71.
        assert!((70.0..=71.0).contains(&item.volatility));
    }

    #[test]
    fn sorts_most_profitable_first() {
        let mut samples = series(1001, &[50, 80, 100, 120, 150]);
        samples.extend(series(1002, &[80, 90, 100, 110, 120]));
        samples.extend(series(1003, &[98, 99, 100, 101, 102]));
        let catalog = catalog_with(&[1001, 1002, 1003]);

        let result = rank_items(&samples, &catalog, &RankingFilter::new(1));
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].gid, 1001);
        assert!(result[0].profitability_score >= result[1].profitability_score);
        assert!(result[1].profitability_score >= result[2].profitability_score);
    }

    #[test]
    fn min_samples_gate_excludes_thin_series() {
        let mut samples = series(2001, &[100, 110, 120, 130, 140, 150]);
        samples.extend(series(2002, &[100, 110, 120]));
        let catalog = catalog_with(&[2001, 2002]);

        let result = rank_items(&samples, &catalog, &RankingFilter::new(1));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].gid, 2001);
        assert_eq!(result[0].samples, 6);
    }

    #[test]
    fn top_n_truncates_after_sorting() {
        let mut samples = Vec::new();
        let gids: Vec<i64> = (3001..3011).collect();
        for (offset, &gid) in gids.iter().enumerate() {
            let base = 100 + offset as i64 * 10;
            samples.extend(series(gid, &[base, base + 20, base + 40, base + 60, base + 80]));
        }
        let catalog = catalog_with(&gids);

        let mut filter = RankingFilter::new(1);
        filter.top_n = 3;
        let result = rank_items(&samples, &catalog, &filter);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn taxonomy_filter_drops_out_of_scope_items() {
        let mut samples = series(1, &[100, 150, 200, 250, 300]);
        samples.extend(series(2, &[100, 150, 200, 250, 300]));
        let catalog = Catalog::from_parts(
            vec![
                ItemEntry { gid: 1, type_id: 10, name: Some("In scope".into()) },
                ItemEntry { gid: 2, type_id: 20, name: Some("Out of scope".into()) },
            ],
            vec![
                ItemTypeEntry { id: 10, category_id: 100, name: "A".into() },
                ItemTypeEntry { id: 20, category_id: 200, name: "B".into() },
            ],
            vec![],
        );

        let mut filter = RankingFilter::new(1);
        filter.type_id = Some(10);
        let result = rank_items(&samples, &catalog, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].gid, 1);

        let mut filter = RankingFilter::new(1);
        filter.category = Some(200);
        let result = rank_items(&samples, &catalog, &filter);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].gid, 2);
    }

    #[test]
    fn unknown_gid_is_skipped_unnamed_entry_gets_label() {
        let mut samples = series(1, &[100, 150, 200, 250, 300]);
        samples.extend(series(2, &[100, 150, 200, 250, 300]));
        let catalog = Catalog::from_parts(
            vec![ItemEntry { gid: 1, type_id: 10, name: None }],
            vec![],
            vec![],
        );

        let result = rank_items(&samples, &catalog, &RankingFilter::new(1));
        // gid 2 has no catalog entry at all and is skipped; gid 1 ranks
        // under its synthetic label.
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].gid, 1);
        assert_eq!(result[0].name, "Item 1");
    }

    #[test]
    fn profit_potential_never_negative() {
        for prices in [&[100, 100, 100, 100, 100][..], &[1, 2, 3, 4, 1000][..]] {
            let samples = series(42, prices);
            let catalog = catalog_with(&[42]);
            let result = rank_items(&samples, &catalog, &RankingFilter::new(1));
            assert!(result[0].profit_potential >= 0.0);
            assert!(result[0].profitability_score >= 0.0);
        }
    }
}
