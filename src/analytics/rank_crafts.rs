//! Craft ranking engine: propagates ingredient average prices through
//! recipes and ranks crafting opportunities by absolute profit.

use std::collections::HashMap;

use crate::analytics::{group_prices_by_gid, mean_price, round2};
use crate::catalog::Catalog;
use crate::types::{CraftRanking, IngredientCost, PriceSample, RankingFilter};

/// Ranks recipes by `avg(result) - Σ avg(ingredient) * qty` over the
/// fetched scope. Ingredients and results share one price-sample space,
/// keyed by gid only. A recipe is only rankable when the result and every
/// ingredient have at least `min_samples` priced samples; the taxonomy
/// filter applies to the crafted result, never to its ingredients.
pub fn rank_crafts(
    samples: &[PriceSample],
    catalog: &Catalog,
    filter: &RankingFilter,
) -> Vec<CraftRanking> {
    let avg_price: HashMap<i64, f64> = group_prices_by_gid(samples)
        .into_iter()
        .filter(|(_, prices)| prices.len() >= filter.min_samples)
        .map(|(gid, prices)| (gid, mean_price(&prices)))
        .collect();

    let allowed = catalog.allowed_gids(filter.category, filter.type_id);

    let mut ranked: Vec<(f64, CraftRanking)> = Vec::new();
    for recipe in catalog.recipes() {
        let Some(&sell_price) = avg_price.get(&recipe.result_gid) else {
            continue;
        };
        if let Some(set) = &allowed {
            if !set.contains(&recipe.result_gid) {
                continue;
            }
        }

        // All-ingredients-available gate: one unpriced ingredient makes
        // the craft cost incomputable.
        let Some(unit_prices) = recipe
            .ingredients
            .iter()
            .map(|ing| avg_price.get(&ing.gid).copied())
            .collect::<Option<Vec<f64>>>()
        else {
            continue;
        };

        let craft_cost: f64 = recipe
            .ingredients
            .iter()
            .zip(&unit_prices)
            .map(|(ing, unit)| unit * ing.quantity as f64)
            .sum();
        let profit = sell_price - craft_cost;
        if profit <= 0.0 {
            continue;
        }
        let profit_margin_pct = if craft_cost > 0.0 {
            profit / craft_cost * 100.0
        } else {
            0.0
        };

        let ingredients = recipe
            .ingredients
            .iter()
            .zip(&unit_prices)
            .map(|(ing, &unit)| IngredientCost {
                gid: ing.gid,
                name: catalog.display_name(ing.gid),
                quantity: ing.quantity,
                unit_price: round2(unit),
                total_price: round2(unit * ing.quantity as f64),
            })
            .collect();

        ranked.push((
            profit,
            CraftRanking {
                gid: recipe.result_gid,
                name: catalog.display_name(recipe.result_gid),
                sell_price: round2(sell_price),
                craft_cost: round2(craft_cost),
                profit: round2(profit),
                profit_margin_pct: round2(profit_margin_pct),
                ingredients,
            },
        ));
    }

    // Absolute profit is the ranking key, not margin; stable sort keeps
    // catalog encounter order on ties.
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(filter.top_n);
    ranked.into_iter().map(|(_, ranking)| ranking).collect()
}
