use super::{Adapter, ErrorPolicy};
use crate::model::{
    FearGreedIndex, FearGreedRating, IndexQuote, MarketData, MortgageRates, PricePoint,
};
use anyhow::Result;
use rand::Rng;

const SP500_BASE: f64 = 5137.08;
const HISTORY_POINTS: i64 = 100;
const HISTORY_STEP_SECS: i64 = 5 * 60;

/// Market indicators modelled around recent reference values.
#[derive(Default)]
pub struct MarketAdapter;

pub(crate) fn sample<R: Rng>(now: i64, rng: &mut R) -> MarketData {
    let change = rng.gen_range(-50.0..50.0);
    let price = SP500_BASE + change;
    let history = (0..HISTORY_POINTS)
        .map(|i| PricePoint {
            timestamp: now - (HISTORY_POINTS - 1 - i) * HISTORY_STEP_SECS,
            price: price + rng.gen_range(-10.0..10.0),
        })
        .collect();
    let fear_greed = rng.gen_range(50..90u8);
    MarketData {
        sp500: IndexQuote {
            price,
            change,
            change_percent: change / SP500_BASE * 100.0,
            history,
        },
        fear_greed: FearGreedIndex {
            value: fear_greed,
            rating: FearGreedRating::from_value(fear_greed),
            previous_close: 63,
            previous_week: 60,
            previous_month: 55,
        },
        mortgage_rates: MortgageRates {
            thirty_year: rng.gen_range(6.5..7.3),
            fifteen_year: rng.gen_range(5.8..6.4),
            five_one_arm: rng.gen_range(6.0..6.8),
        },
    }
}

impl Adapter for MarketAdapter {
    type Params = ();
    type Output = MarketData;

    fn name(&self) -> &'static str {
        "market"
    }

    fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::Fallback
    }

    fn fetch(&self, _params: &()) -> Result<MarketData> {
        Ok(sample(chrono::Utc::now().timestamp(), &mut rand::thread_rng()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn history_ends_at_now_in_five_minute_steps() {
        let data = sample(1_000_000, &mut StdRng::seed_from_u64(3));
        let history = &data.sp500.history;
        assert_eq!(history.len(), HISTORY_POINTS as usize);
        assert_eq!(history.last().unwrap().timestamp, 1_000_000);
        assert_eq!(history[1].timestamp - history[0].timestamp, HISTORY_STEP_SECS);
        assert_eq!(
            data.fear_greed.rating,
            FearGreedRating::from_value(data.fear_greed.value)
        );
    }
}
