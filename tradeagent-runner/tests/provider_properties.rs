//! Property tests for data providers.

use proptest::prelude::*;
use tradeagent_runner::{DataProvider, Interval, Period, SyntheticProvider};

fn arb_ticker() -> impl Strategy<Value = String> {
    "[A-Z]{1,5}"
}

fn arb_interval() -> impl Strategy<Value = Interval> {
    prop_oneof![
        Just(Interval::FiveMinutes),
        Just(Interval::OneHour),
        Just(Interval::OneDay),
        Just(Interval::OneWeek),
    ]
}

proptest! {
    #[test]
    fn synthetic_series_are_valid(ticker in arb_ticker(), interval in arb_interval()) {
        let series = SyntheticProvider::default()
            .fetch(&ticker, Period::ThreeMonths, interval)
            .unwrap();

        prop_assert!(!series.is_empty());
        prop_assert!(series.bars().iter().all(|b| b.is_sane()));
        prop_assert!(series.timestamps().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn synthetic_series_are_reproducible(ticker in arb_ticker()) {
        let provider = SyntheticProvider::default();
        let a = provider.fetch(&ticker, Period::OneMonth, Interval::OneDay).unwrap();
        let b = provider.fetch(&ticker, Period::OneMonth, Interval::OneDay).unwrap();
        prop_assert_eq!(a, b);
    }
}
