//! Reduce raw option-chain quotes to one priced row per strike.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::Side;
use crate::types::option_chain::{OptionChainRow, OptionQuote};

/// Build the result rows for one side of the chain.
///
/// Quotes of the other side (and the underlying's own entry) are ignored.
/// For each strike the best quote is taken: highest bid for puts, highest ask
/// for calls. Strikes whose best price is not strictly positive are dropped.
/// Rows come back sorted by strike. Margin and premium are left at zero for
/// [`MarginCalculator`](crate::margin::MarginCalculator) to fill in.
pub fn extract_rows(
    quotes: &[OptionQuote],
    instrument_name: &str,
    side: Side,
    expiry_date: NaiveDate,
) -> Vec<OptionChainRow> {
    // Keyed by strike bits; for non-negative floats bit order is numeric order.
    let mut best: BTreeMap<u64, (f64, &OptionQuote)> = BTreeMap::new();

    for quote in quotes
        .iter()
        .filter(|q| q.option_type.eq_ignore_ascii_case(side.as_str()))
        .filter(|q| q.strike_price.is_finite() && q.strike_price >= 0.0)
    {
        let price = match side {
            Side::PE => quote.bid,
            Side::CE => quote.ask,
        }
        .unwrap_or(0.0);

        best.entry(quote.strike_price.to_bits())
            .and_modify(|current| {
                if price > current.0 {
                    *current = (price, quote);
                }
            })
            .or_insert((price, quote));
    }

    best.into_values()
        .filter(|(price, _)| *price > 0.0)
        .map(|(price, quote)| OptionChainRow {
            instrument_name: instrument_name.to_uppercase(),
            strike_price: quote.strike_price,
            side,
            price,
            symbol: quote.symbol.clone(),
            expiry_date,
            margin_required: 0.0,
            premium_earned: 0.0,
        })
        .collect()
}
