use super::provider_selector::ProviderStats;
use super::{select, select_from_input};
use crate::annotator::annotate;
use crate::models::{AnnotatedRecord, FeeTable, ProviderFees, SelectionOutcome, SelectionQuery, TransactionRecord};
use crate::types::InputError;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

fn create_record(country: &str, card_type: &str, amount: &str, three_d_secure: bool, provider: &str, success: bool) -> Result<TransactionRecord> {
    Ok(TransactionRecord {
        timestamp: "2019-01-01 00:00:00".to_string(),
        country: country.to_string(),
        card_type: card_type.to_string(),
        amount: Decimal::from_str(amount)?,
        three_d_secure,
        provider: provider.to_string(),
        success
    })
}

fn create_query(country: &str, card_type: &str, amount: &str, three_d_secure: bool) -> Result<SelectionQuery> {
    Ok(SelectionQuery {
        country: country.to_string(),
        card_type: card_type.to_string(),
        amount: Decimal::from_str(amount)?,
        three_d_secure
    })
}

fn selected_provider(outcome: &SelectionOutcome) -> Result<&str> {
    outcome.selected()
        .map(|result| result.provider.as_str())
        .ok_or_else(|| anyhow!("Expected a selected provider, got {outcome:?}"))
}

#[test]
fn test_selector_picks_provider_with_lowest_success_rate() -> Result<()> {
    let records = annotate(vec![
        create_record("Germany", "Visa", "150.0", true, "Simplecard", true)?,
        create_record("Germany", "Visa", "150.0", true, "Goldcard", false)?,
    ], &FeeTable::default())?;

    let outcome = select_from_input(&records, "Germany", "Visa", "150.0", "1")?;
    let result = outcome.selected().ok_or_else(|| anyhow!("No provider selected"))?;

    assert_eq!(result.provider, "Goldcard");
    assert_eq!(result.success_fee, Decimal::from(10));
    assert_eq!(result.failure_fee, Decimal::from(5));
    assert_eq!(result.success_rate, 0.0);
    assert_eq!(result.matched, 1);

    Ok(())
}

#[test]
fn test_selector_rejects_unparseable_amount() -> Result<()> {
    let records = annotate(vec![create_record("Germany", "Visa", "150", true, "Goldcard", false)?], &FeeTable::default())?;

    let result = select_from_input(&records, "Germany", "Visa", "abc", "1");

    assert_eq!(result, Err(InputError::InvalidAmount { input: "abc".to_string() }));

    Ok(())
}

#[test]
fn test_selector_rejects_flag_outside_zero_and_one() -> Result<()> {
    let records = annotate(vec![create_record("Germany", "Visa", "150", true, "Goldcard", false)?], &FeeTable::default())?;

    let result = select_from_input(&records, "Germany", "Visa", "150", "2");

    assert_eq!(result, Err(InputError::InvalidFlag { input: "2".to_string() }));

    Ok(())
}

#[test]
fn test_selector_returns_no_match_when_nothing_matches() -> Result<()> {
    let records = annotate(vec![
        create_record("Germany", "Visa", "150", true, "Goldcard", false)?,
        create_record("Austria", "Master", "80", false, "UK_Card", true)?,
    ], &FeeTable::default())?;

    assert_eq!(select(&records, &create_query("Germany", "Visa", "150", false)?), SelectionOutcome::NoMatch);
    assert_eq!(select(&records, &create_query("Germany", "Master", "150", true)?), SelectionOutcome::NoMatch);
    assert_eq!(select(&records, &create_query("Switzerland", "Visa", "150", true)?), SelectionOutcome::NoMatch);
    assert_eq!(select(&[], &create_query("Germany", "Visa", "150", true)?), SelectionOutcome::NoMatch);

    Ok(())
}

#[test]
fn test_selector_matches_amounts_by_exact_equality() -> Result<()> {
    let records = annotate(vec![create_record("Germany", "Visa", "150", true, "Goldcard", false)?], &FeeTable::default())?;

    assert_eq!(selected_provider(&select_from_input(&records, "Germany", "Visa", "150.00", "1")?)?, "Goldcard");
    assert_eq!(select_from_input(&records, "Germany", "Visa", "150.01", "1")?, SelectionOutcome::NoMatch);
    assert_eq!(select_from_input(&records, "Germany", "Visa", "149.99", "1")?, SelectionOutcome::NoMatch);

    Ok(())
}

#[test]
fn test_selector_breaks_full_ties_by_provider_name() -> Result<()> {
    let records = annotate(vec![
        create_record("Germany", "Visa", "100", false, "Moneycard", true)?,
        create_record("Germany", "Visa", "100", false, "Moneycard", false)?,
        create_record("Germany", "Visa", "100.0", false, "Goldcard", true)?,
        create_record("Germany", "Visa", "100", false, "Goldcard", false)?,
    ], &FeeTable::default())?;

    let query = create_query("Germany", "Visa", "100", false)?;
    let first = select(&records, &query);

    assert_eq!(selected_provider(&first)?, "Goldcard");

    for _ in 0..10 {
        assert_eq!(select(&records, &query), first);
    }

    Ok(())
}

#[test]
fn test_ranking_breaks_rate_ties_by_minimum_amount() -> Result<()> {
    let fees = ProviderFees::new(Decimal::from(1), Decimal::from(1));
    let annotated = |amount: &str, success: bool| -> Result<AnnotatedRecord> {
        Ok(AnnotatedRecord { record: create_record("Germany", "Visa", amount, false, "Alpha", success)?, fees })
    };

    let mut cheap = ProviderStats::new(&annotated("80", true)?);
    cheap.observe(&annotated("120", false)?.record);

    let mut expensive = ProviderStats::new(&annotated("90", false)?);
    expensive.observe(&annotated("95", true)?.record);

    let mut reliable = ProviderStats::new(&annotated("10", true)?);
    reliable.observe(&annotated("10", true)?.record);

    assert_eq!(cheap.ranking(&expensive), Ordering::Less);
    assert_eq!(expensive.ranking(&cheap), Ordering::Greater);
    assert_eq!(cheap.ranking(&reliable), Ordering::Less);
    assert_eq!(cheap.ranking(&cheap), Ordering::Equal);

    Ok(())
}

#[test]
fn test_selector_prefers_rate_over_group_size() -> Result<()> {
    // Simplecard: 1 of 3 (0.33); UK_Card: 1 of 2 (0.5).
    let records = annotate(vec![
        create_record("Austria", "Master", "42", true, "UK_Card", true)?,
        create_record("Austria", "Master", "42", true, "UK_Card", false)?,
        create_record("Austria", "Master", "42", true, "Simplecard", false)?,
        create_record("Austria", "Master", "42", true, "Simplecard", true)?,
        create_record("Austria", "Master", "42", true, "Simplecard", false)?,
    ], &FeeTable::default())?;

    let outcome = select(&records, &create_query("Austria", "Master", "42", true)?);
    let result = outcome.selected().ok_or_else(|| anyhow!("No provider selected"))?;

    assert_eq!(result.provider, "Simplecard");
    assert_eq!(result.matched, 3);
    assert!((result.success_rate - 1.0 / 3.0).abs() < f64::EPSILON);

    Ok(())
}

#[test]
fn test_selector_reads_fees_from_first_country_record_of_provider() -> Result<()> {
    let early = ProviderFees::new(Decimal::from(7), Decimal::from(3));
    let late = ProviderFees::new(Decimal::from(9), Decimal::from(4));
    let record = |card_type: &str, amount: &str| create_record("Germany", card_type, amount, false, "Goldcard", false);

    let records = vec![
        AnnotatedRecord { record: create_record("Austria", "Visa", "10", false, "Goldcard", false)?, fees: late },
        AnnotatedRecord { record: record("Master", "55")?, fees: early },
        AnnotatedRecord { record: record("Visa", "10")?, fees: late },
    ];

    let outcome = select(&records, &create_query("Germany", "Visa", "10", false)?);

    assert_eq!(outcome.selected().map(|result| result.fees()), Some(early));

    Ok(())
}

#[test]
fn test_selector_is_idempotent() -> Result<()> {
    let records = annotate(vec![
        create_record("Switzerland", "Diners", "250", false, "Moneycard", true)?,
        create_record("Switzerland", "Diners", "250", false, "UK_Card", false)?,
        create_record("Switzerland", "Diners", "250", false, "Goldcard", false)?,
    ], &FeeTable::default())?;

    let outcomes: Vec<_> = (0..5)
        .map(|_| select_from_input(&records, "Switzerland", "Diners", "250", "0"))
        .collect::<Result<_, _>>()?;

    assert!(outcomes.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(selected_provider(&outcomes[0])?, "Goldcard");

    Ok(())
}

#[test]
fn test_selected_provider_has_minimum_success_rate_on_random_datasets() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let providers = ["Moneycard", "Goldcard", "UK_Card", "Simplecard"];
    let countries = ["Germany", "Austria"];
    let cards = ["Visa", "Master", "Diners"];
    let amounts = ["10", "20", "30"];

    for _ in 0..50 {
        let mut records = Vec::new();

        for _ in 0..rng.random_range(1..80) {
            records.push(create_record(
                countries[rng.random_range(0..countries.len())],
                cards[rng.random_range(0..cards.len())],
                amounts[rng.random_range(0..amounts.len())],
                rng.random_bool(0.5),
                providers[rng.random_range(0..providers.len())],
                rng.random_bool(0.4),
            )?);
        }

        let records = annotate(records, &FeeTable::default())?;
        let query = create_query(countries[0], cards[0], amounts[0], true)?;

        let mut expected = BTreeMap::<&str, (u32, u32)>::new();

        for record in records.iter().map(|annotated| &annotated.record) {
            if record.country == query.country
                && record.card_type == query.card_type
                && record.amount == query.amount
                && record.three_d_secure == query.three_d_secure
            {
                let entry = expected.entry(record.provider.as_str()).or_default();
                entry.0 += u32::from(record.success);
                entry.1 += 1;
            }
        }

        match select(&records, &query) {
            SelectionOutcome::NoMatch => assert!(expected.is_empty()),
            SelectionOutcome::Selected(result) => {
                for (successes, attempts) in expected.values() {
                    assert!(result.success_rate <= f64::from(*successes) / f64::from(*attempts));
                }

                assert_eq!(Some(result.fees()), FeeTable::default().fees_for(&result.provider));
            }
        }
    }

    Ok(())
}
