//! End-to-end evaluation through the agent pipeline with the default
//! locale.

use numby::locale::LOCALES;
use numby::units::UnitTable;
use numby::{AgentKind, Context, ErrorKind, Evaluation, NumbyResult, Pipeline, Value, ValueKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

struct Calculator {
    pipeline: Pipeline,
    context: Context,
}

impl Calculator {
    fn new() -> Self {
        Self {
            pipeline: Pipeline::new(),
            context: Context::new(),
        }
    }

    fn eval(&mut self, input: &str) -> NumbyResult<Evaluation> {
        self.pipeline
            .evaluate_in(input, &mut self.context, &LOCALES[0])
    }

    fn formatted(&mut self, input: &str) -> String {
        match self.eval(input) {
            Ok(evaluation) => evaluation.formatted,
            Err(e) => panic!("'{}' failed: {}", input, e),
        }
    }

    fn error(&mut self, input: &str) -> ErrorKind {
        match self.eval(input) {
            Ok(evaluation) => panic!("'{}' gave {}", input, evaluation.formatted),
            Err(e) => e.kind(),
        }
    }
}

#[test]
fn test_arithmetic_session() {
    let mut calc = Calculator::new();
    assert_eq!(calc.formatted("2 + 3 * 4"), "14");
    assert_eq!(calc.formatted("(2 + 3) * 4"), "20");
    assert_eq!(calc.formatted("2 ^ 10"), "1,024");
    assert_eq!(calc.formatted("1 / 3"), "0.3333333333");
    assert_eq!(calc.formatted("3 times 4 plus 1"), "13");
    assert_eq!(calc.formatted("10 divided by 4"), "2.5");
    assert_eq!(calc.formatted("sqrt(16) + abs(-2)"), "6");
    assert_eq!(calc.formatted("1.5e3 + 0x10"), "1,516");
    assert_eq!(calc.context.history_count(), 8);
}

#[test]
fn test_free_form_input() {
    let mut calc = Calculator::new();
    assert_eq!(calc.formatted("1_000_000 + 1"), "1,000,001");
    assert_eq!(calc.formatted("5 + 3 // tip"), "8");
    assert_eq!(calc.formatted("12 # note"), "12");
    assert_eq!(calc.formatted("ten plus five"), "15");
    assert_eq!(calc.context.history_count(), 4);
}

#[test]
fn test_bound_name_shadows_unit_after_number() {
    let mut calc = Calculator::new();
    assert_eq!(calc.formatted("h = 3"), "3");
    let evaluation = calc.eval("2 h").unwrap();
    assert_eq!(evaluation.value, Value::number(6.0));
    assert_eq!(evaluation.agent, AgentKind::Variable);
}

#[test]
fn test_temperature_divisor_is_converted_first() {
    let mut calc = Calculator::new();
    let ratio = calc.eval("300 K / 0 C").unwrap();
    assert!((ratio.value.amount - 300.0 / 273.15).abs() < 1e-9);
    assert_eq!(calc.error("5 C / 273.15 K"), ErrorKind::DivisionByZero);
}

#[test]
fn test_variables_and_history() {
    let mut calc = Calculator::new();
    assert_eq!(calc.formatted("price = 40"), "40");
    assert_eq!(calc.formatted("price * 2"), "80");
    assert_eq!(calc.formatted("prev + 1"), "81");
    assert_eq!(calc.formatted("sum"), "201");
    assert_eq!(calc.error("missing + 1"), ErrorKind::UnknownVariable);
    assert_eq!(calc.context.history_count(), 4);

    calc.context.clear_variables();
    assert_eq!(calc.error("price * 2"), ErrorKind::UnknownVariable);
}

#[test]
fn test_percentages_and_scales() {
    let mut calc = Calculator::new();
    assert_eq!(calc.formatted("15% of 200"), "30");
    assert_eq!(calc.formatted("200 + 15%"), "230");
    assert_eq!(calc.formatted("2k + 500"), "2,500");
    assert_eq!(calc.formatted("3 million / 1000"), "3,000");
    assert_eq!(calc.formatted("17 mod 5"), "2");
}

#[test]
fn test_units_and_currencies() {
    let mut calc = Calculator::new();
    assert_eq!(calc.formatted("5 km to m"), "5,000 m");
    assert_eq!(calc.formatted("1 km + 500 m"), "1.5 km");
    assert_eq!(calc.formatted("100 C in F"), "212 F");
    assert_eq!(calc.formatted("2 hours as min"), "120 min");
    assert_eq!(calc.formatted("$5 + $2.5"), "$7.50");
    assert_eq!(calc.error("5 km + 3 kg"), ErrorKind::IncompatibleUnits);
    assert_eq!(calc.error("5 km to kg"), ErrorKind::IncompatibleUnits);
    assert_eq!(calc.error("10 USD to EUR"), ErrorKind::MissingRate);

    let rates = r#"{"date": "2025-03-01", "usd": {"eur": 0.5, "gbp": 0.25}}"#;
    calc.context
        .set_rates(numby::units::currency::CurrencyRateSet::from_json(rates).unwrap());
    assert_eq!(calc.formatted("10 USD to EUR"), "€5.00");
    assert_eq!(calc.formatted("€4 to GBP"), "£2.00");
}

#[test]
fn test_failures_do_not_touch_context() {
    let mut calc = Calculator::new();
    calc.eval("x = 2").unwrap();
    for input in ["5 / 0", "x = 1 / 0", "(1 + 2", "sqrt(-4)", "prev +", "sin(2 km)"] {
        assert!(calc.eval(input).is_err(), "{}", input);
    }
    assert_eq!(calc.context.history_count(), 1);
    assert_eq!(calc.context.variable("x"), Some(&Value::number(2.0)));
}

#[test]
fn test_variable_shadowing_a_constant_goes_through_variable_agent() {
    let mut calc = Calculator::new();
    assert_eq!(calc.eval("pi").unwrap().agent, AgentKind::Math);
    calc.eval("pi = 3").unwrap();
    let evaluation = calc.eval("pi").unwrap();
    assert_eq!(evaluation.agent, AgentKind::Variable);
    assert_eq!(evaluation.value, Value::number(3.0));
}

#[test]
fn test_evaluation_serializes_without_agent() {
    let mut calc = Calculator::new();
    let evaluation = calc.eval("3 kg").unwrap();
    let json = serde_json::to_value(&evaluation).unwrap();
    assert_eq!(json["formatted"], "3 kg");
    assert_eq!(json["unit_label"], "kg");
    assert!(json.get("agent").is_none());
    assert_eq!(evaluation.value.kind, ValueKind::Unit("kg".to_string()));
}

fn same_category_pair() -> impl Strategy<Value = (&'static str, &'static str)> {
    let groups: Vec<Vec<&'static str>> = vec![
        vec!["m", "mm", "cm", "km", "in", "ft", "yd", "mi"],
        vec!["g", "mg", "kg", "oz", "lb"],
        vec!["s", "min", "h", "day", "week"],
        vec!["K", "C", "F"],
        vec!["bit", "B", "KB", "MiB"],
        vec!["l", "ml", "gal", "cup"],
    ];
    prop::sample::select(groups).prop_flat_map(|group| {
        (
            prop::sample::select(group.clone()),
            prop::sample::select(group),
        )
    })
}

proptest! {
    #[test]
    fn test_conversion_round_trip((from, to) in same_category_pair(), amount in -1.0e6f64..1.0e6) {
        let units = UnitTable::builtin();
        let there = units.convert(amount, from, to).unwrap();
        let back = units.convert(there, to, from).unwrap();
        let tolerance = 1e-9 * amount.abs().max(1.0);
        prop_assert!((back - amount).abs() <= tolerance, "{} {} -> {} {} -> {}", amount, from, there, to, back);
    }

    #[test]
    fn test_precedence_matches_integer_arithmetic(a in 0i64..1000, b in 0i64..1000, c in 1i64..1000) {
        let mut calc = Calculator::new();
        let sum_product = calc.eval(&format!("{} + {} * {}", a, b, c)).unwrap();
        prop_assert_eq!(sum_product.value.amount, (a + b * c) as f64);
        let left_assoc = calc.eval(&format!("{} - {} - {}", a, b, c)).unwrap();
        prop_assert_eq!(left_assoc.value.amount, (a - b - c) as f64);
        let grouped = calc.eval(&format!("({} + {}) * {}", a, b, c)).unwrap();
        prop_assert_eq!(grouped.value.amount, ((a + b) * c) as f64);
    }

    #[test]
    fn test_division_by_zero_never_yields_infinity(a in -1.0e9f64..1.0e9) {
        let mut calc = Calculator::new();
        let error = calc.eval(&format!("{} / 0", a)).unwrap_err();
        prop_assert_eq!(error.kind(), ErrorKind::DivisionByZero);
        prop_assert_eq!(calc.context.history_count(), 0);
    }
}
