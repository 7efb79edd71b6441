//! Criterion benchmarks for projections_core
//!
//! Run with: cargo bench -p projections_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jiff::civil::date;
use projections_core::config::{
    BankAccountInput, CreditCardInput, FlagsInput, IncomeInput, InvestmentAccountInput, LoanInput,
    PersonInput, ProjectionInput, SpendingInput,
};
use projections_core::model::{BankKind, InvestmentKind, ShadowKey, SpendingKind};
use projections_core::run_projections_from;
use projections_core::util::RatePeriod;

fn create_basic_input(years: i16) -> ProjectionInput {
    ProjectionInput {
        user: PersonInput {
            date_of_birth: Some(date(1990, 6, 15)),
            incomes: vec![IncomeInput {
                shadow_key: Some(ShadowKey::from("job")),
                amount: 96_000.0,
                rate: RatePeriod::Annually,
                ..IncomeInput::default()
            }],
            spendings: vec![SpendingInput {
                amount: 3_000.0,
                rate: RatePeriod::Monthly,
                ..SpendingInput::default()
            }],
            bank_accounts: vec![BankAccountInput {
                kind: BankKind::Checking,
                balance: 20_000.0,
                ..BankAccountInput::default()
            }],
            ..PersonInput::default()
        },
        flags: FlagsInput { years: Some(years), ..FlagsInput::default() },
        start_date: Some(date(2025, 1, 1)),
        ..ProjectionInput::default()
    }
}

fn create_full_household_input(years: i16) -> ProjectionInput {
    let mut input = create_basic_input(years);

    input.user.spendings.push(SpendingInput {
        kind: SpendingKind::Medical,
        amount: 200.0,
        rate: RatePeriod::Monthly,
        ..SpendingInput::default()
    });
    input.user.bank_accounts.push(BankAccountInput {
        kind: BankKind::Savings,
        balance: 15_000.0,
        interest_rate: 4.0,
        ..BankAccountInput::default()
    });
    input.user.investment_accounts = vec![
        InvestmentAccountInput {
            kind: InvestmentKind::Plan401k,
            balance: 40_000.0,
            plan_income_key: Some(ShadowKey::from("job")),
            plan_contribution_amount: 800.0,
            plan_employer_match_amount: 400.0,
            ..InvestmentAccountInput::default()
        },
        InvestmentAccountInput {
            kind: InvestmentKind::RothIra,
            balance: 12_000.0,
            contributing_max_allowed: true,
            ..InvestmentAccountInput::default()
        },
        InvestmentAccountInput {
            kind: InvestmentKind::Brokerage,
            balance: 25_000.0,
            ..InvestmentAccountInput::default()
        },
    ];
    input.user.loans = vec![LoanInput {
        principal: 200_000.0,
        interest_rate: 5.5,
        term_in_months: 360,
        ..LoanInput::default()
    }];
    input.user.credit = vec![CreditCardInput {
        balance: 4_000.0,
        apr: 22.0,
        credit_limit: 12_000.0,
        ..CreditCardInput::default()
    }];
    input.spouse = Some(PersonInput {
        date_of_birth: Some(date(1991, 2, 3)),
        incomes: vec![IncomeInput {
            amount: 60_000.0,
            rate: RatePeriod::Annually,
            ..IncomeInput::default()
        }],
        ..PersonInput::default()
    });
    input.flags.percent_surplus_to_invest = 50.0;

    input
}

fn bench_basic_projection(c: &mut Criterion) {
    let input = create_basic_input(30);

    c.bench_function("basic_30yr_projection", |b| {
        b.iter(|| run_projections_from(black_box(&input), date(2025, 1, 1)))
    });
}

fn bench_full_household(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_household");

    for years in [10, 30, 50].iter() {
        let input = create_full_household_input(*years);

        group.bench_with_input(BenchmarkId::new("years", years), years, |b, _| {
            b.iter(|| run_projections_from(black_box(&input), date(2025, 1, 1)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_basic_projection, bench_full_household);
criterion_main!(benches);
