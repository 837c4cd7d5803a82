//! Pension Engine CLI
//!
//! Estimates one benefit scenario, or every modality for the same affiliate,
//! and prints a summary table or the full JSON result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use pension_engine::affiliate::{
    load_beneficiaries, CausantTerms, DisabilityDegree, DisabilityTerms, IncreasePercent,
};
use pension_engine::benefits::ScenarioResult;
use pension_engine::{
    BenefitCategory, Modality, Person, ScenarioParameters, ScenarioRequest, ScenarioRunner, Sex,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SexArg {
    M,
    F,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DegreeArg {
    Total,
    TwoThirds,
    Partial,
}

/// Unit of `--increase-pct`
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PercentUnit {
    /// 0.5 means 50%
    Fraction,
    /// 50 means 50%
    WholePercent,
    /// Values above 1 are whole percents, others fractions
    Legacy,
}

#[derive(Debug, Parser)]
#[command(name = "pension-engine", version, about = "Estimate pensions from an individually-funded balance")]
struct Cli {
    /// Benefit category: old_age, disability or survivorship
    #[arg(long, default_value = "old_age")]
    category: BenefitCategory,

    /// Payment modality tag, e.g. scheduled_withdrawal or immediate_annuity
    #[arg(long, default_value = "scheduled_withdrawal")]
    modality: Modality,

    /// Affiliate's age (the deceased's age for survivorship)
    #[arg(long)]
    age: u32,

    #[arg(long, value_enum)]
    sex: SexArg,

    /// Affiliate is a disabled life
    #[arg(long)]
    disabled: bool,

    /// Accumulated balance
    #[arg(long)]
    balance: f64,

    /// Annual technical interest rate as a fraction
    #[arg(long)]
    rate: f64,

    /// Value of one reference index unit
    #[arg(long, default_value_t = 37_000.0)]
    index_value: f64,

    #[arg(long, default_value_t = 0)]
    guaranteed_months: u32,

    #[arg(long)]
    increase_months: Option<u32>,

    #[arg(long)]
    increase_pct: Option<f64>,

    #[arg(long, value_enum, default_value_t = PercentUnit::WholePercent)]
    increase_unit: PercentUnit,

    /// Reference monthly income for disability claims
    #[arg(long)]
    income_base: Option<f64>,

    #[arg(long, value_enum, default_value_t = DegreeArg::Total)]
    degree: DegreeArg,

    /// Disability claim is not covered by insurance
    #[arg(long)]
    uninsured: bool,

    /// Deceased's pension, for survivorship
    #[arg(long)]
    causant_pension: Option<f64>,

    /// Deceased's income base, for survivorship
    #[arg(long)]
    causant_income: Option<f64>,

    /// Beneficiaries CSV (Relationship,Age,Sex,Disabled,AssignedShare)
    #[arg(long)]
    beneficiaries: Option<PathBuf>,

    /// Directory with mortality CSVs and optional statutory.json
    #[arg(long)]
    assumptions: Option<PathBuf>,

    /// Evaluate every modality for the category
    #[arg(long)]
    all_modalities: bool,

    /// Print full results as JSON
    #[arg(long)]
    json: bool,
}

fn build_request(cli: &Cli) -> Result<ScenarioRequest> {
    let sex = match cli.sex {
        SexArg::M => Sex::Male,
        SexArg::F => Sex::Female,
    };
    let affiliate = Person {
        age: cli.age,
        sex,
        is_disabled: cli.disabled,
    };

    let mut parameters = ScenarioParameters::new(cli.balance, cli.rate, cli.index_value)
        .with_guaranteed_months(cli.guaranteed_months);

    if let (Some(months), Some(value)) = (cli.increase_months, cli.increase_pct) {
        let percent = match cli.increase_unit {
            PercentUnit::Fraction => IncreasePercent::Fraction(value),
            PercentUnit::WholePercent => IncreasePercent::WholePercent(value),
            PercentUnit::Legacy => IncreasePercent::from_legacy(value),
        };
        parameters = parameters.with_increase(months, percent);
    }

    if let Some(income_base) = cli.income_base {
        let degree = match cli.degree {
            DegreeArg::Total => DisabilityDegree::Total,
            DegreeArg::TwoThirds => DisabilityDegree::TwoThirds,
            DegreeArg::Partial => DisabilityDegree::Partial,
        };
        parameters = parameters.with_disability(DisabilityTerms {
            income_base,
            degree,
            insured: !cli.uninsured,
        });
    }

    if cli.causant_pension.is_some() || cli.causant_income.is_some() {
        parameters = parameters.with_causant(CausantTerms {
            reference_pension: cli.causant_pension,
            income_base: cli.causant_income,
        });
    }

    let mut request = ScenarioRequest::new(cli.category, cli.modality, affiliate, parameters);
    if let Some(path) = &cli.beneficiaries {
        let beneficiaries = load_beneficiaries(path)
            .with_context(|| format!("failed to load beneficiaries from {}", path.display()))?;
        request = request.with_beneficiaries(beneficiaries);
    }

    Ok(request)
}

fn print_result(result: &ScenarioResult) {
    let summary = result.summary();

    println!("{}", summary.label);
    println!("{}", "-".repeat(summary.label.len()));
    println!("  Monthly benefit:       {:>14.0}", summary.monthly_benefit);
    println!("  In index units:        {:>14.2}", summary.benefit_in_index_units);
    println!("  Annual benefit:        {:>14.0}", summary.annual_benefit);
    println!("  Necessary unit capital:{:>14.4}", summary.necessary_unit_capital);
    println!("  Interest rate:         {:>14.4}", summary.interest_rate_used);
    println!("  Life expectancy:       {:>14.1}", summary.life_expectancy_years);

    match result {
        ScenarioResult::ImmediateAnnuity { premium_deducted, .. } => {
            println!("  Premium deducted:      {:>14.0}", premium_deducted);
        }
        ScenarioResult::GuaranteedPeriod {
            guaranteed_months,
            guaranteed_factor,
            ..
        } => {
            println!("  Guaranteed months:     {:>14}", guaranteed_months);
            println!("  Guaranteed factor:     {:>14.4}", guaranteed_factor);
        }
        ScenarioResult::TemporaryIncrease { increase, .. } => {
            println!("  Increase months:       {:>14}", increase.months);
            println!("  Increased amount:      {:>14.0}", increase.increased_amount);
            println!("  Steady-state amount:   {:>14.0}", increase.steady_state_amount);
            println!("  Adjustment factor:     {:>14.4}", increase.adjustment_factor);
        }
        ScenarioResult::Survivorship {
            reference_pension,
            reference_source,
            breakdown,
            adjustment_factor,
            increase,
            ..
        } => {
            println!("  Reference pension:     {:>14.0} ({:?})", reference_pension, reference_source);
            println!("  Adjustment factor:     {:>14.4}", adjustment_factor);
            if let Some(increase) = increase {
                println!("  Increase months:       {:>14}", increase.months);
                println!("  Steady-state amount:   {:>14.0}", increase.steady_state_amount);
            }
            for b in breakdown {
                println!(
                    "    {:<18} age {:>3}  share {:>6.4}  {:>12.0}",
                    b.relationship.as_str(),
                    b.age,
                    b.share,
                    b.monthly_amount
                );
            }
        }
        ScenarioResult::Unavailable { reason, .. } => {
            println!("  Unavailable:           {:?}", reason);
        }
        ScenarioResult::ScheduledWithdrawal { .. } => {}
    }

    if let Some(coverage) = result.disability() {
        println!("  Reference amount:      {:>14.0}", coverage.reference_amount);
        println!("  Self-funded amount:    {:>14.0}", coverage.self_funded_amount);
        println!("  Insurer shortfall:     {:>14.0}", coverage.shortfall);
    }

    for advisory in &summary.advisories {
        println!("  Note: {}", advisory);
    }

    if let Some(projection) = result.projection() {
        println!();
        println!(
            "{:>4} {:>4} {:>14} {:>16} {:>16} {:>10}",
            "Year", "Age", "Monthly", "Balance", "Cumulative", "Phase"
        );
        for point in projection.points.iter().take(10) {
            println!(
                "{:>4} {:>4} {:>14.0} {:>16.0} {:>16.0} {:>10}",
                point.year_index,
                point.age,
                point.monthly_benefit,
                point.remaining_balance,
                point.cumulative_withdrawn,
                format!("{:?}", point.phase)
            );
        }
        if projection.len() > 10 {
            println!("... ({} more years)", projection.len() - 10);
        }
        println!("  Total paid over {} years: {:.0}", projection.len(), projection.total_paid());
    }
    println!();
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let runner = match &cli.assumptions {
        Some(dir) => ScenarioRunner::from_csv_path(dir)
            .with_context(|| format!("failed to load assumptions from {}", dir.display()))?,
        None => ScenarioRunner::new(),
    };
    let request = build_request(&cli)?;

    if cli.all_modalities {
        let comparison = runner.compare_modalities(&request);
        if cli.json {
            let results: Vec<&ScenarioResult> =
                comparison.iter().filter_map(|(_, r)| r.as_ref().ok()).collect();
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        for (modality, result) in &comparison {
            match result {
                Ok(result) if !cli.json => print_result(result),
                Ok(_) => {}
                Err(e) => eprintln!("{}: {}", modality.label(), e),
            }
        }
        return Ok(());
    }

    let result = runner
        .run(&request)
        .with_context(|| format!("{} {} scenario failed", request.category, request.modality))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}
