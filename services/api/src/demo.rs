//! CLI demo: runs the aggregation engine over the bundled fixture dataset
//! and prints the regional and country views, so the methodology can be
//! inspected without standing up the HTTP service.

use std::sync::Arc;

use chrono::{Datelike, Local};
use clap::Args;
use trust_atlas::engine::{
    parse_pillar_ref, SubPillar, TrustMetricsService,
};
use trust_atlas::error::AppError;

use crate::infra::seed_store;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Pillar to summarize (current or legacy name)
    #[arg(long, default_value = "institutions")]
    pub(crate) pillar: String,
    /// Country to print in detail
    #[arg(long, default_value = "USA")]
    pub(crate) country: String,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(seed_store().map_err(|err| {
        AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })?);
    let service = TrustMetricsService::new(store, Local::now().year());

    let selector = match parse_pillar_ref(&args.pillar) {
        Ok(selector) => selector,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    println!("== Regional summary: {} ==", args.pillar);
    match service.regional_summary(selector) {
        Ok(summaries) => {
            for summary in summaries {
                println!(
                    "{:<10} countries={:<3} avg={:<6} min={:<6} max={:<6}",
                    summary.region,
                    summary.country_count,
                    summary.avg_score,
                    summary.min_score,
                    summary.max_score
                );
                if let Some(breakdown) = summary.institutions {
                    println!(
                        "           trust={:?} quality={:?} gap={:?}",
                        breakdown.avg_institutional_trust,
                        breakdown.avg_governance_quality,
                        breakdown.avg_trust_quality_gap
                    );
                }
            }
        }
        Err(err) => eprintln!("regional summary failed: {err}"),
    }

    println!("\n== Country detail: {} ==", args.country);
    match service.country_detail(&args.country, None, None) {
        Ok(detail) => {
            println!("{} ({:?})", detail.country.name, detail.country.region);
            for record in &detail.years {
                print!("{}:", record.year);
                for metric in SubPillar::ALL {
                    if let Some(score) = record.score(metric) {
                        let tier = record
                            .metric(metric)
                            .and_then(|cell| cell.confidence_tier)
                            .map(|tier| format!("{tier:?}"))
                            .unwrap_or_default();
                        print!(" {metric}={score} ({tier})");
                    }
                }
                if let (Some(gap), Some(assessment)) =
                    (record.trust_quality_gap, record.gap_assessment)
                {
                    print!(" gap={gap} [{assessment:?}]");
                }
                println!();
            }
        }
        Err(err) => eprintln!("country detail failed: {err}"),
    }

    Ok(())
}
