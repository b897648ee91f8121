use crate::infra::build_service;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use uw_triage::config::MailConfig;
use uw_triage::error::AppError;
use uw_triage::workflows::dataset::PropertyDataset;
use uw_triage::workflows::triage::{NewSubmission, PropensityTier, ResultsView, SqliteTriageStore};

#[derive(Args, Debug, Default)]
pub(crate) struct PropertiesArgs {
    /// Property sheet to merge over the static catalog
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Underwriter name recorded on the demo submissions
    #[arg(long, default_value = "Demo Underwriter")]
    pub(crate) name: String,
    /// Property sheet to merge over the static catalog
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

pub(crate) fn print_properties(args: PropertiesArgs) -> Result<(), AppError> {
    let properties = PropertyDataset::new(args.csv).properties();
    println!("{}", serde_json::to_string_pretty(&properties)?);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = SqliteTriageStore::in_memory().await?;
    let service = build_service(Arc::new(store), args.csv, &MailConfig::default());

    println!("Underwriting triage demo");
    let properties = service.properties();
    let tiers = service.tiers();
    for property in &properties {
        println!(
            "  {} {:<10} {:<22} {}",
            property.letter,
            property.submission_id,
            property.property_county,
            property.broker_company
        );
    }

    // One submission that follows the tiers, one that inverts them.
    let aligned = NewSubmission {
        underwriter_name: args.name.clone(),
        prioritized_ids: tiers
            .get(&PropensityTier::High)
            .cloned()
            .unwrap_or_default(),
        discarded_ids: tiers.get(&PropensityTier::Low).cloned().unwrap_or_default(),
    };
    let inverted = NewSubmission {
        underwriter_name: format!("{} (contrarian)", args.name),
        prioritized_ids: aligned.discarded_ids.clone(),
        discarded_ids: aligned.prioritized_ids.clone(),
    };

    for submission in [aligned, inverted] {
        let created = service.create_submission(submission).await?;
        let summary = service.process(created.id).await?;
        println!(
            "\nSubmission {} by {}: processed {} properties",
            created.id, created.underwriter_name, summary.count
        );

        let view = service.results(created.id).await?;
        render_results(&view);
    }

    println!("\nLeaderboard");
    for entry in service.leaderboard().await? {
        println!(
            "  #{} {:<32} {:>5.1}%",
            entry.rank, entry.underwriter_name, entry.score_percentage
        );
    }

    Ok(())
}

fn render_results(view: &ResultsView) {
    println!(
        "  score {:.1}% ({:?} predictions)",
        view.score_percentage, view.prediction_source
    );
    for row in &view.results {
        let selection = row
            .user_selection
            .map(|selection| selection.label())
            .unwrap_or("-");
        println!(
            "  {} {:<10} {:<16} risk {:.2} propensity {:.2} [{}]",
            row.letter,
            row.submission_id,
            row.propensity_label,
            row.total_risk_score,
            row.quote_propensity,
            selection
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_runs_against_static_catalog() {
        let args = DemoArgs {
            name: "Casey".to_string(),
            csv: None,
        };
        run_demo(args).await.expect("demo completes");
    }

    #[test]
    fn properties_print_without_a_sheet() {
        print_properties(PropertiesArgs::default()).expect("properties print");
    }
}
