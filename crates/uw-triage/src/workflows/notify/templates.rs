use chrono::NaiveDate;

use crate::workflows::dataset::Property;
use crate::workflows::triage::PropensityTier;

use super::LetterKind;

/// Rendered subject plus plain-text and HTML bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rendered {
    pub(crate) subject: String,
    pub(crate) plain: String,
    pub(crate) html: String,
}

pub(crate) fn display_date(day: NaiveDate) -> String {
    day.format("%b %d, %Y").to_string()
}

fn badge_color(tier: PropensityTier) -> &'static str {
    match tier {
        PropensityTier::High => "#16a34a",
        PropensityTier::Mid => "#d97706",
        PropensityTier::Low => "#dc2626",
    }
}

pub(crate) fn triage_link(base_url: &str, tier: PropensityTier) -> String {
    format!(
        "{}/triage?propensity={}",
        base_url.trim_end_matches('/'),
        tier.as_str().to_ascii_lowercase()
    )
}

pub(crate) fn digest(
    tier: PropensityTier,
    submission_ids: &[String],
    day: NaiveDate,
    sender: &str,
    base_url: &str,
) -> Rendered {
    let tier_name = tier.as_str();
    let link = triage_link(base_url, tier);
    let ids = submission_ids.join(", ");
    let count = submission_ids.len();
    let color = badge_color(tier);

    let subject = format!("Submissions for {} – {tier_name} Propensity", display_date(day));

    let plain = format!(
        "Dear {tier_name} Propensity UWT Team,\n\n\
         The AI underwriting agent has identified {count} submission(s) classified as \
         {tier_name} Propensity that require your review.\n\n\
         Submission IDs: {ids}\n\n\
         Please review the details at:\n{link}\n\n\
         This email was sent automatically by the UWT AI Agent ({sender})."
    );

    let html = format!(
        r#"<html><body style="font-family:Arial,sans-serif;color:#111827;max-width:600px;margin:auto;padding:24px">
  <h2 style="color:{color}">UWT AI Agent: {tier_name} Propensity Triage</h2>
  <p>Dear <strong>{tier_name} Propensity UWT Team</strong>,</p>
  <p>The AI underwriting agent has identified <strong>{count} submission(s)</strong>
     classified as <strong>{tier_name} Propensity</strong> that require your review.</p>
  <p><strong>Submission IDs:</strong> {ids}</p>
  <p><a href="{link}" style="display:inline-block;background:{color};color:#fff;padding:10px 20px;border-radius:6px;text-decoration:none;font-weight:bold">Review {tier_name} Propensity Submissions</a></p>
  <hr style="border:none;border-top:1px solid #e5e7eb;margin:24px 0"/>
  <p style="font-size:12px;color:#6b7280">This email was sent automatically by the UWT AI Agent ({sender}).</p>
</body></html>"#
    );

    Rendered {
        subject,
        plain,
        html,
    }
}

pub(crate) fn broker_letter(
    kind: LetterKind,
    property: &Property,
    day: NaiveDate,
    sender: &str,
) -> Rendered {
    let code = &property.submission_id;
    let broker = &property.broker_company;
    let date = display_date(day);
    let summary = format!(
        "{} in {}, {} (building limit ${}, contents limit ${})",
        property.occupancy_type,
        property.property_county,
        property.state,
        property.building_coverage_limit,
        property.contents_coverage_limit,
    );

    let (subject, paragraph) = match kind {
        LetterKind::Intent => (
            format!("Intent to Quote: Submission {code}"),
            format!(
                "Thank you for submission {code}. After initial triage we intend to quote this \
                 risk and will follow up with terms shortly."
            ),
        ),
        LetterKind::NonInterest => (
            format!("Submission {code}: Not Proceeding"),
            format!(
                "Thank you for submission {code}. After initial triage we will not be offering \
                 terms on this risk at this time."
            ),
        ),
    };

    let plain = format!(
        "{date}\n\nDear {broker},\n\n{paragraph}\n\nRisk: {summary}\n\n\
         Regards,\nUWT AI Agent ({sender})"
    );
    let html = format!(
        r#"<html><body style="font-family:Arial,sans-serif;color:#111827;max-width:600px;margin:auto;padding:24px">
  <p style="color:#6b7280">{date}</p>
  <p>Dear <strong>{broker}</strong>,</p>
  <p>{paragraph}</p>
  <p><strong>Risk:</strong> {summary}</p>
  <p>Regards,<br/>UWT AI Agent ({sender})</p>
</body></html>"#
    );

    Rendered {
        subject,
        plain,
        html,
    }
}
