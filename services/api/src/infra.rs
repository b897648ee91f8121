use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use uw_triage::config::MailConfig;
use uw_triage::workflows::dataset::PropertyDataset;
use uw_triage::workflows::notify::NotificationDispatcher;
use uw_triage::workflows::triage::{TriageRepository, TriageService};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_service<R>(
    repository: Arc<R>,
    csv_path: Option<PathBuf>,
    mail: &MailConfig,
) -> Arc<TriageService<R>>
where
    R: TriageRepository + 'static,
{
    let dataset = PropertyDataset::new(csv_path);
    let notifier = NotificationDispatcher::from_config(mail);
    Arc::new(TriageService::new(repository, dataset, notifier))
}
