use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use maskkit::{
    backend_config, editor_config, init_logging, session_request, ApplyOutcome, BackendClient,
    Config, EventBus, HttpLabelStore, HttpSegmentationClient, HttpSessionProvider, ImageInfo,
    LabelBackend, LabelStore, SessionProvider, SettingsPersistence, Workstation,
    YoloSegLabelStore, BUILD_DATE, VERSION,
};

/// Per-image result of the labelling pass
#[derive(Debug, Default)]
struct BatchSummary {
    labelled: usize,
    empty: usize,
    failed: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("MaskKit {} (built {})", VERSION, BUILD_DATE);

    let settings = match std::env::args_os().nth(1) {
        Some(path) => SettingsPersistence::load_or_default(PathBuf::from(path)),
        None => SettingsPersistence::load_default(),
    }
    .context("failed to load configuration")?;
    tracing::info!("Using configuration at {}", settings.path().display());

    let config = settings.into_config();
    if !config.dataset.is_configured() {
        anyhow::bail!("no dataset configured: set dataset.path and dataset.classes");
    }

    let summary = run(&config).await?;
    tracing::info!(
        "Labelling finished: {} labelled, {} without results, {} failed",
        summary.labelled,
        summary.empty,
        summary.failed
    );
    Ok(())
}

async fn run(config: &Config) -> anyhow::Result<BatchSummary> {
    let client = BackendClient::new(&backend_config(config))
        .context("failed to build backend client")?;

    let provider = HttpSessionProvider::new(client.clone());
    let session = provider
        .init_session(&session_request(config))
        .await
        .with_context(|| format!("failed to open dataset {}", config.dataset.path.display()))?;
    tracing::info!(
        "Session {} opened with {} images",
        session.session_id,
        session.images.len()
    );

    let labels: Arc<dyn LabelStore> = match config.labels.backend {
        LabelBackend::Remote => Arc::new(HttpLabelStore::new(client.clone(), &session.session_id)),
        LabelBackend::Local => Arc::new(YoloSegLabelStore::new(
            &config.dataset.path,
            &config.dataset.labels_subfolder,
        )),
    };
    let oracle = Arc::new(HttpSegmentationClient::new(client, &session.session_id));

    let pending: Vec<ImageInfo> = session
        .images
        .iter()
        .filter(|image| !image.has_labels)
        .cloned()
        .collect();
    let classes = session.classes.clone();

    let mut workstation = Workstation::new(
        editor_config(config),
        oracle,
        labels,
        Arc::new(EventBus::new()),
    );
    workstation
        .set_session(session)
        .context("session rejected by the editor")?;

    let mut summary = BatchSummary::default();
    for image in &pending {
        match label_image(&mut workstation, image, &classes).await {
            Ok(0) => {
                tracing::info!("{}: no objects found", image.filename);
                summary.empty += 1;
            }
            Ok(count) => {
                tracing::info!("{}: saved {} objects", image.filename, count);
                summary.labelled += 1;
            }
            Err(e) => {
                tracing::error!("{}: {:#}", image.filename, e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Runs one text prompt per class on `image` and saves whatever was found.
async fn label_image(
    workstation: &mut Workstation,
    image: &ImageInfo,
    classes: &[String],
) -> anyhow::Result<usize> {
    workstation
        .switch_image(&image.id, image.size())
        .await
        .with_context(|| format!("failed to activate image {}", image.id))?;

    let mut created = 0;
    for (index, class) in classes.iter().enumerate() {
        workstation.store().write().set_current_class(index);
        match workstation.text_prompt(class).await {
            Ok(ApplyOutcome::Applied { ids }) => created += ids.len(),
            Ok(outcome) => tracing::debug!("Prompt '{}' not applied: {:?}", class, outcome),
            Err(e) => tracing::warn!("Prompt '{}' failed on {}: {}", class, image.filename, e),
        }
    }

    if created == 0 {
        return Ok(0);
    }

    let outcome = workstation
        .save()
        .await
        .with_context(|| format!("failed to save labels for {}", image.id))?;
    Ok(outcome.objects_saved)
}
