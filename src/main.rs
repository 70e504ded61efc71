use std::path::PathBuf;

use mapkit::document::{
    AddFeatures, AddLayer, AddLayoutPage, Color, Coordinate, Feature, Geometry, Layer, LayoutPage,
    Style, UpdateStyles,
};
use mapkit::{init_logging, AppEvent, Changeset, Config, EditorSession, EventFilter, HistoryKey};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // An explicit path wins over the platform config location
    let config_path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => Config::default_path()?,
    };
    let config = Config::load_or_default(&config_path)?;

    init_logging(&config.logging)?;
    tracing::info!("MapKit {} (config: {})", mapkit::VERSION, config_path.display());

    let session = EditorSession::new(config)?;
    session.bus().subscribe(EventFilter::All, |event| match event {
        AppEvent::History(event) => tracing::info!("{:?}", event),
        AppEvent::Notification(note) => tracing::warn!("{:?}: {}", note.level, note.message),
    });

    run_demo(&session).await?;
    session.shutdown().await;
    Ok(())
}

/// Draw a few features, restyle them, then walk the history back and forth.
async fn run_demo(session: &EditorSession) -> anyhow::Result<()> {
    let doc = session.document();
    let key = HistoryKey::MainMap;

    let layer = Layer::new("Survey points");
    let layer_id = layer.id;
    session
        .execute(key, AddLayer::new(doc, layer, None).boxed())
        .await?;

    let points: Vec<Feature> = (0..3)
        .map(|i| Feature::new(Geometry::Point(Coordinate::new(i as f64 * 10.0, 5.0))))
        .collect();
    let ids: Vec<_> = points.iter().map(|f| f.id).collect();
    session
        .execute(key, AddFeatures::new(doc, layer_id, points)?.boxed())
        .await?;

    let highlight = Style::filled(Color::from_hex("#e4572e")?).with_label("survey");
    session
        .execute(key, UpdateStyles::new(doc, &ids, highlight)?.boxed())
        .await?;

    session
        .execute(
            HistoryKey::Layout,
            AddLayoutPage::new(doc, LayoutPage::new("Overview"), None).boxed(),
        )
        .await?;

    session.undo(key).await?;
    let styled = doc
        .snapshot()
        .layers
        .iter()
        .flat_map(|l| &l.features)
        .filter(|f| f.style.is_some())
        .count();
    tracing::info!("After undo: {} styled feature(s)", styled);

    session.redo(key).await?;
    for key in HistoryKey::ALL {
        tracing::info!("{}: {}", key, session.capability(key));
    }

    Ok(())
}
