use std::sync::Arc;

use launch_studio::config::Config;
use launch_studio::pipeline::PhaseExecutor;
use launch_studio::utils::text::char_len;

use super::support::{FixedMedia, ScriptedBackend, launch_brief};

#[tokio::test]
async fn regeneration_replaces_only_media_urls() {
    let config = Config::default();
    let plain = PhaseExecutor::new(Arc::new(ScriptedBackend::default()), &config);
    let package = plain.run(&launch_brief(), false, None).await.unwrap();

    let media = Arc::new(FixedMedia::new(Some("poster.png"), Some("video.mp4")));
    let executor = PhaseExecutor::new(Arc::new(ScriptedBackend::default()), &config)
        .with_media(media.clone(), &config);
    let assets = executor.regenerate_assets(&package).await;

    assert_eq!(assets.poster_image_url.as_deref(), Some("poster.png"));
    assert_eq!(assets.video_url.as_deref(), Some("video.mp4"));
    assert_eq!(assets.poster_headline, package.marketing_assets.poster_headline);
    assert_eq!(assets.product_copy, package.marketing_assets.product_copy);
    assert!(char_len(&assets.video_script) <= 56);

    let images = media.images.lock().unwrap();
    assert_eq!(images[0].keywords, vec!["진정", "저자극", "빠른흡수", "비건"]);
    assert_eq!(images[0].headline, "예민한 날에도 편안하게");
}

#[tokio::test]
async fn regeneration_without_media_keeps_previous_urls() {
    let config = Config::default();
    let media = Arc::new(FixedMedia::new(Some("poster.png"), Some("video.mp4")));
    let executor = PhaseExecutor::new(Arc::new(ScriptedBackend::default()), &config)
        .with_media(media, &config);
    let package = executor.run(&launch_brief(), true, None).await.unwrap();

    let plain = PhaseExecutor::new(Arc::new(ScriptedBackend::default()), &config);
    let assets = plain.regenerate_assets(&package).await;

    assert_eq!(assets.poster_image_url.as_deref(), Some("poster.png"));
    assert_eq!(assets.video_url.as_deref(), Some("video.mp4"));
}
