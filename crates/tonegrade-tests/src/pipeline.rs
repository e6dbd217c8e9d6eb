//! Integration tests for the apply → preview-update path.

use std::sync::Arc;
use tonegrade_color::{apply_color_balance, luminance, GlobalParameters, ToneAdjustment};
use tonegrade_core::{ImageBuffer, Result, TonegradeError};
use tonegrade_preview::{
    downscale, LatestRequests, PreviewCache, PreviewConfig, PreviewEncoder, PreviewRequest,
    PreviewService,
};

struct DimensionsEncoder;

impl PreviewEncoder for DimensionsEncoder {
    fn encode(&self, image: &ImageBuffer) -> Result<String> {
        Ok(format!("{}x{}", image.width(), image.height()))
    }
}

fn service() -> PreviewService {
    let config = PreviewConfig::default();
    PreviewService::new(PreviewCache::new(&config).shared(), &config)
}

fn warm_shadows() -> ToneAdjustment {
    ToneAdjustment::new([0.4, 0.1, -0.2], [0.0; 3], [0.0, 0.0, 0.1])
}

#[test]
fn apply_then_preview_matches_grading_the_downscaled_source() {
    let service = service();
    let source = ImageBuffer::gradient(1024, 768);
    let tones = warm_shadows();
    let params = GlobalParameters::default();

    let outcome = service.apply(&source, Some("W1"), "5", &tones, &params);
    assert!(outcome.is_applied());
    assert_eq!(outcome.message(), "Color balance applied!");
    assert_eq!(outcome.key(), Some("colorbalance_W1_5"));
    assert_eq!(
        outcome.image(),
        &apply_color_balance(&source, &tones, true, 1.0)
    );

    let preview = service
        .render_preview("colorbalance_W1_5", &tones, &params)
        .unwrap();
    assert_eq!((preview.width(), preview.height()), (512, 384));

    let expected = apply_color_balance(&downscale(&source, 512, 512).unwrap(), &tones, true, 1.0);
    assert_eq!(preview, expected);
}

#[test]
fn preview_uses_new_tones_against_the_cached_source() {
    let service = service();
    let source = ImageBuffer::filled(64, 64, [0.2, 0.2, 0.2]);
    let first = warm_shadows();
    service.apply(&source, Some("W1"), "5", &first, &GlobalParameters::default());

    // Slider moved: the preview regrades the original, not the graded output.
    let second = ToneAdjustment::NEUTRAL;
    let preview = service
        .render_preview("colorbalance_W1_5", &second, &GlobalParameters::default())
        .unwrap();
    assert!(preview
        .pixels()
        .iter()
        .flatten()
        .all(|c| (c - 0.2).abs() < 1e-6));
}

#[test]
fn previews_do_not_touch_the_cache() {
    let service = service();
    let source = ImageBuffer::gradient(32, 32);
    let params = GlobalParameters::default();
    service.apply(&source, None, "1", &warm_shadows(), &params);
    let before = service.cache().keys();

    for strength in [0.5, 1.0, 2.0] {
        service
            .render_preview(
                "colorbalance_unknown_1",
                &warm_shadows(),
                &GlobalParameters::new(true, strength),
            )
            .unwrap();
    }

    assert_eq!(service.cache().keys(), before);
    assert_eq!(*service.cache().get("colorbalance_unknown_1").unwrap(), source);
}

#[test]
fn preserve_luminosity_holds_mean_luminance_on_midtones() {
    let service = service();
    let source = ImageBuffer::filled(16, 16, [0.5, 0.5, 0.5]);
    let tones = ToneAdjustment::new([0.0; 3], [0.3, -0.2, 0.1], [0.0; 3]);

    let preserved = service
        .apply(&source, Some("W1"), "2", &tones, &GlobalParameters::new(true, 1.0))
        .into_image();
    let free = service
        .apply(&source, Some("W1"), "2", &tones, &GlobalParameters::new(false, 1.0))
        .into_image();

    let lum = |img: &ImageBuffer| luminance(img.pixel(3, 3));
    assert!((lum(&preserved) - 0.5).abs() < 1e-5);
    assert!((lum(&free) - 0.5).abs() > 1e-3);
}

#[test]
fn failed_apply_passes_input_through_and_keeps_preview_available() {
    let service = service();
    let source = ImageBuffer::gradient(40, 20);
    let outcome = service.apply(
        &source,
        Some("W1"),
        "9",
        &warm_shadows(),
        &GlobalParameters::new(true, f32::NAN),
    );

    assert!(!outcome.is_applied());
    assert!(outcome
        .message()
        .starts_with("Failed to apply color balance: "));
    assert!(matches!(outcome.error(), Some(TonegradeError::Validation(_))));
    assert_eq!(outcome.image(), &source);

    let key = outcome.key().unwrap();
    let preview = service
        .render_preview(key, &warm_shadows(), &GlobalParameters::default())
        .unwrap();
    assert_eq!((preview.width(), preview.height()), (512, 256));
}

#[test]
fn batched_sources_preview_every_image() {
    let service = service();
    let mut pixels = ImageBuffer::filled(100, 50, [0.1, 0.2, 0.3]).pixels().to_vec();
    pixels.extend(ImageBuffer::filled(100, 50, [0.7, 0.6, 0.5]).pixels());
    let source = ImageBuffer::from_batch(2, 100, 50, pixels).unwrap();

    let (tones, params) = (ToneAdjustment::NEUTRAL, GlobalParameters::default());
    service.apply(&source, Some("W1"), "3", &tones, &params);
    let preview = service
        .render_preview("colorbalance_W1_3", &tones, &params)
        .unwrap();

    assert_eq!(preview.batch_len(), 2);
    assert_eq!((preview.width(), preview.height()), (512, 256));
    for (got, want) in [
        (preview.image(0).unwrap()[0], [0.1, 0.2, 0.3]),
        (preview.image(1).unwrap()[0], [0.7, 0.6, 0.5]),
    ] {
        for c in 0..3 {
            assert!((got[c] - want[c]).abs() < 1e-5);
        }
    }
}

#[test]
fn only_the_latest_tick_is_delivered() {
    let service = Arc::new(service());
    let source = ImageBuffer::gradient(256, 256);
    let params = GlobalParameters::default();
    let key = service
        .apply(&source, Some("W1"), "5", &ToneAdjustment::NEUTRAL, &params)
        .key()
        .unwrap()
        .to_string();

    let latest = LatestRequests::new();
    let tickets: Vec<_> = (0..5).map(|_| latest.issue(&key)).collect();

    let delivered: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = tickets
            .iter()
            .enumerate()
            .map(|(i, ticket)| {
                let service = Arc::clone(&service);
                let key = key.clone();
                let latest = &latest;
                s.spawn(move || {
                    let mut tones = ToneAdjustment::NEUTRAL;
                    tones.midtones[0] = i as f32 * 0.1;
                    let request = PreviewRequest::new(key, tones, GlobalParameters::default());
                    let response = service.render_encoded(&request, &DimensionsEncoder);
                    latest.is_current(ticket).then_some((i, response))
                })
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect()
    });

    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, 4);
    assert!(delivered[0].1.is_success());
}
