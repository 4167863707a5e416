use std::collections::HashSet;

use metrics_util::debugging::DebuggingRecorder;
use storefront::application::sections::{
    FALLBACK_METRIC, RENDER_METRIC, SectionRegistry, SectionRenderError, resolve_sections,
};
use storefront::domain::sections::SectionDescriptor;
use storefront::infra::telemetry;

#[test]
fn composition_emits_render_and_fallback_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");
    telemetry::describe_metrics();

    let registry = SectionRegistry::builtin().with_renderer(
        "broken",
        |_: &SectionDescriptor| -> Result<String, SectionRenderError> {
            Err(SectionRenderError::custom("renderer exploded"))
        },
    );
    let sections = vec![
        SectionDescriptor::new("s1", "hero").with_field("title", "Hello"),
        SectionDescriptor::new("s2", "mystery"),
        SectionDescriptor::new("s3", "broken"),
    ];

    let composition = resolve_sections(Some(&sections), &registry);
    assert_eq!(composition.diagnostics.len(), 2);

    let entries = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = entries
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();
    for metric in [RENDER_METRIC, FALLBACK_METRIC] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }

    let reasons: HashSet<String> = entries
        .iter()
        .filter(|(composite_key, _, _, _)| composite_key.key().name() == FALLBACK_METRIC)
        .flat_map(|(composite_key, _, _, _)| {
            composite_key
                .key()
                .labels()
                .map(|label| label.value().to_string())
                .collect::<Vec<_>>()
        })
        .collect();
    assert!(reasons.contains("unknown_type"), "{reasons:?}");
    assert!(reasons.contains("render_failed"), "{reasons:?}");
}
