//! Page experience rules: field data and document weight

use super::{snippet, Issue, Recorder};
use crate::config::Thresholds;
use crate::content::EnrichedContent;
use crate::models::Severity;
use anyhow::Result;

pub(super) fn vitals_field_data(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let vitals = content.context.core_web_vitals.as_ref();
    let metrics = [
        ("LCP", vitals.and_then(|v| v.lcp_ms), t.lcp_ms, "ms"),
        ("INP", vitals.and_then(|v| v.inp_ms), t.inp_ms, "ms"),
        ("CLS", vitals.and_then(|v| v.cls), t.cls, ""),
    ];

    if metrics.iter().all(|(_, value, _, _)| value.is_none()) {
        rec.check("field data supplied", false, || {
            Issue::new(Severity::Info, "No Core Web Vitals field data was supplied")
                .fix("Pass CrUX or RUM measurements in the audit context")
        });
        return Ok(());
    }

    for (name, value, limit, unit) in metrics {
        let Some(value) = value else { continue };
        rec.check(format!("{} within limit", name), value <= limit, || {
            Issue::new(
                Severity::Medium,
                format!("{} is {}{}, limit is {}{}", name, value, unit, limit, unit),
            )
        });
    }
    Ok(())
}

pub(super) fn page_weight(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    let limit = t.max_html_kb.saturating_mul(1024);
    rec.check("html size", content.html_bytes <= limit, || {
        Issue::new(
            Severity::Medium,
            format!(
                "HTML document is {} KB, over the {} KB budget",
                content.html_bytes / 1024,
                t.max_html_kb
            ),
        )
        .fix("Move inline scripts, styles and data out of the document")
    });
    Ok(())
}

pub(super) fn render_blocking(
    content: &EnrichedContent,
    t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    rec.check(
        "blocking scripts",
        content.blocking_scripts <= t.max_blocking_scripts,
        || {
            Issue::new(
                Severity::Low,
                format!(
                    "{} external scripts block rendering (max {})",
                    content.blocking_scripts, t.max_blocking_scripts
                ),
            )
            .at("script[src]")
            .fix("Load scripts with async or defer")
        },
    );
    rec.check(
        "stylesheets",
        content.stylesheets <= t.max_stylesheets,
        || {
            Issue::new(
                Severity::Low,
                format!(
                    "{} stylesheets block rendering (max {})",
                    content.stylesheets, t.max_stylesheets
                ),
            )
            .at("link[rel=\"stylesheet\"]")
        },
    );
    Ok(())
}

pub(super) fn lazy_images(
    content: &EnrichedContent,
    _t: &Thresholds,
    rec: &mut Recorder,
) -> Result<()> {
    // The first image is likely the hero; lazy-loading it delays LCP
    for (i, image) in content.images.iter().enumerate().skip(1) {
        rec.check(format!("image {} lazy", i + 1), image.lazy, || {
            Issue::new(Severity::Low, "Below-the-fold image is not lazy-loaded")
                .at(format!("img[src=\"{}\"]", snippet(&image.src, 60)))
                .fix("Add loading=\"lazy\"")
        });
    }
    Ok(())
}
