use anyhow::Result;
use canvas::{RenderPolicy, SceneSetup};
use sceneconfig::{SceneConfig, SceneKind};
use serde::Serialize;

use crate::run::scene_setup;

/// Effective tuning of one scene, as printed by `cloudhigh scenes`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SceneSummary {
    pub name: String,
    pub policy: &'static str,
    pub default: bool,
    pub dpr_cap: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro_easing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_span: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_pages: Option<f32>,
}

pub fn describe(config: &SceneConfig) -> Result<Vec<SceneSummary>> {
    [SceneKind::Prism, SceneKind::Shade]
        .into_iter()
        .map(|scene| -> Result<SceneSummary> {
            let setup = scene_setup(config, scene, None)?;
            let driver = setup.driver();
            let policy = match driver.policy() {
                RenderPolicy::Continuous => "continuous",
                RenderPolicy::OnDemand => "on-demand",
            };
            let mut summary = SceneSummary {
                name: scene.to_string(),
                policy,
                default: config.default_scene() == scene,
                dpr_cap: driver.dpr_cap(),
                intro_ms: None,
                intro_easing: None,
                time_span: None,
                scroll_pages: None,
            };
            if let SceneSetup::Shade(settings) = setup {
                summary.intro_ms = Some(settings.intro_duration.as_millis() as u64);
                summary.intro_easing = Some(config.shade.intro_easing.clone());
                summary.time_span = Some(settings.time_span);
                summary.scroll_pages = Some(settings.scroll_pages);
            }
            Ok(summary)
        })
        .collect()
}

pub fn print(config: &SceneConfig, json: bool) -> Result<()> {
    let summaries = describe(config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("Scenes:");
    for summary in summaries {
        let marker = if summary.default { "*" } else { " " };
        print!(
            " {marker} {:<6} policy={:<10} dpr_cap={}",
            summary.name, summary.policy, summary.dpr_cap
        );
        if let (Some(intro_ms), Some(easing)) = (summary.intro_ms, &summary.intro_easing) {
            print!(" intro={intro_ms}ms/{easing}");
        }
        if let (Some(span), Some(pages)) = (summary.time_span, summary.scroll_pages) {
            print!(" time_span={span} scroll_pages={pages}");
        }
        println!();
    }
    Ok(())
}
