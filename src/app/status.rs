use crate::config::Config;
use crate::dialogue::{FieldPath, GateStatus};

pub fn render_config(config: &Config) -> String {
    let dialogue = &config.dialogue;
    let pipeline = &config.pipeline;
    let media = &config.media;
    [
        "◆ launch-studio".to_string(),
        String::new(),
        format!("Version     {}", env!("CARGO_PKG_VERSION")),
        format!("Config      {}", config.config_path.display()),
        String::new(),
        "Dialogue".to_string(),
        format!(
            "  Relaxed gate     {} (threshold {:.3})",
            on_off(dialogue.relaxed_ready_enabled),
            dialogue.relaxed_ready_threshold
        ),
        format!("  Extractor        {}s timeout", dialogue.extractor_timeout_secs),
        format!("  History turns    {}", dialogue.history_turns),
        format!(
            "  Reply tone       {}",
            dialogue
                .tone
                .map_or_else(|| "plain".to_string(), |tone| tone.to_string())
        ),
        String::new(),
        "Pipeline".to_string(),
        format!("  Phase timeout    {}s", pipeline.phase_timeout_secs),
        format!("  Max risks        {}", pipeline.max_risks),
        format!("  Budget           {} KRW", pipeline.default_budget_krw),
        format!("  Launch lead      {} days", pipeline.launch_lead_days),
        format!("  Region           {}", pipeline.region),
        format!("  Video length     {}s", pipeline.default_video_seconds),
        String::new(),
        "Media".to_string(),
        format!("  Video models     {}", media.video_models.join(", ")),
        format!("  Video sizes      {}", media.video_sizes.join(", ")),
        format!("  Keyframe         {}", on_off(media.keyframe_fallback)),
        format!("  Long edge cap    {}", media.max_long_edge),
        String::new(),
        format!("Log level   {}", config.observability.log_level),
    ]
    .join("\n")
}

pub fn render_gate(gate: &GateStatus) -> String {
    let mut lines = vec![
        format!(
            "Ready         {}",
            if gate.ready { "✓ yes" } else { "✗ no" }
        ),
        format!("Completeness  {:.3}", gate.completeness),
    ];
    if !gate.missing_required.is_empty() {
        lines.push("Missing".to_string());
        lines.extend(gate.missing_required.iter().map(missing_line));
    }
    lines.join("\n")
}

fn missing_line(path: &FieldPath) -> String {
    format!("  - {path}")
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}
