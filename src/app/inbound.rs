use super::App;
use crate::instances::ToggleReport;
use crate::llm::scrub_secret_patterns;
use crate::transport::commands::help_text;
use crate::transport::{BotCommand, InboundEvent};
use std::path::Path;

const OS_RELEASE: &str = "/etc/os-release";
const NOT_FOUND_NOTICE: &str = "One or more instances not found";
const MISSING_NAMES: &str = "Please supply instance names";

impl App {
    /// Turn one inbound text into the reply sent back to the recipient.
    pub async fn handle_inbound(&self, text: &str) -> String {
        match InboundEvent::parse(text) {
            InboundEvent::Command {
                command: BotCommand::Ec2,
                args,
            } => {
                if args.is_empty() {
                    return MISSING_NAMES.to_string();
                }
                let report = self.toggle(&args).await;
                render_toggle_report(&report)
            }
            InboundEvent::Command {
                command: BotCommand::Version,
                ..
            } => version_text(Path::new(OS_RELEASE)).await,
            InboundEvent::Unknown(name) => {
                tracing::debug!(command = %name, "unknown command");
                help_text()
            }
            InboundEvent::Message(text) => match self.chat(&text).await {
                Ok(reply) => reply,
                Err(error) => {
                    tracing::error!("chat exchange failed: {error:#}");
                    format!(
                        "Sorry, I could not get a reply: {}",
                        scrub_secret_patterns(&error.to_string())
                    )
                }
            },
        }
    }
}

pub fn render_toggle_report(report: &ToggleReport) -> String {
    let mut lines: Vec<String> = report
        .results
        .iter()
        .map(|(name, outcome)| format!("{name}: {outcome}"))
        .collect();
    if report.any_not_found() {
        lines.push(NOT_FOUND_NOTICE.to_string());
    }
    lines.join("\n")
}

pub async fn version_text(os_release: &Path) -> String {
    let os = tokio::fs::read_to_string(os_release)
        .await
        .ok()
        .and_then(|contents| pretty_name(&contents))
        .unwrap_or_else(|| std::env::consts::OS.to_string());
    format!(
        "OS: {os}\ndbot: {}\nTarget: {}-{}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH,
        std::env::consts::OS
    )
}

fn pretty_name(os_release: &str) -> Option<String> {
    os_release.lines().find_map(|line| {
        let value = line.trim().strip_prefix("PRETTY_NAME=")?;
        let value = value.trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}
