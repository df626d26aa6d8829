//! Interactive line-based chat against a running relay.

use std::error::Error;
use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::cli::ClientArgs;
use crate::client::controller::{
    ChatDispatch, ControllerAction, ControllerCommand, ConversationController, TranscriptEntry,
};
use crate::client::ChatClient;
use crate::core::adapters::build_http_client;
use crate::core::config::Config;
use crate::core::models::ModelRegistry;
use crate::core::preset::PresetCatalog;

#[derive(Debug, PartialEq, Eq)]
pub enum ReplInput {
    Message(String),
    Model(Option<String>),
    Behaviour(Option<String>),
    Clear,
    Quit,
    Unknown(String),
    Empty,
}

pub fn parse_input(line: &str) -> ReplInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReplInput::Empty;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return ReplInput::Message(trimmed.to_string());
    };

    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());
    match name {
        "model" => ReplInput::Model(argument),
        "behaviour" | "behavior" => ReplInput::Behaviour(argument),
        "clear" => ReplInput::Clear,
        "quit" | "exit" => ReplInput::Quit,
        other => ReplInput::Unknown(other.to_string()),
    }
}

/// Runs one dispatched chat call and reports its result, unless the
/// request is cancelled first.
pub fn spawn_chat(
    client: ChatClient,
    dispatch: ChatDispatch,
    tx: mpsc::UnboundedSender<ControllerAction>,
) {
    tokio::spawn(async move {
        let result = tokio::select! {
            _ = dispatch.cancel_token.cancelled() => {
                debug!(request_id = dispatch.request_id, "Chat request cancelled");
                return;
            }
            result = client.send_chat(&dispatch.messages, &dispatch.behaviour, &dispatch.model) => result,
        };
        let _ = tx.send(ControllerAction::ReplyReceived {
            request_id: dispatch.request_id,
            result,
        });
    });
}

pub fn print_entry(entry: &TranscriptEntry) {
    println!("\nNero: {}", entry.message.content);
    if let Some(reason) = &entry.degraded {
        println!("      [{reason}]");
    }
    println!();
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

fn execute(
    commands: Vec<ControllerCommand>,
    client: &ChatClient,
    tx: &mpsc::UnboundedSender<ControllerAction>,
) {
    for command in commands {
        match command {
            ControllerCommand::SendChat(dispatch) => spawn_chat(client.clone(), dispatch, tx.clone()),
        }
    }
}

pub async fn run_chat(config: &Config, args: &ClientArgs) -> Result<(), Box<dyn Error>> {
    let registry = ModelRegistry::new(&config.models, &config.alternate_vendor_tokens());
    let presets = PresetCatalog::new(&config.presets, config.default_behaviour.as_deref());
    let client = ChatClient::new(build_http_client(config.request_timeout())?, args.server_url(config));

    let behaviour = args
        .behaviour
        .clone()
        .unwrap_or_else(|| presets.default_preset().id.clone());
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.default_model().to_string());
    let mut controller = ConversationController::new(behaviour, model, registry.clone());

    let (tx, mut rx) = mpsc::unbounded_channel();
    {
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.health().await;
            let _ = tx.send(ControllerAction::HealthChecked { result });
        });
    }

    println!("💬 Nero chat · relay {}", client.base_url());
    println!(
        "   behaviour: {} · model: {}",
        controller.behaviour(),
        registry.label(controller.model())
    );
    println!("   /model, /behaviour, /clear, /quit · Ctrl+C interrupts a pending reply");
    for entry in controller.entries() {
        print_entry(entry);
    }
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    ReplInput::Empty => {}
                    ReplInput::Quit => break,
                    ReplInput::Message(text) => {
                        if controller.is_pending() {
                            println!("⏳ Still waiting for the last reply (Ctrl+C to interrupt).");
                        } else {
                            let commands = controller.apply_actions([ControllerAction::Submit { text }]);
                            execute(commands, &client, &tx);
                            println!("… thinking");
                            continue;
                        }
                    }
                    ReplInput::Model(None) => {
                        for spec in registry.list() {
                            let marker = if spec.id == controller.model() { "*" } else { " " };
                            println!(" {marker} {:<40} {}", spec.id, spec.display_name);
                        }
                    }
                    ReplInput::Model(Some(model)) => {
                        controller.apply_action(ControllerAction::SelectModel { model });
                        println!("✅ Model: {}", registry.label(controller.model()));
                    }
                    ReplInput::Behaviour(None) => {
                        for preset in presets.list() {
                            let marker = if preset.id == controller.behaviour() { "*" } else { " " };
                            println!(" {marker} {:<18} {}", preset.id, preset.label());
                        }
                    }
                    ReplInput::Behaviour(Some(behaviour)) => {
                        if presets.find(&behaviour).is_none() {
                            println!(
                                "⚠️  Unknown behaviour '{behaviour}'; the relay will use '{}'.",
                                presets.default_preset().id
                            );
                        }
                        controller.apply_action(ControllerAction::SelectBehaviour { behaviour });
                        println!("✅ Behaviour: {} (conversation reset)", controller.behaviour());
                        for entry in controller.entries() {
                            print_entry(entry);
                        }
                    }
                    ReplInput::Clear => {
                        controller.apply_action(ControllerAction::ClearTranscript);
                        for entry in controller.entries() {
                            print_entry(entry);
                        }
                    }
                    ReplInput::Unknown(name) => println!("❓ Unknown command: /{name}"),
                }
                prompt()?;
            }
            Some(action) = rx.recv() => {
                let is_health = matches!(action, ControllerAction::HealthChecked { .. });
                let before = controller.entries().len();
                let was_pending = controller.is_pending();
                controller.apply_action(action);

                if is_health {
                    println!("\n📡 {}", controller.status());
                } else if was_pending && !controller.is_pending() {
                    match controller.entries().get(before) {
                        Some(entry) => print_entry(entry),
                        None => {
                            if let Some(banner) = controller.banner() {
                                println!("\n❌ {banner}");
                                println!("📡 {}\n", controller.status());
                            }
                        }
                    }
                } else {
                    continue;
                }
                prompt()?;
            }
            _ = tokio::signal::ctrl_c() => {
                if !controller.is_pending() {
                    println!();
                    break;
                }
                controller.apply_action(ControllerAction::Interrupt);
                if let Some(notice) = controller.banner() {
                    println!("\n⏹  {notice}");
                }
                prompt()?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            parse_input("  explain lifetimes \n"),
            ReplInput::Message("explain lifetimes".into())
        );
        assert_eq!(parse_input("   "), ReplInput::Empty);
    }

    #[test]
    fn slash_commands_take_optional_arguments() {
        assert_eq!(parse_input("/model"), ReplInput::Model(None));
        assert_eq!(
            parse_input("/model   qwen/qwen3-4b:free "),
            ReplInput::Model(Some("qwen/qwen3-4b:free".into()))
        );
        assert_eq!(
            parse_input("/behavior brief"),
            ReplInput::Behaviour(Some("brief".into()))
        );
        assert_eq!(parse_input("/clear"), ReplInput::Clear);
        assert_eq!(parse_input("/exit"), ReplInput::Quit);
        assert_eq!(parse_input("/help"), ReplInput::Unknown("help".into()));
    }
}
