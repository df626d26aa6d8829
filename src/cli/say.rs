//! One-shot "say" command: send a single prompt and print the reply.

use std::error::Error;

use crate::cli::ClientArgs;
use crate::client::controller::{ControllerAction, ControllerCommand, ConversationController};
use crate::client::ChatClient;
use crate::core::adapters::build_http_client;
use crate::core::config::Config;
use crate::core::models::ModelRegistry;
use crate::core::preset::PresetCatalog;

pub async fn run_say(
    config: &Config,
    args: &ClientArgs,
    prompt: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: nero say <prompt>");
        std::process::exit(2);
    }

    let registry = ModelRegistry::new(&config.models, &config.alternate_vendor_tokens());
    let presets = PresetCatalog::new(&config.presets, config.default_behaviour.as_deref());
    let client = ChatClient::new(
        build_http_client(config.request_timeout())?,
        args.server_url(config),
    );

    let behaviour = args
        .behaviour
        .clone()
        .unwrap_or_else(|| presets.default_preset().id.clone());
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.default_model().to_string());
    let mut controller = ConversationController::new(behaviour, model, registry);
    let baseline = controller.entries().len();

    for command in controller.apply_actions([ControllerAction::Submit { text: prompt }]) {
        let ControllerCommand::SendChat(dispatch) = command;
        let result = client
            .send_chat(&dispatch.messages, &dispatch.behaviour, &dispatch.model)
            .await;
        controller.apply_action(ControllerAction::ReplyReceived {
            request_id: dispatch.request_id,
            result,
        });
    }

    // entries: [..baseline] history, then the user turn, then the reply
    match controller.entries().get(baseline + 1) {
        Some(entry) => {
            println!("{}", entry.message.content);
            if let Some(reason) = &entry.degraded {
                eprintln!("⚠️  Reply degraded: {reason}");
            }
            Ok(())
        }
        None => {
            let banner = controller.banner().unwrap_or("No reply received.");
            eprintln!("❌ {banner}");
            eprintln!("   {}", controller.status());
            std::process::exit(1);
        }
    }
}
