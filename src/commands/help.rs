use actix_web::web;

use crate::commands::{find_command, COMMANDS};
use crate::error::Result;
use crate::models::{AppState, ChatMessage};

fn group_title(group: &str) -> &str {
    match group {
        "games-mp" => "Multi-Player Games",
        "util-public" => "Utility",
        other => other,
    }
}

/// `help [command]`
pub async fn run(app: web::Data<AppState>, msg: ChatMessage, args: Vec<String>) -> Result<()> {
    let channel = app.hub.channel(&msg.channel_id);
    let prefix = &app.config.prefix;
    if let Some(name) = args.first() {
        match find_command(&name.to_lowercase()) {
            Some(command) => {
                let aliases = if command.aliases.is_empty() { "None".to_string() } else { command.aliases.join(", ") };
                channel.say(format!(
                    "**Command:** {}\n**Description:** {}\n**Format:** `{}{} {}`\n**Aliases:** {}",
                    command.name,
                    command.description,
                    prefix,
                    command.name,
                    command.usage,
                    aliases,
                ));
            }
            None => {
                channel.reply(&msg, "Could not identify command.");
            }
        }
        return Ok(());
    }

    let mut groups: Vec<&str> = Vec::new();
    for command in COMMANDS {
        if !groups.contains(&command.group) {
            groups.push(command.group);
        }
    }
    let mut text = String::new();
    for group in groups {
        text.push_str(&format!("__**{}**__\n", group_title(group)));
        for command in COMMANDS.iter().filter(|command| command.group == group) {
            text.push_str(&format!("`{}`: {}\n", command.name, command.description));
        }
    }
    text.push_str(&format!("\nUse `{}help <command>` for details.", prefix));
    channel.say(text);
    Ok(())
}
