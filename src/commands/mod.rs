//! Command table, prefix parsing, and dispatch of inbound messages.
pub mod help;

use actix_web::web;
use futures::future::{FutureExt, LocalBoxFuture};
use log::{debug, error, info};

use crate::error::Result;
use crate::game::{car_race, chess};
use crate::models::{AppState, ChatMessage, User};

pub type CommandFuture = LocalBoxFuture<'static, Result<()>>;
pub type CommandHandler = fn(web::Data<AppState>, ChatMessage, Vec<String>) -> CommandFuture;

/// Metadata plus the function that runs a command.
pub struct CommandDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub group: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDescriptor {
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

fn car_race_handler(app: web::Data<AppState>, msg: ChatMessage, args: Vec<String>) -> CommandFuture {
    car_race::run(app, msg, args).boxed_local()
}

fn chess_handler(app: web::Data<AppState>, msg: ChatMessage, args: Vec<String>) -> CommandFuture {
    chess::run(app, msg, args).boxed_local()
}

fn chess_delete_handler(app: web::Data<AppState>, msg: ChatMessage, args: Vec<String>) -> CommandFuture {
    chess::delete_saved(app, msg, args).boxed_local()
}

fn help_handler(app: web::Data<AppState>, msg: ChatMessage, args: Vec<String>) -> CommandFuture {
    help::run(app, msg, args).boxed_local()
}

pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "help",
        aliases: &["commands"],
        group: "util-public",
        description: "Displays a list of available commands.",
        usage: "",
        handler: help_handler,
    },
    CommandDescriptor {
        name: car_race::NAME,
        aliases: &["cars"],
        group: "games-mp",
        description: "Race a car against another user.",
        usage: "<opponent> <car>",
        handler: car_race_handler,
    },
    CommandDescriptor {
        name: chess::NAME,
        aliases: &[],
        group: "games-mp",
        description: "Play a game of Chess with another user or the AI.",
        usage: "<opponent>",
        handler: chess_handler,
    },
    CommandDescriptor {
        name: "chess-delete",
        aliases: &[],
        group: "games-mp",
        description: "Deletes your saved Chess game.",
        usage: "",
        handler: chess_delete_handler,
    },
];

pub fn find_command(name: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS.iter().find(|command| command.matches(name))
}

/// Splits `--name arg arg` into the lower-cased name and its arguments.
pub fn parse_invocation(prefix: &str, content: &str) -> Option<(String, Vec<String>)> {
    let rest = content.trim().strip_prefix(prefix)?;
    let mut words = rest.split_whitespace();
    let name = words.next()?.to_lowercase();
    Some((name, words.map(str::to_string).collect()))
}

/// Resolves `<@id>`, `<@!id>` or a bare id against the user directory.
pub fn resolve_user(app: &AppState, raw: &str) -> Option<User> {
    let id = raw
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|rest| rest.trim_start_matches('!'))
        .unwrap_or(raw);
    app.hub.find_user(id)
}

/// Entry point for every inbound channel message: feeds waiting games,
/// then runs the command it invokes, if any.
pub fn handle_incoming(app: web::Data<AppState>, msg: ChatMessage) {
    app.hub.publish(&msg);
    if msg.author.bot || msg.content.contains("@here") || msg.content.contains("@everyone") {
        return;
    }
    let Some((name, args)) = parse_invocation(&app.config.prefix, &msg.content) else {
        if msg.content.contains(&format!("<@{}>", app.config.bot_id)) {
            app.hub.channel(&msg.channel_id).say(format!(
                "Hi My Prefix is `{prefix}`\nGet Started by doing `{prefix}help`",
                prefix = app.config.prefix
            ));
        }
        return;
    };
    let Some(command) = find_command(&name) else {
        debug!("Unknown command {} from {}", name, msg.author.id);
        return;
    };
    info!("Running command {} for {} in {}", command.name, msg.author.id, msg.channel_id);
    let channel = app.hub.channel(&msg.channel_id);
    let future = (command.handler)(app, msg, args);
    actix_rt::spawn(async move {
        if let Err(err) = future.await {
            error!("[COMMAND:{}] {}", command.name, err);
            channel.say(format!("Oh no, an error occurred: `{}`. Try again later!", err));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_requires_prefix() {
        assert_eq!(
            parse_invocation("--", "--Chess <@2>"),
            Some(("chess".to_string(), vec!["<@2>".to_string()]))
        );
        assert_eq!(parse_invocation("--", "chess <@2>"), None);
        assert_eq!(parse_invocation("--", "--"), None);
    }

    #[test]
    fn aliases_find_commands() {
        assert_eq!(find_command("cars").map(|c| c.name), Some("car-race"));
        assert_eq!(find_command("chess-delete").map(|c| c.usage), Some(""));
        assert!(find_command("hearing-test").is_none());
    }
}
