use std::time::Duration;

use log::debug;

use crate::models::User;
use crate::session::arbiter::resolve;
use crate::websocket::hub::ChannelHandle;

const YES: &[&str] = &["yes", "y", "ye", "yeah", "yup", "yea", "ya", "hai", "si", "sí", "oui", "はい", "correct"];
const NO: &[&str] = &["no", "n", "nah", "nope", "nop", "iie", "いいえ", "non"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Accepted,
    Declined,
    TimedOut,
}

impl Verification {
    pub fn is_accepted(self) -> bool {
        self == Verification::Accepted
    }
}

/// Posts `prompt` and waits for `user` to answer yes or no. Other users and
/// other words are ignored; silence until the deadline counts as
/// [`Verification::TimedOut`].
pub async fn verify(channel: &ChannelHandle, user: &User, prompt: impl Into<String>, deadline: Duration) -> Verification {
    let collector = channel.collector();
    channel.say(prompt);
    let answer = resolve(
        collector,
        |m| {
            if !m.is_from(user) {
                return false;
            }
            let choice = m.normalized();
            YES.contains(&choice.as_str()) || NO.contains(&choice.as_str())
        },
        deadline,
    )
    .await;
    match answer {
        Some(m) if YES.contains(&m.normalized().as_str()) => Verification::Accepted,
        Some(_) => Verification::Declined,
        None => Verification::TimedOut,
    }
}

/// Asks `target` to accept a game and announces a refusal in-channel.
pub async fn challenge(channel: &ChannelHandle, target: &User, deadline: Duration) -> Verification {
    let outcome = verify(channel, target, format!("{}, do you accept this challenge?", target), deadline).await;
    debug!("Challenge to {} in {} resolved as {:?}", target.id, channel.id(), outcome);
    if !outcome.is_accepted() {
        channel.say("Looks like they declined...");
    }
    outcome
}
