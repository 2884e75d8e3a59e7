//! Reward delivery contract implemented by the host server.
use std::fmt;

use bevy::prelude::*;

use crate::playtime::components::{ClientPlatform, SubjectId};

use super::types::ItemGrant;

/// Who a command runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSender {
    Player,
    Console,
}

impl fmt::Display for CommandSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Player => "player",
            Self::Console => "console",
        };
        write!(f, "{}", label)
    }
}

/// The resolved subject a reward is delivered to.
#[derive(Debug, Clone, Copy)]
pub struct Recipient<'a> {
    pub id: SubjectId,
    pub name: &'a str,
    pub platform: ClientPlatform,
}

impl<'a> Recipient<'a> {
    pub fn new(id: SubjectId, name: &'a str, platform: ClientPlatform) -> Self {
        Self { id, name, platform }
    }
}

/// Effectful primitives offered by the host. Delivery is fire-and-forget.
pub trait RewardSink: Send + Sync + 'static {
    fn give_item(&self, recipient: &Recipient<'_>, item: &ItemGrant);

    fn run_command(&self, recipient: &Recipient<'_>, sender: CommandSender, command: &str);

    fn notify(&self, recipient: &Recipient<'_>, message: &str);
}

/// Resource holding the sink every reward is routed through.
#[derive(Resource)]
pub struct ActiveRewardSink {
    sink: Box<dyn RewardSink>,
}

impl ActiveRewardSink {
    pub fn new(sink: Box<dyn RewardSink>) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &dyn RewardSink {
        self.sink.as_ref()
    }
}

impl Default for ActiveRewardSink {
    fn default() -> Self {
        Self::new(Box::new(LoggingRewardSink))
    }
}

/// Sink that only logs what would have been delivered. Used by the headless runner.
#[derive(Debug, Default)]
pub struct LoggingRewardSink;

impl RewardSink for LoggingRewardSink {
    fn give_item(&self, recipient: &Recipient<'_>, item: &ItemGrant) {
        info!(
            target: "rewards",
            "Giving {}x {} to {} ({})",
            item.amount, item.material, recipient.name, recipient.id
        );
    }

    fn run_command(&self, recipient: &Recipient<'_>, sender: CommandSender, command: &str) {
        info!(
            target: "rewards",
            "Running '{}' as {} for {} ({})",
            command, sender, recipient.name, recipient.id
        );
    }

    fn notify(&self, recipient: &Recipient<'_>, message: &str) {
        info!(target: "rewards", "Notify {}: {}", recipient.name, message);
    }
}

#[cfg(test)]
pub use self::recording::{RecordingSink, SinkCall};

#[cfg(test)]
mod recording {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum SinkCall {
        Item {
            subject: SubjectId,
            material: String,
            amount: u32,
        },
        Command {
            subject: SubjectId,
            sender: CommandSender,
            command: String,
        },
        Notify {
            subject: SubjectId,
            message: String,
        },
    }

    /// Test sink that records every call; clones share the same log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSink {
        calls: Arc<Mutex<Vec<SinkCall>>>,
    }

    impl RecordingSink {
        pub fn calls(&self) -> Vec<SinkCall> {
            self.calls.lock().expect("mutex poisoned").clone()
        }

        fn push(&self, call: SinkCall) {
            self.calls.lock().expect("mutex poisoned").push(call);
        }
    }

    impl RewardSink for RecordingSink {
        fn give_item(&self, recipient: &Recipient<'_>, item: &ItemGrant) {
            self.push(SinkCall::Item {
                subject: recipient.id,
                material: item.material.to_string(),
                amount: item.amount,
            });
        }

        fn run_command(&self, recipient: &Recipient<'_>, sender: CommandSender, command: &str) {
            self.push(SinkCall::Command {
                subject: recipient.id,
                sender,
                command: command.to_string(),
            });
        }

        fn notify(&self, recipient: &Recipient<'_>, message: &str) {
            self.push(SinkCall::Notify {
                subject: recipient.id,
                message: message.to_string(),
            });
        }
    }
}
