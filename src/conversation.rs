use chrono::{DateTime, Utc};

use crate::model::Turn;

/// Ordered turns of a request: prior history plus the active question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub history: Vec<Turn>,
    pub question: Turn,
}

impl Conversation {
    /// The last message is the question; returns `None` for an empty list.
    pub fn build(messages: &[String], role_marker: Option<&str>) -> Option<Self> {
        let (question, history) = messages.split_last()?;
        let prefix = role_marker.map(|marker| format!("{marker}:"));

        let history = history
            .iter()
            .map(|message| history_turn(message, prefix.as_deref()))
            .collect();

        Some(Self {
            history,
            question: Turn::user(question.clone()),
        })
    }

    pub fn into_turns(self) -> Vec<Turn> {
        let mut turns = self.history;
        turns.push(self.question);
        turns
    }
}

fn history_turn(message: &str, prefix: Option<&str>) -> Turn {
    match prefix.and_then(|prefix| message.strip_prefix(prefix)) {
        Some(stripped) => Turn::model(stripped),
        None => Turn::user(message),
    }
}

pub fn system_instruction(instructions: &str) -> String {
    system_instruction_at(instructions, Utc::now())
}

pub fn system_instruction_at(instructions: &str, now: DateTime<Utc>) -> String {
    format!(
        "{instructions}. Today is {}. Current time is {}.",
        now.format("%Y-%m-%d %Z"),
        now.format("%H:%M:%S %Z")
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Conversation, system_instruction_at};
    use crate::model::{Role, Turn};

    fn messages(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_string()).collect()
    }

    #[test]
    fn single_message_is_the_question() {
        let conversation =
            Conversation::build(&messages(&["only"]), None).expect("conversation should build");
        assert!(conversation.history.is_empty());
        assert_eq!(conversation.question, Turn::user("only"));
    }

    #[test]
    fn last_message_is_always_the_question() {
        for len in 1..6 {
            let items: Vec<String> = (0..len).map(|idx| format!("msg-{idx}")).collect();
            let conversation =
                Conversation::build(&items, None).expect("conversation should build");
            assert_eq!(conversation.history.len(), len - 1);
            assert_eq!(conversation.question.text, format!("msg-{}", len - 1));
            assert_eq!(conversation.question.role, Role::User);
        }
    }

    #[test]
    fn empty_messages_yield_no_conversation() {
        assert!(Conversation::build(&[], Some("bot")).is_none());
    }

    #[test]
    fn marker_prefixed_history_becomes_model_turn() {
        let conversation = Conversation::build(
            &messages(&["R:hello", "other:hello", "question"]),
            Some("R"),
        )
        .expect("conversation should build");

        assert_eq!(
            conversation.history,
            vec![Turn::model("hello"), Turn::user("other:hello")]
        );
    }

    #[test]
    fn marker_is_ignored_without_configuration() {
        let conversation = Conversation::build(&messages(&["R:hello", "question"]), None)
            .expect("conversation should build");
        assert_eq!(conversation.history, vec![Turn::user("R:hello")]);
    }

    #[test]
    fn marker_never_applies_to_the_question() {
        let conversation = Conversation::build(&messages(&["R:question"]), Some("R"))
            .expect("conversation should build");
        assert_eq!(conversation.question, Turn::user("R:question"));
    }

    #[test]
    fn into_turns_keeps_conversation_order() {
        let turns = Conversation::build(&messages(&["a", "bot:b", "c"]), Some("bot"))
            .expect("conversation should build")
            .into_turns();
        assert_eq!(
            turns,
            vec![Turn::user("a"), Turn::model("b"), Turn::user("c")]
        );
    }

    #[test]
    fn system_instruction_carries_utc_date_and_time() {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .single()
            .expect("valid timestamp");
        assert_eq!(
            system_instruction_at("Be helpful", now),
            "Be helpful. Today is 2024-03-09 UTC. Current time is 07:05:01 UTC."
        );
    }

    #[test]
    fn system_instruction_is_stable_within_a_second_and_changes_across_days() {
        let before = Utc
            .with_ymd_and_hms(2024, 12, 31, 23, 59, 59)
            .single()
            .expect("valid timestamp");
        let after = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");

        assert_eq!(
            system_instruction_at("x", before),
            system_instruction_at("x", before)
        );
        assert!(system_instruction_at("x", before).contains("Today is 2024-12-31 UTC"));
        assert!(system_instruction_at("x", after).contains("Today is 2025-01-01 UTC"));
    }
}
