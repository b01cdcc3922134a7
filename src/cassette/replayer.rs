//! Replays recorded interactions from a cassette.

use std::collections::HashMap;

use super::format::{Cassette, Interaction};
use crate::error::BananaError;

/// Replays interactions from a loaded cassette, serving them sequentially
/// per `(port, method)` pair.
#[derive(Debug)]
pub struct CassetteReplayer {
    queues: HashMap<(String, String), Vec<Interaction>>,
    cursors: HashMap<(String, String), usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut interactions = cassette.interactions.clone();
        interactions.sort_by_key(|i| i.seq);

        let mut queues: HashMap<(String, String), Vec<Interaction>> = HashMap::new();
        for interaction in interactions {
            let key = (interaction.port.clone(), interaction.method.clone());
            queues.entry(key).or_default().push(interaction);
        }
        Self { queues, cursors: HashMap::new() }
    }

    /// Return the next interaction for the given port and method.
    ///
    /// # Errors
    ///
    /// Returns [`BananaError::Replay`] if the cassette has no (more)
    /// interactions for the pair.
    pub fn next_interaction(
        &mut self,
        port: &str,
        method: &str,
    ) -> Result<&Interaction, BananaError> {
        let key = (port.to_string(), method.to_string());

        let Some(queue) = self.queues.get(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            available.sort();
            return Err(BananaError::Replay(format!(
                "Cassette exhausted: no interactions recorded for {port}::{method}. \
                 Available: [{}]",
                available.join(", ")
            )));
        };

        let cursor = self.cursors.entry(key).or_insert(0);
        let Some(interaction) = queue.get(*cursor) else {
            return Err(BananaError::Replay(format!(
                "Cassette exhausted: all {} interactions for {port}::{method} have been consumed",
                queue.len()
            )));
        };
        *cursor += 1;
        Ok(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, port: &str, method: &str) -> Interaction {
        Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input: json!({}),
            output: json!({"Ok": {}}),
        }
    }

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            commit: "abc".into(),
            interactions,
        }
    }

    #[test]
    fn replay_in_order_per_port() {
        let cassette = make_cassette(vec![
            interaction(2, "image_generator", "generate"),
            interaction(0, "image_generator", "generate"),
            interaction(1, "image_fetcher", "fetch"),
        ]);
        let mut replayer = CassetteReplayer::new(&cassette);

        assert_eq!(replayer.next_interaction("image_generator", "generate").unwrap().seq, 0);
        assert_eq!(replayer.next_interaction("image_fetcher", "fetch").unwrap().seq, 1);
        assert_eq!(replayer.next_interaction("image_generator", "generate").unwrap().seq, 2);
    }

    #[test]
    fn exhausted_replayer_errors() {
        let cassette = make_cassette(vec![interaction(0, "image_generator", "generate")]);
        let mut replayer = CassetteReplayer::new(&cassette);
        replayer.next_interaction("image_generator", "generate").unwrap();

        let err = replayer.next_interaction("image_generator", "generate").unwrap_err();
        assert!(err.to_string().contains("have been consumed"));
    }

    #[test]
    fn unknown_port_errors() {
        let cassette = make_cassette(vec![interaction(0, "image_generator", "generate")]);
        let mut replayer = CassetteReplayer::new(&cassette);

        let err = replayer.next_interaction("image_fetcher", "fetch").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("no interactions recorded for image_fetcher::fetch"));
        assert!(msg.contains("image_generator::generate"));
    }

    #[test]
    fn debug_output_shows_queued_ports() {
        let cassette = make_cassette(vec![interaction(0, "image_generator", "generate")]);
        let replayer = CassetteReplayer::new(&cassette);
        assert!(format!("{replayer:?}").contains("image_generator"));
    }
}
