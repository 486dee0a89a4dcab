//! Built-in replay scripts.
//!
//! A [`Script`] bundles the endpoint registry with the sequence that plays
//! over it. The two narratives shipped here are the fixed exchanges this
//! tool exists to show: the TCP three-way handshake and a man-in-the-middle
//! interception.

use crate::{
    endpoint::{Endpoint, EndpointRegistry},
    error::InvalidReferenceError,
    event::EndpointMarker,
    interpolate::Point,
    sequence::{Sequence, Step},
    surface::{Color, MarkerStyle},
};

/// A registry plus the sequence that plays over it.
#[derive(Debug, Clone)]
pub struct Script {
    /// The participants.
    pub registry: EndpointRegistry,
    /// The steps and terminal message.
    pub sequence: Sequence,
}

impl Script {
    /// Bundle a registry and a sequence.
    #[must_use]
    pub fn new(registry: EndpointRegistry, sequence: Sequence) -> Self {
        Self { registry, sequence }
    }

    /// Check the sequence's endpoint references against the registry.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidReferenceError`] listing every unresolved reference.
    pub fn validate(&self) -> Result<(), InvalidReferenceError> {
        self.sequence.validate(&self.registry)
    }

    /// Marker placement data for the run-start event, in declaration order.
    #[must_use]
    pub fn markers(&self) -> Vec<EndpointMarker> {
        self.registry
            .iter()
            .map(|e| EndpointMarker {
                name: e.name.clone(),
                position: e.position,
                style: e.style,
            })
            .collect()
    }
}

fn assemble(endpoints: Vec<Endpoint>, steps: Vec<Step>, terminal_message: &str) -> Script {
    let mut registry = EndpointRegistry::new();
    for endpoint in endpoints {
        // Built-in names are distinct literals; a collision here is a bug
        // the round-trip tests below would catch.
        let _ = registry.register(endpoint);
    }
    Script::new(registry, Sequence::new(steps, terminal_message))
}

/// The TCP three-way handshake: SYN, SYN-ACK, ACK between a client and a
/// server, then "Connection established!".
#[must_use]
pub fn three_way_handshake() -> Script {
    assemble(
        vec![
            Endpoint::new(
                "Client",
                Point::new(100.0, 70.0),
                MarkerStyle::new(Color::CYAN, 15.0),
            ),
            Endpoint::new(
                "Server",
                Point::new(500.0, 70.0),
                MarkerStyle::new(Color::LIME_GREEN, 15.0),
            ),
        ],
        vec![
            Step::new("Client", "Server", Color::YELLOW, "SYN"),
            Step::new("Server", "Client", Color::LIME, "SYN-ACK"),
            Step::new("Client", "Server", Color::CYAN, "ACK"),
        ],
        "Connection established!",
    )
}

/// A man-in-the-middle interception: the attacker sits between Alice and
/// Bob, rewriting the exchange in both directions.
#[must_use]
pub fn mitm_interception() -> Script {
    assemble(
        vec![
            Endpoint::new(
                "Alice",
                Point::new(100.0, 70.0),
                MarkerStyle::new(Color::SKY, 20.0),
            ),
            Endpoint::new(
                "Attacker",
                Point::new(250.0, 250.0),
                MarkerStyle::new(Color::ROSE, 20.0),
            ),
            Endpoint::new(
                "Bob",
                Point::new(400.0, 430.0),
                MarkerStyle::new(Color::MINT, 20.0),
            ),
        ],
        vec![
            Step::new("Alice", "Attacker", Color::YELLOW, "SYN")
                .with_status("Alice is sending a message to Attacker..."),
            Step::new("Attacker", "Alice", Color::LIME, "SYN-ACK")
                .with_status("Attacker intercepts and modifies the message..."),
            Step::new("Attacker", "Bob", Color::RED, "Modified SYN-ACK")
                .with_status("Attacker sends modified message to Bob..."),
            Step::new("Bob", "Attacker", Color::CYAN, "ACK")
                .with_status("Bob sends ACK to Attacker..."),
            Step::new("Attacker", "Alice", Color::ORANGE, "Fake ACK")
                .with_status("Attacker sends fake ACK to Alice..."),
        ],
        "MITM attack simulation complete.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_is_well_formed() {
        let script = three_way_handshake();

        assert!(script.validate().is_ok());
        assert_eq!(script.registry.len(), 2);
        assert_eq!(script.sequence.len(), 3);
        assert_eq!(script.sequence.terminal_message(), "Connection established!");

        let labels: Vec<_> = script.sequence.steps().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["SYN", "SYN-ACK", "ACK"]);
    }

    #[test]
    fn interception_is_well_formed() {
        let script = mitm_interception();

        assert!(script.validate().is_ok());
        assert_eq!(script.registry.len(), 3);
        assert_eq!(script.sequence.len(), 5);

        // Every step announces itself.
        assert!(script.sequence.steps().all(|s| s.status.is_some()));
    }

    #[test]
    fn markers_follow_declaration_order() {
        let script = mitm_interception();
        let names: Vec<_> = script.markers().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Alice", "Attacker", "Bob"]);
    }
}
