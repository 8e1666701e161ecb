//! Session state shared by the map and chat controllers
//!
//! Global invariants enforced:
//! - Exactly one current location; each selection overwrites it
//! - Only the latest report is kept
//! - The conversation log is append-only
//! - Blank chat input never reaches the responder

use crate::analysis::LocationAnalyzer;
use crate::assistant::AssistantResponder;
use crate::conversation::{ChatMessage, ConversationStore, Role};
use crate::image::{ImageUpload, PLACEHOLDER_ANALYSIS};
use crate::location::{Coordinate, CurrentLocation};
use crate::report::LocationReport;
use crate::zones::{self, HazardZone, Layer};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Labelled pin dropped for every analyzed location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub coordinates: Coordinate,
    pub label: String,
}

/// Mutable state of one viewer session
#[derive(Debug, Clone)]
pub struct Session {
    current_location: Option<CurrentLocation>,
    last_report: Option<LocationReport>,
    markers: Vec<Marker>,
    active_layers: BTreeSet<Layer>,
    conversation: ConversationStore,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Fresh session with every overlay layer switched on
    pub fn new() -> Self {
        Session {
            current_location: None,
            last_report: None,
            markers: Vec::new(),
            active_layers: Layer::ALL.into_iter().collect(),
            conversation: ConversationStore::new(),
        }
    }

    pub fn current_location(&self) -> Option<&CurrentLocation> {
        self.current_location.as_ref()
    }

    pub fn last_report(&self) -> Option<&LocationReport> {
        self.last_report.as_ref()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    /// Analyze a clicked or searched location and make it current
    pub fn select_location<R: Rng>(
        &mut self,
        coordinates: Coordinate,
        place_name: Option<&str>,
        analyzer: &mut LocationAnalyzer<R>,
    ) -> &LocationReport {
        let report = analyzer.analyze(coordinates, place_name);

        self.current_location = Some(CurrentLocation::new(coordinates, place_name));
        self.markers.push(Marker {
            coordinates,
            label: report.name.clone(),
        });

        self.last_report.insert(report)
    }

    /// Handle one line of chat input
    ///
    /// Returns the assistant reply, or None when the input was blank and
    /// nothing was recorded.
    pub fn submit_chat<R: Rng>(
        &mut self,
        input: &str,
        responder: &AssistantResponder,
        analyzer: &mut LocationAnalyzer<R>,
    ) -> Option<&ChatMessage> {
        let text = input.trim();
        if text.is_empty() {
            tracing::trace!("ignoring blank chat input");
            return None;
        }

        self.conversation.append(ChatMessage::new(Role::User, text));
        let reply = responder.respond(text, self.current_location.as_ref(), analyzer);
        Some(self.conversation.append(ChatMessage::new(Role::Assistant, reply)))
    }

    /// Record an image upload and its placeholder analysis
    pub fn submit_image(&mut self, upload: &ImageUpload) -> &ChatMessage {
        self.conversation.append(
            ChatMessage::new(Role::User, format!("[image] {}", upload.file_name))
                .with_attachment(upload.data_url()),
        );
        self.conversation
            .append(ChatMessage::new(Role::Assistant, PLACEHOLDER_ANALYSIS))
    }

    pub fn is_layer_active(&self, layer: Layer) -> bool {
        self.active_layers.contains(&layer)
    }

    pub fn set_layer(&mut self, layer: Layer, active: bool) {
        if active {
            self.active_layers.insert(layer);
        } else {
            self.active_layers.remove(&layer);
        }
    }

    /// Flip a layer and return its new state
    pub fn toggle_layer(&mut self, layer: Layer) -> bool {
        let active = !self.is_layer_active(layer);
        self.set_layer(layer, active);
        active
    }

    pub fn active_layers(&self) -> impl Iterator<Item = Layer> + '_ {
        self.active_layers.iter().copied()
    }

    /// Hazard zones on currently active layers
    pub fn visible_zones(&self) -> Vec<HazardZone> {
        zones::zones_in_layers(|layer| self.is_layer_active(layer))
    }
}
