//! Timeline events shown along the level, and the info panel that pops up
//! when the player walks past one.

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Horizontal distance at which an event's summary panel appears.
pub const PROXIMITY_RADIUS: f32 = 50.0;
/// Summary panels hide this long after the player was last nearby.
pub const SUMMARY_TIMEOUT_S: f64 = 8.0;

#[derive(Debug, Deserialize, Clone)]
pub struct TimelineFile {
    pub version: String,
    pub events: Vec<TimelineEvent>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimelineEvent {
    pub id: u32,
    pub year: String,
    pub name: String,
    pub title: String,
    pub biography: String,
    pub love_story: String,
    pub writings: String,
    pub influence: String,
    pub historical_context: String,
    pub image_key: String,
    /// Horizontal stride per event index; the card sits at
    /// `anchor.x + card_spacing * index`.
    #[serde(default = "default_card_spacing")]
    pub card_spacing: f32,
    /// How far the card sits above its anchor.
    #[serde(default = "default_card_lift")]
    pub card_lift: f32,
}

impl TimelineEvent {
    pub fn summary_text(&self) -> String {
        format!("{} ({})\n\n{}", self.name, self.year, self.love_story)
    }

    pub fn full_text(&self) -> String {
        format!(
            "{} ({})\n\n\
             Talambuhay:\n{}\n\n\
             Buod ng Pag-ibig:\n{}\n\n\
             Mga Sinulat ni Rizal:\n{}\n\n\
             Epekto kay Rizal:\n{}\n\n\
             Kontekstong Pangkasaysayan:\n{}",
            self.name,
            self.year,
            self.biography,
            self.love_story,
            self.writings,
            self.influence,
            self.historical_context
        )
    }
}

pub fn load_timeline_from_path(path: &Path) -> Result<Vec<TimelineEvent>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read timeline file {}: {e}", path.display()))?;
    let file: TimelineFile = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse timeline JSON {}: {e}", path.display()))?;
    validate_timeline(&file)?;
    Ok(file.events)
}

fn validate_timeline(file: &TimelineFile) -> Result<(), String> {
    if file.version != "0.1" {
        return Err(format!(
            "Timeline validation failed: unsupported version '{}'",
            file.version
        ));
    }
    let mut ids = HashSet::new();
    for event in &file.events {
        if !ids.insert(event.id) {
            return Err(format!(
                "Timeline validation failed: duplicate event id {}",
                event.id
            ));
        }
        if event.name.is_empty() {
            return Err(format!(
                "Timeline validation failed: event {} has no name",
                event.id
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Summary,
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoPanel {
    pub event_id: u32,
    pub kind: PanelKind,
    pub text: String,
    shown_at: f64,
}

/// A point along the level tied to a timeline event.
#[derive(Debug, Clone, Copy)]
pub struct EventMarker {
    pub event_index: usize,
    pub x: f32,
}

/// At most one panel is visible at a time.
#[derive(Debug, Default)]
pub struct InfoPanels {
    current: Option<InfoPanel>,
}

impl InfoPanels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&InfoPanel> {
        self.current.as_ref()
    }

    /// Show the summary for the nearest marker in range, and expire stale
    /// summaries. An open full-details panel is left alone.
    pub fn update(
        &mut self,
        player_x: f32,
        markers: &[EventMarker],
        events: &[TimelineEvent],
        now: f64,
    ) {
        if matches!(&self.current, Some(panel) if panel.kind == PanelKind::Full) {
            return;
        }

        let nearest = markers
            .iter()
            .map(|marker| (marker, (player_x - marker.x).abs()))
            .filter(|(_, distance)| *distance < PROXIMITY_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .and_then(|(marker, _)| events.get(marker.event_index));

        if let Some(event) = nearest {
            match &mut self.current {
                Some(panel) if panel.event_id == event.id => panel.shown_at = now,
                _ => {
                    log::info!("Showing summary for '{}' ({})", event.name, event.year);
                    self.current = Some(InfoPanel {
                        event_id: event.id,
                        kind: PanelKind::Summary,
                        text: event.summary_text(),
                        shown_at: now,
                    });
                }
            }
            return;
        }

        if matches!(&self.current, Some(panel) if now - panel.shown_at >= SUMMARY_TIMEOUT_S) {
            self.current = None;
        }
    }

    pub fn show_full(&mut self, event: &TimelineEvent, now: f64) {
        self.current = Some(InfoPanel {
            event_id: event.id,
            kind: PanelKind::Full,
            text: event.full_text(),
            shown_at: now,
        });
    }

    pub fn close(&mut self) {
        self.current = None;
    }
}

const fn default_card_spacing() -> f32 {
    500.0
}

const fn default_card_lift() -> f32 {
    25.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "lakbay_timeline_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    pub(crate) fn sample_event(id: u32, name: &str) -> TimelineEvent {
        TimelineEvent {
            id,
            year: "1880".to_string(),
            name: name.to_string(),
            title: "Title".to_string(),
            biography: "Bio".to_string(),
            love_story: "Story".to_string(),
            writings: "Letters".to_string(),
            influence: "Influence".to_string(),
            historical_context: "Context".to_string(),
            image_key: format!("img-{id}"),
            card_spacing: default_card_spacing(),
            card_lift: default_card_lift(),
        }
    }

    #[test]
    fn load_timeline_applies_card_defaults() {
        let path = temp_file_path("valid");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "events": [
                { "id": 1, "year": "1877", "name": "A", "title": "t", "biography": "b",
                  "love_story": "l", "writings": "w", "influence": "i",
                  "historical_context": "h", "image_key": "a" },
                { "id": 2, "year": "1878", "name": "B", "title": "t", "biography": "b",
                  "love_story": "l", "writings": "w", "influence": "i",
                  "historical_context": "h", "image_key": "b",
                  "card_spacing": 505, "card_lift": 32 }
              ]
            }"#,
        )
        .expect("write temp file");

        let events = load_timeline_from_path(&path).expect("timeline should load");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].card_spacing, 500.0);
        assert_eq!(events[0].card_lift, 25.0);
        assert_eq!(events[1].card_spacing, 505.0);
        assert_eq!(events[1].card_lift, 32.0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn load_timeline_rejects_duplicate_ids() {
        let path = temp_file_path("dup");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "events": [
                { "id": 1, "year": "", "name": "A", "title": "", "biography": "", "love_story": "",
                  "writings": "", "influence": "", "historical_context": "", "image_key": "" },
                { "id": 1, "year": "", "name": "B", "title": "", "biography": "", "love_story": "",
                  "writings": "", "influence": "", "historical_context": "", "image_key": "" }
              ]
            }"#,
        )
        .expect("write temp file");
        let err = load_timeline_from_path(&path).expect_err("duplicate id should fail");
        assert!(err.contains("duplicate event id 1"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn panel_texts() {
        let event = sample_event(3, "Leonor");
        assert_eq!(event.summary_text(), "Leonor (1880)\n\nStory");
        let full = event.full_text();
        assert!(full.starts_with("Leonor (1880)\n\nTalambuhay:\nBio"));
        assert!(full.ends_with("Kontekstong Pangkasaysayan:\nContext"));
    }

    #[test]
    fn summary_shows_nearby_and_expires_after_timeout() {
        let events = vec![sample_event(1, "A"), sample_event(2, "B")];
        let markers = [
            EventMarker {
                event_index: 0,
                x: 100.0,
            },
            EventMarker {
                event_index: 1,
                x: 600.0,
            },
        ];
        let mut panels = InfoPanels::new();

        panels.update(0.0, &markers, &events, 0.0);
        assert!(panels.current().is_none());

        panels.update(80.0, &markers, &events, 1.0);
        assert_eq!(panels.current().map(|p| p.event_id), Some(1));

        // Still nearby keeps it alive.
        panels.update(120.0, &markers, &events, 5.0);
        panels.update(300.0, &markers, &events, 12.0);
        assert!(panels.current().is_some());
        panels.update(300.0, &markers, &events, 13.0);
        assert!(panels.current().is_none());

        panels.update(590.0, &markers, &events, 14.0);
        let panel = panels.current().expect("second event panel");
        assert_eq!(panel.event_id, 2);
        assert_eq!(panel.kind, PanelKind::Summary);
    }

    #[test]
    fn full_panel_survives_proximity_until_closed() {
        let events = vec![sample_event(1, "A"), sample_event(2, "B")];
        let markers = [EventMarker {
            event_index: 1,
            x: 0.0,
        }];
        let mut panels = InfoPanels::new();
        panels.show_full(&events[0], 0.0);
        panels.update(0.0, &markers, &events, 100.0);
        let panel = panels.current().expect("full panel stays");
        assert_eq!(panel.kind, PanelKind::Full);
        assert_eq!(panel.event_id, 1);

        panels.close();
        assert!(panels.current().is_none());
    }
}
