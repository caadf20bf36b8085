//! Persistence of the whiteboard state as a single record.

use super::{Storage, StorageError, StorageResult};
use crate::elements::Element;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Key the whiteboard record is stored under.
pub const STATE_KEY: &str = "whiteboardState";

/// The persisted record: `{ "elements": [...], "isDarkMode": bool }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub elements: Vec<Element>,
    #[serde(default)]
    pub is_dark_mode: bool,
}

/// Borrowed form, so saving does not clone the element list.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedStateRef<'a> {
    elements: &'a [Element],
    is_dark_mode: bool,
}

/// Reads and writes the whiteboard record in a key-value store.
#[derive(Clone)]
pub struct PersistenceGateway {
    storage: Arc<dyn Storage>,
}

impl PersistenceGateway {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Serialize and write the record, replacing the previous one.
    pub fn save(&self, elements: &[Element], is_dark_mode: bool) -> StorageResult<()> {
        let record = PersistedStateRef {
            elements,
            is_dark_mode,
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(STATE_KEY, &json)
    }

    /// Read the record.
    ///
    /// Absence, read failures and corrupt data all come back as `None`; the
    /// latter two are logged.
    pub fn load(&self) -> Option<PersistedState> {
        let json = match self.storage.get(STATE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read saved whiteboard: {e}");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("Ignoring corrupt saved whiteboard: {e}");
                None
            }
        }
    }

    /// Remove the record.
    pub fn clear(&self) -> StorageResult<()> {
        self.storage.remove(STATE_KEY)
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("key", &STATE_KEY)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Bitmap, Circle, Image, ImageFormat, Rectangle, SerializableColor, Stroke, Text};
    use crate::storage::MemoryStorage;
    use kurbo::Point;

    fn gateway() -> PersistenceGateway {
        PersistenceGateway::new(Arc::new(MemoryStorage::new()))
    }

    fn sample_elements() -> Vec<Element> {
        let mut stroke = Stroke::new(Point::new(1.0, 2.0), SerializableColor::rgb(255, 0, 0), 4.0);
        stroke.add_point(Point::new(3.0, 4.0));
        let bitmap = Bitmap::from_encoded(&[0x89, 0x50, 0x4E, 0x47], ImageFormat::Png, 8, 6);
        vec![
            Element::Stroke(stroke.clone()),
            Element::Eraser(stroke),
            Element::Rectangle(Rectangle::new(Point::new(100.0, 100.0), -20.0, 30.0)),
            Element::Circle(Circle::new(Point::new(50.0, 50.0), 30.0)),
            Element::Text(Text::new(Point::new(5.0, 40.0), "hello").with_font_size(24.0)),
            Element::Image(Image::new(Point::ZERO, Arc::new(bitmap))),
        ]
    }

    #[test]
    fn test_missing_record() {
        assert!(gateway().load().is_none());
    }

    #[test]
    fn test_save_load_round_trip() {
        let gateway = gateway();
        let elements = sample_elements();
        gateway.save(&elements, true).unwrap();

        let state = gateway.load().unwrap();
        assert!(state.is_dark_mode);
        assert_eq!(state.elements, elements);
    }

    #[test]
    fn test_record_shape() {
        let gateway = gateway();
        gateway.save(&sample_elements()[..1], false).unwrap();

        let json = gateway.storage().get(STATE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["isDarkMode"], false);
        assert_eq!(value["elements"][0]["type"], "pencil");
        assert_eq!(value["elements"][0]["color"], "#ff0000");
    }

    #[test]
    fn test_corrupt_record_is_absent() {
        let gateway = gateway();
        gateway.storage().set(STATE_KEY, "{not json").unwrap();
        assert!(gateway.load().is_none());

        gateway
            .storage()
            .set(STATE_KEY, r#"{"elements":[{"type":"hexagon"}],"isDarkMode":false}"#)
            .unwrap();
        assert!(gateway.load().is_none());
    }

    #[test]
    fn test_dark_mode_defaults_to_light() {
        let gateway = gateway();
        gateway.storage().set(STATE_KEY, r#"{"elements":[]}"#).unwrap();
        let state = gateway.load().unwrap();
        assert!(!state.is_dark_mode);
        assert!(state.elements.is_empty());
    }

    #[test]
    fn test_clear() {
        let gateway = gateway();
        gateway.save(&[], false).unwrap();
        gateway.clear().unwrap();
        assert!(gateway.load().is_none());
        assert!(!gateway.storage().exists(STATE_KEY).unwrap());
    }
}
