use foundation::CoordinateError;
use foundation::math::Vec3;
use roster::{level_color, level_of};

use crate::map_store::MapState;

/// Render-ready marker for one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub participant_id: String,
    pub username: String,
    pub position: Vec3,
    pub level: u8,
    pub color: &'static str,
    pub selected: bool,
    pub is_current_user: bool,
}

impl MapState {
    /// One marker per participant on a globe of `radius`, in roster order.
    pub fn markers(&self, radius: f64) -> Result<Vec<Marker>, CoordinateError> {
        let mut out = Vec::with_capacity(self.participants().len());
        for p in self.participants() {
            let level = level_of(p);
            out.push(Marker {
                participant_id: p.id.clone(),
                username: p.username.clone(),
                position: p.position.to_sphere(radius)?,
                level,
                color: level_color(level),
                selected: self.selected_id() == Some(p.id.as_str()),
                is_current_user: self.is_current_user(p),
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::map_store::MapStore;
    use crate::map_store::fixtures::{participant, roster};
    use foundation::CoordinateError;

    #[test]
    fn markers_sit_on_the_globe_with_level_colors() {
        let mut store = MapStore::new();
        store.set_participants(roster(vec![
            participant("a", 0.0, [true, true, false, false, false]),
            participant("b", 0.25, [false; 5]),
        ]));
        store.set_selected_participant(Some("b"));
        store.set_current_user_id(Some("a".to_string()));

        let markers = store.state().markers(2.0).unwrap();
        assert_eq!(markers.len(), 2);

        let a = &markers[0];
        assert_eq!(a.participant_id, "a");
        assert_eq!(a.level, 2);
        assert_eq!(a.color, "#C4B5E0");
        assert!(a.is_current_user);
        assert!(!a.selected);
        assert!((a.position.length() - 2.0).abs() < 1e-12);

        let b = &markers[1];
        assert!(b.selected);
        assert!(!b.is_current_user);
        assert!((b.position.z - 2.0).abs() < 1e-12);
    }

    #[test]
    fn bad_radius_is_reported() {
        let mut store = MapStore::new();
        store.set_participants(roster(vec![participant("a", 0.0, [false; 5])]));
        assert_eq!(
            store.state().markers(0.0),
            Err(CoordinateError::InvalidRadius(0.0))
        );
    }

    #[test]
    fn empty_roster_has_no_markers() {
        assert!(MapStore::new().state().markers(1.0).unwrap().is_empty());
    }
}
