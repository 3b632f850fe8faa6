//! Drag-session state machine and pointer hit testing.
//!
//! The session is toolkit-agnostic: the UI layer feeds it gesture
//! transitions and pointer coordinates, and asks [`resolve_band`] which
//! stacked drop row a release landed in.

/// Payload attached to an active drag.
///
/// The resource id travels in two redundant encodings (a typed field and a
/// `sid:` text field) so a drop handler can still recover it when one
/// encoding is stripped in transit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    typed: Option<i64>,
    text: String,
}

impl DragPayload {
    const TEXT_PREFIX: &'static str = "sid:";

    /// Encode `id` into both fields.
    pub fn encode(id: i64) -> Self {
        Self {
            typed: Some(id),
            text: format!("{}{id}", Self::TEXT_PREFIX),
        }
    }

    /// Copy with the typed encoding stripped.
    pub fn without_typed(mut self) -> Self {
        self.typed = None;
        self
    }

    /// Copy with the text encoding stripped.
    pub fn without_text(mut self) -> Self {
        self.text.clear();
        self
    }

    /// Recover the id: typed field first, then the text encoding.
    pub fn decode(&self) -> Option<i64> {
        if let Some(id) = self.typed {
            return Some(id);
        }
        self.text
            .strip_prefix(Self::TEXT_PREFIX)
            .and_then(|raw| raw.parse().ok())
    }
}

/// Three-state drag lifecycle: Idle → Dragging(resource) → Idle.
#[derive(Debug, Default)]
pub struct DragSession {
    active: Option<(i64, DragPayload)>,
}

impl DragSession {
    /// Idle → Dragging. A second begin while dragging is ignored.
    pub fn begin(&mut self, id: i64) {
        if self.active.is_none() {
            self.active = Some((id, DragPayload::encode(id)));
        }
    }

    /// Dragging → Idle, unconditionally; fires on every release so an
    /// abandoned drag never leaves stale selection state behind.
    pub fn finish(&mut self) {
        self.active = None;
    }

    /// Whether a drag is in flight.
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Id of the resource being dragged, if any.
    pub fn dragged(&self) -> Option<i64> {
        self.active.as_ref().map(|(id, _)| *id)
    }

    /// Payload of the active drag.
    pub fn payload(&self) -> Option<&DragPayload> {
        self.active.as_ref().map(|(_, payload)| payload)
    }

    /// Recover the dragged id from a payload, falling back to the session's
    /// own record when both payload encodings were stripped.
    pub fn resolve(&self, payload: &DragPayload) -> Option<i64> {
        payload.decode().or_else(|| self.dragged())
    }
}

/// Vertical band occupied by one drop row, in screen cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBand {
    /// First row of the band.
    pub top: u16,
    /// Band height; zero-height bands never match.
    pub height: u16,
}

impl RowBand {
    /// Whether `y` falls inside the band.
    pub fn contains(&self, y: u16) -> bool {
        self.height > 0 && y >= self.top && y - self.top < self.height
    }

    // Doubled center so the math stays in integers.
    fn center2(&self) -> u32 {
        u32::from(self.top) * 2 + u32::from(self.height) - 1
    }
}

/// Resolve which band of a vertically stacked list a pointer row landed in.
///
/// Direct containment wins when available. Otherwise the nearest band
/// center within half a band height wins (drop rows drawn by a graphics
/// layer may not hit-test directly); anything further yields `None`.
pub fn resolve_band(bands: &[RowBand], y: u16) -> Option<usize> {
    if let Some(idx) = bands.iter().position(|band| band.contains(y)) {
        return Some(idx);
    }

    let y2 = u32::from(y) * 2;
    let mut best: Option<(usize, u32)> = None;
    for (idx, band) in bands.iter().enumerate() {
        if band.height == 0 {
            continue;
        }
        let distance2 = band.center2().abs_diff(y2);
        // Half a band height, doubled to match the doubled distance.
        if distance2 <= u32::from(band.height) && best.map_or(true, |(_, d)| distance2 < d) {
            best = Some((idx, distance2));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_survives_either_encoding_being_stripped() {
        let payload = DragPayload::encode(42);
        assert_eq!(payload.decode(), Some(42));
        assert_eq!(payload.clone().without_typed().decode(), Some(42));
        assert_eq!(payload.clone().without_text().decode(), Some(42));
        assert_eq!(payload.without_typed().without_text().decode(), None);
    }

    #[test]
    fn session_fallback_recovers_a_fully_stripped_payload() {
        let mut session = DragSession::default();
        session.begin(7);
        let stripped = session
            .payload()
            .cloned()
            .unwrap()
            .without_typed()
            .without_text();
        assert_eq!(session.resolve(&stripped), Some(7));

        session.finish();
        assert_eq!(session.resolve(&stripped), None);
    }

    #[test]
    fn finish_is_unconditional_and_begin_ignores_reentry() {
        let mut session = DragSession::default();
        session.begin(1);
        session.begin(2);
        assert_eq!(session.dragged(), Some(1));
        session.finish();
        assert!(!session.is_dragging());
        session.finish();
        assert!(!session.is_dragging());
    }

    #[test]
    fn direct_containment_wins() {
        let bands = [
            RowBand { top: 0, height: 2 },
            RowBand { top: 2, height: 2 },
        ];
        assert_eq!(resolve_band(&bands, 1), Some(0));
        assert_eq!(resolve_band(&bands, 3), Some(1));
        assert_eq!(resolve_band(&bands, 4), None);
    }

    #[test]
    fn single_cell_rows_resolve_exactly() {
        let rows = [
            RowBand { top: 10, height: 1 },
            RowBand { top: 11, height: 1 },
        ];
        assert_eq!(resolve_band(&rows, 10), Some(0));
        assert_eq!(resolve_band(&rows, 11), Some(1));
        assert_eq!(resolve_band(&rows, 12), None);
    }

    #[test]
    fn wide_gaps_between_bands_resolve_to_nothing() {
        let bands = [
            RowBand { top: 10, height: 2 },
            RowBand { top: 15, height: 2 },
        ];
        assert_eq!(resolve_band(&bands, 13), None);
    }

    #[test]
    fn zero_height_bands_never_match() {
        let bands = [RowBand { top: 5, height: 0 }];
        assert_eq!(resolve_band(&bands, 5), None);
    }
}
