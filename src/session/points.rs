use crate::data::model::ControlPoint;

/// Stable handle of a control point and of the marker drawn for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(u64);

/// The control points currently picked by the user, in insertion order.
///
/// Ids are never reused within one set, so a stale id from an old marker
/// cannot remove a newer point.
#[derive(Debug, Clone, Default)]
pub struct ControlPointSet {
    next_id: u64,
    points: Vec<(PointId, ControlPoint)>,
}

impl ControlPointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, point: ControlPoint) -> PointId {
        let id = PointId(self.next_id);
        self.next_id += 1;
        self.points.push((id, point));
        id
    }

    pub fn remove(&mut self, id: PointId) -> Option<ControlPoint> {
        let idx = self.points.iter().position(|(pid, _)| *pid == id)?;
        Some(self.points.remove(idx).1)
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PointId, ControlPoint)> + '_ {
        self.points.iter().copied()
    }

    /// The bare points, insertion order.
    pub fn points(&self) -> Vec<ControlPoint> {
        self.points.iter().map(|(_, p)| *p).collect()
    }
}
