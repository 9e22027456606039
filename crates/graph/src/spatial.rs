use geo::{Point, Rect};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// Bounding rectangle tagged with the position of its zone
type BoundsItem = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// R-tree over zone bounding rectangles for candidate pruning
pub(crate) struct BoundsIndex {
    tree: RTree<BoundsItem>,
}

impl BoundsIndex {
    /// Index `(position, bounds)` entries; entries without bounds are skipped
    pub(crate) fn build(entries: impl IntoIterator<Item = (usize, Option<Rect<f64>>)>) -> Self {
        let items: Vec<BoundsItem> = entries
            .into_iter()
            .filter_map(|(idx, rect)| {
                let rect = rect?;
                let envelope = Rectangle::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                );
                Some(GeomWithData::new(envelope, idx))
            })
            .collect();

        Self {
            tree: RTree::bulk_load(items),
        }
    }

    /// Positions whose bounds intersect or touch `rect`, ascending
    pub(crate) fn intersecting(&self, rect: &Rect<f64>) -> Vec<usize> {
        let aabb = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&aabb)
            .map(|item| item.data)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Positions whose bounds contain `point`, ascending
    pub(crate) fn containing(&self, point: &Point<f64>) -> Vec<usize> {
        let aabb = AABB::from_point([point.x(), point.y()]);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&aabb)
            .map(|item| item.data)
            .collect();
        hits.sort_unstable();
        hits
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.size()
    }
}
