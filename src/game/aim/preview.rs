use bevy::prelude::*;

/// Marker-rendering collaborator: creates, moves and destroys preview dots.
pub trait MarkerRenderer {
    type Handle: Copy;

    fn create_marker(&mut self) -> Self::Handle;
    fn set_position(&mut self, marker: Self::Handle, position: Vec2);
    fn destroy(&mut self, marker: Self::Handle);
}

/// Fixed-length trajectory preview. Either empty or exactly the count it
/// was shown with.
#[derive(Debug)]
pub struct TrajectoryPreview<H> {
    markers: Vec<H>,
}

impl<H> Default for TrajectoryPreview<H> {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
        }
    }
}

impl<H: Copy> TrajectoryPreview<H> {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_visible(&self) -> bool {
        !self.markers.is_empty()
    }

    /// Allocate `count` markers. No-op if already shown.
    pub fn show<R: MarkerRenderer<Handle = H>>(&mut self, renderer: &mut R, count: usize) {
        if self.is_visible() {
            return;
        }
        self.markers.reserve(count);
        for _ in 0..count {
            self.markers.push(renderer.create_marker());
        }
    }

    /// Move markers onto `positions`, pairwise.
    pub fn update<R, I>(&mut self, renderer: &mut R, positions: I)
    where
        R: MarkerRenderer<Handle = H>,
        I: IntoIterator<Item = Vec2>,
    {
        for (marker, position) in self.markers.iter().zip(positions) {
            renderer.set_position(*marker, position);
        }
    }

    /// Destroy every marker.
    pub fn hide<R: MarkerRenderer<Handle = H>>(&mut self, renderer: &mut R) {
        for marker in self.markers.drain(..) {
            renderer.destroy(marker);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::BTreeMap;

    /// Records marker lifetimes so tests can count live markers.
    #[derive(Default, Debug)]
    pub struct FakeMarkers {
        next: u32,
        pub live: BTreeMap<u32, Vec2>,
        pub created: usize,
        pub destroyed: usize,
    }

    impl MarkerRenderer for FakeMarkers {
        type Handle = u32;

        fn create_marker(&mut self) -> u32 {
            let id = self.next;
            self.next += 1;
            self.created += 1;
            self.live.insert(id, Vec2::ZERO);
            id
        }

        fn set_position(&mut self, marker: u32, position: Vec2) {
            if let Some(slot) = self.live.get_mut(&marker) {
                *slot = position;
            }
        }

        fn destroy(&mut self, marker: u32) {
            if self.live.remove(&marker).is_some() {
                self.destroyed += 1;
            }
        }
    }
}
