use crate::{core::map::SvgMap, MapError, Result};

/// An explicit collection of maps, looked up by insertion index or id.
///
/// Removing a map leaves its slot empty, so indices handed out earlier keep
/// pointing at the same map.
#[derive(Default)]
pub struct MapRegistry {
    maps: Vec<Option<SvgMap>>,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a map and returns its index
    pub fn add(&mut self, map: SvgMap) -> usize {
        log::debug!("registering map '{}' at index {}", map.id(), self.maps.len());
        self.maps.push(Some(map));
        self.maps.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&SvgMap> {
        self.maps.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SvgMap> {
        self.maps.get_mut(index).and_then(Option::as_mut)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&SvgMap> {
        self.iter().find(|map| map.id() == id)
    }

    pub fn get_by_id_mut(&mut self, id: &str) -> Option<&mut SvgMap> {
        self.maps.iter_mut().flatten().find(|map| map.id() == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.maps
            .iter()
            .position(|slot| slot.as_ref().map_or(false, |map| map.id() == id))
    }

    /// Takes a map out of the registry; dropping it stops its worker.
    pub fn remove(&mut self, id: &str) -> Result<SvgMap> {
        let index = self
            .index_of(id)
            .ok_or_else(|| MapError::UnknownMap(id.to_string()))?;
        self.maps[index]
            .take()
            .ok_or_else(|| MapError::UnknownMap(id.to_string()))
    }

    /// Number of live maps
    pub fn len(&self) -> usize {
        self.maps.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &SvgMap> {
        self.maps.iter().flatten()
    }

    /// Drains worker results for every map
    pub fn poll_background(&mut self) -> usize {
        self.maps
            .iter_mut()
            .flatten()
            .map(SvgMap::poll_background)
            .sum()
    }
}
