use std::collections::{HashMap, HashSet};

mod visibility;

pub use visibility::{Span, VisibilityObserver};

/// A menu entry pointing at a page section through an `#id` fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl NavLink {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        NavLink {
            label: label.into(),
            href: href.into(),
        }
    }

    /// Section id targeted by the link, for `#id` hrefs only.
    pub fn target_id(&self) -> Option<&str> {
        self.href
            .strip_prefix('#')
            .filter(|id| !id.is_empty())
    }
}

/// Section id to menu link position. Built once from the menu.
#[derive(Clone, Debug, Default)]
pub struct NavLinkMap {
    links: Vec<NavLink>,
    by_id: HashMap<String, usize>,
}

impl NavLinkMap {
    pub fn new(links: Vec<NavLink>) -> Self {
        let mut by_id = HashMap::new();
        for (index, link) in links.iter().enumerate() {
            if let Some(id) = link.target_id() {
                by_id.insert(id.to_string(), index);
            }
        }
        NavLinkMap { links, by_id }
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }
}

/// One visibility notification for a section.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityEntry {
    pub id: String,
    pub is_intersecting: bool,
    pub ratio: f64,
}

/// Highlights the menu link of the most visible section.
#[derive(Clone, Debug)]
pub struct ScrollSpy {
    links: NavLinkMap,
    ratios: Vec<(String, f64)>,
    excluded: HashSet<String>,
    active_link: Option<usize>,
}

impl ScrollSpy {
    /// `section_ids` in document order; ties between equally visible sections
    /// go to the earlier one.
    pub fn new<I, S>(links: NavLinkMap, section_ids: I, excluded: &[String]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScrollSpy {
            links,
            ratios: section_ids.into_iter().map(|id| (id.into(), 0.0)).collect(),
            excluded: excluded.iter().cloned().collect(),
            active_link: None,
        }
    }

    /// Records a batch of notifications, then re-selects the active link.
    pub fn observe(&mut self, entries: &[VisibilityEntry]) {
        for entry in entries {
            let ratio = if entry.is_intersecting {
                entry.ratio
            } else {
                0.0
            };
            self.set_ratio(&entry.id, ratio);
        }

        let best = self.most_visible().map(str::to_string);
        self.set_active_id(best.as_deref());
    }

    /// Section with the strictly highest positive ratio.
    pub fn most_visible(&self) -> Option<&str> {
        let mut best: Option<&str> = None;
        let mut best_ratio = 0.0;
        for (id, ratio) in &self.ratios {
            if *ratio > best_ratio {
                best_ratio = *ratio;
                best = Some(id.as_str());
            }
        }
        best
    }

    /// Same-page navigation to `#id`. Bypasses the ratio table; an empty
    /// fragment changes nothing.
    pub fn navigate_hash(&mut self, hash: &str) {
        let id = hash.strip_prefix('#').unwrap_or(hash);
        if id.is_empty() {
            return;
        }
        self.set_active_id(Some(id));
    }

    fn set_ratio(&mut self, id: &str, ratio: f64) {
        match self.ratios.iter_mut().find(|(known, _)| known == id) {
            Some((_, slot)) => *slot = ratio,
            None => self.ratios.push((id.to_string(), ratio)),
        }
    }

    fn set_active_id(&mut self, id: Option<&str>) {
        let next = id
            .filter(|id| !self.excluded.contains(*id))
            .and_then(|id| self.links.index_of(id));

        if next != self.active_link {
            tracing::debug!(
                section = id.unwrap_or(""),
                link = ?next,
                "scroll spy active link changed"
            );
        }
        self.active_link = next;
    }

    #[cfg(test)]
    pub fn active_link(&self) -> Option<usize> {
        self.active_link
    }

    pub fn is_active(&self, link_index: usize) -> bool {
        self.active_link == Some(link_index)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_link
            .and_then(|index| self.links.links().get(index))
            .and_then(NavLink::target_id)
    }

    #[cfg(test)]
    pub fn ratio(&self, id: &str) -> f64 {
        self.ratios
            .iter()
            .find(|(known, _)| known == id)
            .map_or(0.0, |(_, ratio)| *ratio)
    }

    pub fn links(&self) -> &NavLinkMap {
        &self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spy(sections: &[&str]) -> ScrollSpy {
        let links = NavLinkMap::new(
            sections
                .iter()
                .map(|id| NavLink::new(id.to_uppercase(), format!("#{id}")))
                .collect(),
        );
        ScrollSpy::new(links, sections.iter().copied(), &["home".to_string()])
    }

    fn entry(id: &str, is_intersecting: bool, ratio: f64) -> VisibilityEntry {
        VisibilityEntry {
            id: id.to_string(),
            is_intersecting,
            ratio,
        }
    }

    #[test]
    fn test_most_visible_section_wins() {
        let mut spy = spy(&["a", "b", "c"]);
        spy.observe(&[entry("a", true, 0.4), entry("b", true, 0.9), entry("c", false, 0.0)]);

        assert_eq!(spy.active_id(), Some("b"));
        assert!(spy.is_active(1));
        assert!(!spy.is_active(0));
        assert!(!spy.is_active(2));
    }

    #[test]
    fn test_first_section_wins_ties() {
        let mut spy = spy(&["a", "b"]);
        spy.observe(&[entry("b", true, 0.5), entry("a", true, 0.5)]);
        assert_eq!(spy.active_id(), Some("a"));
    }

    #[test]
    fn test_not_intersecting_counts_as_zero() {
        let mut spy = spy(&["a", "b"]);
        spy.observe(&[entry("a", true, 0.3), entry("b", false, 0.8)]);

        assert_eq!(spy.active_id(), Some("a"));
        assert_eq!(spy.ratio("b"), 0.0);
    }

    #[test]
    fn test_no_visible_section_clears_links() {
        let mut spy = spy(&["a", "b"]);
        spy.observe(&[entry("a", true, 0.6)]);
        assert_eq!(spy.active_id(), Some("a"));

        spy.observe(&[entry("a", false, 0.0)]);
        assert_eq!(spy.active_link(), None);
    }

    #[test]
    fn test_excluded_section_clears_links() {
        let mut spy = spy(&["home", "program"]);
        spy.observe(&[entry("program", true, 0.2)]);
        assert_eq!(spy.active_id(), Some("program"));

        spy.observe(&[entry("home", true, 0.8)]);
        assert_eq!(spy.active_link(), None);
    }

    #[test]
    fn test_ratios_accumulate_across_batches() {
        let mut spy = spy(&["a", "b"]);
        spy.observe(&[entry("a", true, 0.7)]);
        spy.observe(&[entry("b", true, 0.4)]);
        assert_eq!(spy.active_id(), Some("a"));
    }

    #[test]
    fn test_navigate_hash_forces_target() {
        let mut spy = spy(&["home", "a", "b"]);
        spy.observe(&[entry("a", true, 1.0)]);

        spy.navigate_hash("#b");
        assert_eq!(spy.active_id(), Some("b"));

        spy.navigate_hash("#");
        assert_eq!(spy.active_id(), Some("b"));

        spy.navigate_hash("#home");
        assert_eq!(spy.active_link(), None);

        spy.navigate_hash("#missing");
        assert_eq!(spy.active_link(), None);
    }

    #[test]
    fn test_link_map_ignores_external_hrefs() {
        let map = NavLinkMap::new(vec![
            NavLink::new("Home", "#home"),
            NavLink::new("Site", "https://example.org"),
            NavLink::new("Top", "#"),
        ]);

        assert_eq!(map.index_of("home"), Some(0));
        assert_eq!(map.links().len(), 3);
        assert_eq!(map.links()[1].target_id(), None);
        assert_eq!(map.links()[2].target_id(), None);
    }
}
