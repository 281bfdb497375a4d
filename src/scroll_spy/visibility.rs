use std::collections::HashMap;

use crate::constants::SCROLL_SPY;

use super::VisibilityEntry;

/// Vertical extent of a section or of the viewport, in page lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub top: usize,
    pub height: usize,
}

impl Span {
    pub fn new(top: usize, height: usize) -> Self {
        Span { top, height }
    }

    pub fn bottom(self) -> usize {
        self.top + self.height
    }
}

/// Share of `section` inside `viewport`, from 0.0 to 1.0.
pub fn intersection_ratio(section: Span, viewport: Span) -> f64 {
    if section.height == 0 {
        return 0.0;
    }
    let top = section.top.max(viewport.top);
    let bottom = section.bottom().min(viewport.bottom());
    let visible = bottom.saturating_sub(top);
    visible as f64 / section.height as f64
}

/// Reports sections whose visibility crossed one of the thresholds since the
/// previous measurement. The first measurement reports every section.
#[derive(Clone, Debug)]
pub struct VisibilityObserver {
    thresholds: Vec<f64>,
    last: HashMap<String, (bool, usize)>,
}

impl Default for VisibilityObserver {
    fn default() -> Self {
        Self::new(SCROLL_SPY.threshold_steps)
    }
}

impl VisibilityObserver {
    /// `steps + 1` evenly spaced thresholds from 0.0 to 1.0.
    pub fn new(steps: usize) -> Self {
        let steps = steps.max(1);
        VisibilityObserver {
            thresholds: (0..=steps).map(|i| i as f64 / steps as f64).collect(),
            last: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    fn bucket(&self, ratio: f64) -> usize {
        self.thresholds
            .iter()
            .filter(|threshold| ratio >= **threshold)
            .count()
    }

    pub fn measure<'a, I>(&mut self, sections: I, viewport: Span) -> Vec<VisibilityEntry>
    where
        I: IntoIterator<Item = (&'a str, Span)>,
    {
        let mut entries = Vec::new();

        for (id, span) in sections {
            let ratio = intersection_ratio(span, viewport);
            let is_intersecting = ratio > 0.0;
            let state = (is_intersecting, self.bucket(ratio));

            if self.last.get(id) == Some(&state) {
                continue;
            }
            self.last.insert(id.to_string(), state);
            entries.push(VisibilityEntry {
                id: id.to_string(),
                is_intersecting,
                ratio,
            });
        }

        entries
    }

    /// Forget previous measurements so the next one reports everything.
    #[cfg(test)]
    pub fn reset(&mut self) {
        self.last.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eleven_thresholds() {
        let observer = VisibilityObserver::default();
        assert_eq!(observer.thresholds().len(), 11);
        assert_eq!(observer.thresholds()[0], 0.0);
        assert_eq!(observer.thresholds()[10], 1.0);
    }

    #[test]
    fn test_intersection_ratio() {
        let viewport = Span::new(10, 20);
        assert_eq!(intersection_ratio(Span::new(10, 10), viewport), 1.0);
        assert_eq!(intersection_ratio(Span::new(0, 20), viewport), 0.5);
        assert_eq!(intersection_ratio(Span::new(30, 5), viewport), 0.0);
        assert_eq!(intersection_ratio(Span::new(0, 0), viewport), 0.0);
        assert_eq!(intersection_ratio(Span::new(25, 10), viewport), 0.5);
    }

    #[test]
    fn test_first_measure_reports_all_sections() {
        let mut observer = VisibilityObserver::default();
        let entries = observer.measure(
            [("home", Span::new(0, 10)), ("program", Span::new(10, 40))],
            Span::new(0, 20),
        );

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].ratio, 1.0);
        assert!(entries[1].is_intersecting);
        assert_eq!(entries[1].ratio, 0.25);
    }

    #[test]
    fn test_only_threshold_crossings_are_reported() {
        let mut observer = VisibilityObserver::default();
        let sections = [("home", Span::new(0, 10)), ("program", Span::new(10, 100))];
        observer.measure(sections, Span::new(0, 20));

        let small_scroll = observer.measure(sections, Span::new(1, 20));
        assert_eq!(small_scroll.len(), 1);
        assert_eq!(small_scroll[0].id, "home");

        let unchanged = observer.measure(sections, Span::new(1, 20));
        assert!(unchanged.is_empty());

        let past_home = observer.measure(sections, Span::new(10, 20));
        assert_eq!(past_home.len(), 2);
        assert!(!past_home[0].is_intersecting);
    }

    #[test]
    fn test_reset_reports_everything_again() {
        let mut observer = VisibilityObserver::default();
        let sections = [("home", Span::new(0, 10))];
        observer.measure(sections, Span::new(0, 20));
        observer.reset();
        assert_eq!(observer.measure(sections, Span::new(0, 20)).len(), 1);
    }
}
