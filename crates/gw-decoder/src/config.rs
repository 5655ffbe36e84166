/// Which events a report should show.
///
/// Decoding and validation always cover the whole stream; the window only
/// decides which events are handed to the sink's display path.
///
/// ```text
///   enabled  jump_to  limit   shows
///   false    0        any     nothing
///   true     0        0       header + every event
///   true     0        N       header + events 1..=N
///   any      J > 0    0       events J..
///   any      J > 0    N       events J..J+N
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayWindow {
    /// Display from the first event (the `-v` switch).
    pub enabled: bool,

    /// First event to display, 1-based. Non-zero enables display on its
    /// own, starting at that event. 0 means no jump.
    pub jump_to: u64,

    /// Number of events to display before going quiet. 0 means no limit.
    pub limit: u64,
}

impl Default for DisplayWindow {
    /// Show everything, header included.
    fn default() -> Self {
        Self {
            enabled: true,
            jump_to: 0,
            limit: 0,
        }
    }
}

impl DisplayWindow {
    /// A window that never shows anything.
    pub fn quiet() -> Self {
        Self {
            enabled: false,
            jump_to: 0,
            limit: 0,
        }
    }

    /// The header is only shown when display starts at the beginning.
    pub fn shows_header(&self) -> bool {
        self.enabled && self.jump_to == 0
    }

    /// Whether event `number` (1-based) falls inside the window.
    pub fn admits(&self, number: u64) -> bool {
        if !self.enabled && self.jump_to == 0 {
            return false;
        }
        let start = self.jump_to.max(1);
        number >= start && (self.limit == 0 || number - start < self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(window: DisplayWindow) -> Vec<u64> {
        (1..=10).filter(|&n| window.admits(n)).collect()
    }

    #[test]
    fn default_shows_everything() {
        let window = DisplayWindow::default();
        assert!(window.shows_header());
        assert_eq!(shown(window).len(), 10);
    }

    #[test]
    fn quiet_shows_nothing() {
        let window = DisplayWindow::quiet();
        assert!(!window.shows_header());
        assert!(shown(window).is_empty());
    }

    #[test]
    fn limit_counts_from_first_event() {
        let window = DisplayWindow {
            limit: 3,
            ..DisplayWindow::default()
        };
        assert_eq!(shown(window), vec![1, 2, 3]);
    }

    #[test]
    fn jump_enables_display_without_verbose() {
        let window = DisplayWindow {
            enabled: false,
            jump_to: 4,
            limit: 0,
        };
        assert!(!window.shows_header());
        assert_eq!(shown(window), vec![4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn jump_and_limit() {
        let window = DisplayWindow {
            enabled: true,
            jump_to: 5,
            limit: 3,
        };
        assert_eq!(shown(window), vec![5, 6, 7]);
    }

    #[test]
    fn limit_without_display_stays_quiet() {
        let window = DisplayWindow {
            enabled: false,
            jump_to: 0,
            limit: 3,
        };
        assert!(shown(window).is_empty());
    }
}
