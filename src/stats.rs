use crate::finger::{Finger, FingerMap, Hand};
use itertools::Itertools;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Number of fixed categories reported by [`StatCollector::summarize`]
pub const CATEGORY_COUNT: usize = 4 + 2 * Finger::ALL.len();

/// Timed interval between two consecutive valid keystrokes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: char,
    pub expected: char,
    pub actual: char,
    pub duration: Duration,
    pub correct: bool,
}

impl Transition {
    pub fn new(from: char, expected: char, actual: char, duration: Duration) -> Self {
        Self {
            from,
            expected,
            actual,
            duration,
            correct: actual == expected,
        }
    }

    pub fn involves_space(&self) -> bool {
        self.from == ' ' || self.actual == ' '
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    /// Source finger on `from`, target on the other hand
    CrossHand { from: Hand, include_space: bool },
    /// Source and target are both this finger
    SameFinger(Finger),
    /// Target is this finger, source is another finger of the same hand
    DifferentFinger(Finger),
}

impl Category {
    /// All categories in report order
    pub fn all() -> Vec<Category> {
        let cross = [
            (Hand::Left, true),
            (Hand::Right, true),
            (Hand::Left, false),
            (Hand::Right, false),
        ]
        .into_iter()
        .map(|(from, include_space)| Category::CrossHand {
            from,
            include_space,
        });
        let same = Finger::ALL.into_iter().map(Category::SameFinger);
        let different = Finger::ALL.into_iter().map(Category::DifferentFinger);

        cross.chain(same).chain(different).collect()
    }

    pub fn matches(&self, from: Finger, to: Finger, involves_space: bool) -> bool {
        match *self {
            Category::CrossHand {
                from: hand,
                include_space,
            } => from.hand() == hand && to.hand() != hand && (include_space || !involves_space),
            Category::SameFinger(finger) => from == finger && to == finger,
            Category::DifferentFinger(finger) => {
                to == finger && from != finger && from.hand() == finger.hand()
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            Category::CrossHand {
                from,
                include_space,
            } => {
                let (src, dst) = match from {
                    Hand::Left => ("Left", "Right"),
                    Hand::Right => ("Right", "Left"),
                };
                if *include_space {
                    format!("{src} -> {dst}")
                } else {
                    format!("{src} -> {dst} (no space)")
                }
            }
            Category::SameFinger(finger) => format!("{} (Same)", finger.short_name()),
            Category::DifferentFinger(finger) => format!("{} (Diff)", finger.short_name()),
        }
    }
}

/// Latency summary for one category
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatSummary {
    pub count: usize,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub median: Duration,
    pub min_transition: Option<Transition>,
    pub max_transition: Option<Transition>,
}

impl StatSummary {
    /// Summarize a set of transitions.
    ///
    /// Min and max keep the first transition reaching the extreme. The mean is
    /// the truncated integer quotient of the nanosecond sum, and the median is
    /// the element at `count / 2` of the ascending order, so even-sized sets
    /// report the upper middle.
    pub fn from_transitions(transitions: &[Transition]) -> Self {
        let Some(first) = transitions.first() else {
            return Self::default();
        };

        let mut min_t = first;
        let mut max_t = first;
        for t in &transitions[1..] {
            if t.duration < min_t.duration {
                min_t = t;
            }
            if t.duration > max_t.duration {
                max_t = t;
            }
        }

        let count = transitions.len();
        let sum: u128 = transitions.iter().map(|t| t.duration.as_nanos()).sum();
        let mean = Duration::from_nanos((sum / count as u128) as u64);

        let median = transitions
            .iter()
            .map(|t| t.duration)
            .sorted()
            .nth(count / 2)
            .unwrap_or_default();

        Self {
            count,
            min: min_t.duration,
            max: max_t.duration,
            mean,
            median,
            min_transition: Some(*min_t),
            max_transition: Some(*max_t),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    pub category: Category,
    pub stat: StatSummary,
}

/// Per-category summaries in report order
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    rows: Vec<CategoryStat>,
}

impl Summary {
    pub fn rows(&self) -> &[CategoryStat] {
        &self.rows
    }

    pub fn get(&self, category: Category) -> Option<&StatSummary> {
        self.rows
            .iter()
            .find(|row| row.category == category)
            .map(|row| &row.stat)
    }
}

/// Records keystroke transitions and derives latency statistics from them
#[derive(Debug, Clone)]
pub struct StatCollector<'a> {
    fingers: &'a FingerMap,
    transitions: Vec<Transition>,
    previous: Option<(char, Instant)>,
}

impl<'a> StatCollector<'a> {
    pub fn new(fingers: &'a FingerMap) -> Self {
        Self {
            fingers,
            transitions: Vec::new(),
            previous: None,
        }
    }

    pub fn record(&mut self, actual: char, expected: char) -> Option<Transition> {
        self.record_at(actual, expected, Instant::now())
    }

    /// Record a keystroke that happened at `now`.
    ///
    /// Keystrokes outside the supported set are dropped without touching the
    /// previous keystroke. Every other keystroke, right or wrong, becomes the
    /// new reference point for latency; a transition is only produced once a
    /// previous keystroke exists.
    pub fn record_at(&mut self, actual: char, expected: char, now: Instant) -> Option<Transition> {
        if !self.fingers.is_valid(actual) {
            tracing::trace!(?actual, "ignoring keystroke outside supported set");
            return None;
        }

        let mut recorded = None;
        if let Some((from, at)) = self.previous {
            let elapsed = now.saturating_duration_since(at);
            let transition = Transition::new(from, expected, actual, elapsed);
            self.transitions.push(transition);
            recorded = Some(transition);
        }

        self.previous = Some((actual, now));
        recorded
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn fingers(&self) -> &FingerMap {
        self.fingers
    }

    /// Recompute every category from the full log. Only correct transitions
    /// are counted; the log itself is left untouched.
    pub fn summarize(&self) -> Summary {
        let categories = Category::all();
        let mut buckets: Vec<Vec<Transition>> = vec![Vec::new(); categories.len()];

        for t in self.transitions.iter().filter(|t| t.correct) {
            let from = self.fingers.lookup(t.from);
            let to = self.fingers.lookup(t.actual);
            let space = t.involves_space();

            for (category, bucket) in categories.iter().zip(buckets.iter_mut()) {
                if category.matches(from, to, space) {
                    bucket.push(*t);
                }
            }
        }

        let rows = categories
            .into_iter()
            .zip(buckets)
            .map(|(category, bucket)| CategoryStat {
                category,
                stat: StatSummary::from_transitions(&bucket),
            })
            .collect();

        Summary { rows }
    }
}
