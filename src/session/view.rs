use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Review,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Browse => "Browse",
            Mode::Review => "Review",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Browse => Mode::Review,
            Mode::Review => Mode::Browse,
        }
    }
}

/// The visible, ordered subset of the collection, as positions into it.
///
/// Browse keeps a circular cursor. Review keeps a forward-only cursor that
/// never wraps and ends in a completed state once the last card is rated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Browse {
        order: Vec<usize>,
        cursor: usize,
    },
    Review {
        queue: Vec<usize>,
        cursor: usize,
        complete: bool,
    },
}

impl View {
    pub fn browse(order: Vec<usize>) -> Self {
        View::Browse { order, cursor: 0 }
    }

    pub fn review(queue: Vec<usize>) -> Self {
        View::Review {
            queue,
            cursor: 0,
            complete: false,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            View::Browse { .. } => Mode::Browse,
            View::Review { .. } => Mode::Review,
        }
    }

    pub fn entries(&self) -> &[usize] {
        match self {
            View::Browse { order, .. } => order,
            View::Review { queue, .. } => queue,
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn cursor(&self) -> usize {
        match self {
            View::Browse { cursor, .. } | View::Review { cursor, .. } => *cursor,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, View::Review { complete: true, .. })
    }

    /// Collection position under the cursor, if any.
    pub fn current(&self) -> Option<usize> {
        if self.is_complete() {
            return None;
        }
        self.entries().get(self.cursor()).copied()
    }

    /// Moves the cursor by `step`. Returns false and leaves the cursor alone
    /// when the move is not allowed.
    pub fn step(&mut self, step: isize) -> bool {
        match self {
            View::Browse { order, cursor } => {
                if order.is_empty() {
                    return false;
                }
                let len = order.len();
                let offset = step.rem_euclid(len as isize) as usize;
                *cursor = (*cursor + offset) % len;
                true
            }
            View::Review {
                queue,
                cursor,
                complete,
            } => {
                if queue.is_empty() || *complete {
                    return false;
                }
                let Some(next) = (*cursor as isize).checked_add(step) else {
                    return false;
                };
                if next < 0 || next >= queue.len() as isize {
                    return false;
                }
                *cursor = next as usize;
                true
            }
        }
    }

    /// Advances past a rated card, entering the completed state at the end.
    pub(super) fn advance_after_rating(&mut self) -> bool {
        if self.step(1) {
            return true;
        }
        if let View::Review { complete, .. } = self {
            *complete = true;
        }
        false
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        match self {
            View::Browse { order, cursor } if !order.is_empty() => {
                order.shuffle(rng);
                *cursor = 0;
                true
            }
            _ => false,
        }
    }

    pub(super) fn set_browse_cursor(&mut self, position: usize) {
        if let View::Browse { order, cursor } = self
            && position < order.len()
        {
            *cursor = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn browse_wraps_both_directions() {
        let mut view = View::browse(vec![0, 1, 2]);
        assert!(view.step(-1));
        assert_eq!(view.cursor(), 2);
        assert!(view.step(1));
        assert_eq!(view.cursor(), 0);
        assert!(view.step(7));
        assert_eq!(view.cursor(), 1);
    }

    #[test]
    fn review_never_wraps() {
        let mut view = View::review(vec![4, 5]);
        assert!(!view.step(-1));
        assert_eq!(view.cursor(), 0);
        assert!(view.step(1));
        assert!(!view.step(1));
        assert_eq!(view.cursor(), 1);
        assert!(!view.is_complete());
        assert_eq!(view.current(), Some(5));
    }

    #[test]
    fn huge_steps_do_not_overflow() {
        let mut browse = View::browse(vec![0, 1, 2]);
        assert!(browse.step(1));
        assert!(browse.step(isize::MAX));
        // isize::MAX % 3 == 1
        assert_eq!(browse.cursor(), 2);
        assert!(browse.step(isize::MIN));
        assert_eq!(browse.cursor(), 0);

        let mut review = View::review(vec![0, 1, 2]);
        assert!(review.step(1));
        assert!(!review.step(isize::MAX));
        assert!(!review.step(isize::MIN));
        assert_eq!(review.cursor(), 1);
        assert_eq!(review.current(), Some(1));
    }

    #[test]
    fn empty_views_reject_navigation() {
        assert!(!View::browse(vec![]).step(1));
        assert!(!View::review(vec![]).step(1));
        assert_eq!(View::browse(vec![]).current(), None);
    }

    #[test]
    fn rating_the_last_card_completes_review() {
        let mut view = View::review(vec![3]);
        assert!(!view.advance_after_rating());
        assert!(view.is_complete());
        assert_eq!(view.current(), None);
        assert!(!view.step(-1));
    }

    #[test]
    fn shuffle_only_in_browse() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut browse = View::browse((0..20).collect());
        browse.step(3);
        assert!(browse.shuffle(&mut rng));
        assert_eq!(browse.cursor(), 0);
        let mut sorted = browse.entries().to_vec();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());

        let mut review = View::review(vec![0, 1, 2]);
        assert!(!review.shuffle(&mut rng));
        assert!(!View::browse(vec![]).shuffle(&mut rng));
    }
}
