use mahjong_scorekeeper::scoring::{Match, PlayerId, Points};

/// Fluent checks over a match state.
pub struct ScoreAssertion<'a> {
    state: &'a Match,
}

#[allow(dead_code)]
impl<'a> ScoreAssertion<'a> {
    pub fn of(state: &'a Match) -> Self {
        Self { state }
    }

    pub fn score(self, id: PlayerId, expected_tenths: i64) -> Self {
        let actual = self.state.player(id).unwrap().score;
        assert_eq!(
            actual,
            Points::from_tenths(expected_tenths),
            "score of player {}",
            id
        );
        self
    }

    pub fn zero_sum(self) -> Self {
        let total: Points = self.state.players.iter().map(|p| p.score).sum();
        assert_eq!(total, Points::ZERO, "scores must sum to zero");
        self
    }

    pub fn dealer(self, id: PlayerId, retention: u32) -> Self {
        let dealer = self.state.dealer().unwrap();
        assert_eq!((dealer.id, dealer.dealer_retention_count), (id, retention));
        self
    }

    pub fn rotation(self, expected: u32) -> Self {
        assert_eq!(self.state.rotation_count, expected);
        self
    }

    /// No streak may carry a total without a count, or the other way round.
    pub fn streaks_consistent(self) -> Self {
        for (key, entry) in self.state.active_streaks() {
            assert!(entry.count > 0, "{:?} has zero count", key);
            assert!(!entry.total_amount.is_zero(), "{:?} has zero total", key);
        }
        self
    }
}
