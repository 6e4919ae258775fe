//! Sales ranking
//!
//! Games are ranked by units sold, best seller first. Ranking is dense: games with
//! equal sales share a position and the next distinct sales count takes the next
//! position, with no gaps.

use uuid::Uuid;

/// A game's sales counter and its dense rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedGame {
    /// Game identifier.
    pub game: Uuid,

    /// Units sold.
    pub sales_count: u64,

    /// Dense rank, starting at 1 for the best seller.
    pub rank_position: u64,
}

/// Compute dense rank positions for `(game, sales_count)` pairs, ordered by sales
/// count descending and then by game id so ties have a stable order.
pub fn dense_rank(sales: &[(Uuid, u64)]) -> Vec<RankedGame> {
    let mut sorted = sales.to_vec();

    sorted.sort_by(|(a_game, a_sales), (b_game, b_sales)| {
        b_sales.cmp(a_sales).then_with(|| a_game.cmp(b_game))
    });

    let mut ranked = Vec::with_capacity(sorted.len());
    let mut position = 0_u64;
    let mut previous = None;

    for (game, sales_count) in sorted {
        if previous != Some(sales_count) {
            position += 1;
            previous = Some(sales_count);
        }

        ranked.push(RankedGame {
            game,
            sales_count,
            rank_position: position,
        });
    }

    ranked
}

/// Whether `ranked` is a valid dense ranking of its own sales counts.
pub fn is_dense_ranking(ranked: &[RankedGame]) -> bool {
    let pairs: Vec<(Uuid, u64)> = ranked
        .iter()
        .map(|entry| (entry.game, entry.sales_count))
        .collect();

    let mut expected = dense_rank(&pairs);
    let mut actual = ranked.to_vec();

    expected.sort_by_key(|entry| entry.game);
    actual.sort_by_key(|entry| entry.game);

    expected == actual
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_share_a_position_without_gaps() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let c = Uuid::now_v7();
        let d = Uuid::now_v7();

        let ranked = dense_rank(&[(a, 3), (b, 5), (c, 3), (d, 0)]);

        let position_of = |game: Uuid| {
            ranked
                .iter()
                .find(|entry| entry.game == game)
                .map(|entry| entry.rank_position)
        };

        assert_eq!(position_of(b), Some(1));
        assert_eq!(position_of(a), Some(2));
        assert_eq!(position_of(c), Some(2));
        assert_eq!(position_of(d), Some(3));
    }

    #[test]
    fn empty_input_ranks_nothing() {
        assert!(dense_rank(&[]).is_empty());
    }

    #[test]
    fn gapped_ranking_is_not_dense() {
        let ranked = [
            RankedGame {
                game: Uuid::now_v7(),
                sales_count: 5,
                rank_position: 1,
            },
            RankedGame {
                game: Uuid::now_v7(),
                sales_count: 2,
                rank_position: 3,
            },
        ];

        assert!(!is_dense_ranking(&ranked));
    }

    #[test]
    fn computed_ranking_is_dense() {
        let ranked = dense_rank(&[(Uuid::now_v7(), 1), (Uuid::now_v7(), 1), (Uuid::now_v7(), 9)]);

        assert!(is_dense_ranking(&ranked));
    }
}
