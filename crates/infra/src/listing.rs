//! Search, sort and tab/stat derivation for the tournament dashboard.
//!
//! Everything here is pure: the caller fetches rows (newest first) and this
//! module decides what is shown and in which order.

use std::collections::HashSet;

use uuid::Uuid;

use crate::models::TournamentRow;
use crate::repos::tournaments::TournamentStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Soonest start first.
    #[default]
    StartDate,
    /// Largest prize pool first.
    PrizePool,
    /// Cheapest entry first.
    EntryFee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Upcoming,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(&self, status: TournamentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Upcoming => status == TournamentStatus::Upcoming,
            StatusFilter::Active => status == TournamentStatus::Active,
            StatusFilter::Completed => status == TournamentStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    pub search: String,
    pub sort: SortKey,
    pub status: StatusFilter,
}

/// Case-insensitive substring match on title or description. An empty term
/// matches everything.
pub fn matches_search(tournament: &TournamentRow, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    tournament.title.to_lowercase().contains(&needle)
        || tournament
            .description
            .as_deref()
            .map(|d| d.to_lowercase().contains(&needle))
            .unwrap_or(false)
}

/// Filters then sorts. Sorting is stable, so equal keys keep fetch order.
pub fn apply(rows: Vec<TournamentRow>, query: &ListingQuery) -> Vec<TournamentRow> {
    let mut out: Vec<TournamentRow> = rows
        .into_iter()
        .filter(|t| matches_search(t, &query.search) && query.status.matches(t.status))
        .collect();

    match query.sort {
        SortKey::StartDate => out.sort_by(|a, b| a.start_date.cmp(&b.start_date)),
        SortKey::PrizePool => out.sort_by(|a, b| b.prize_pool.cmp(&a.prize_pool)),
        SortKey::EntryFee => out.sort_by(|a, b| a.entry_fee.cmp(&b.entry_fee)),
    }

    out
}

#[derive(Debug, Clone, Default)]
pub struct DashboardTabs {
    pub all: Vec<TournamentRow>,
    pub upcoming: Vec<TournamentRow>,
    pub active: Vec<TournamentRow>,
    pub my: Vec<TournamentRow>,
}

/// Splits an already filtered and sorted list into the dashboard tabs.
pub fn split_tabs(listed: &[TournamentRow], registered: &HashSet<Uuid>) -> DashboardTabs {
    let pick = |pred: &dyn Fn(&TournamentRow) -> bool| -> Vec<TournamentRow> {
        listed.iter().filter(|t| pred(t)).cloned().collect()
    };

    DashboardTabs {
        all: listed.to_vec(),
        upcoming: pick(&|t| t.status == TournamentStatus::Upcoming),
        active: pick(&|t| t.status == TournamentStatus::Active),
        my: pick(&|t| registered.contains(&t.id)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total: usize,
    pub upcoming: usize,
    pub active: usize,
    pub registered: usize,
}

/// Headline counters, computed over the unfiltered list.
pub fn stats(all: &[TournamentRow], registered: &HashSet<Uuid>) -> DashboardStats {
    DashboardStats {
        total: all.len(),
        upcoming: all
            .iter()
            .filter(|t| t.status == TournamentStatus::Upcoming)
            .count(),
        active: all
            .iter()
            .filter(|t| t.status == TournamentStatus::Active)
            .count(),
        registered: registered.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::tournaments::TournamentType;
    use chrono::{Duration, TimeZone, Utc};

    fn tournament(title: &str) -> TournamentRow {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        TournamentRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            entry_fee: 0,
            prize_pool: 0,
            max_players: 100,
            current_players: 0,
            start_date: base,
            status: TournamentStatus::Upcoming,
            organizer_id: Uuid::new_v4(),
            tournament_type: TournamentType::Squad,
            map: Some("Erangel".into()),
            rules: None,
            created_at: base,
        }
    }

    fn titles(rows: &[TournamentRow]) -> Vec<&str> {
        rows.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn sorts_by_entry_fee_ascending() {
        let rows = [("a", 50), ("b", 10), ("c", 30)]
            .into_iter()
            .map(|(n, fee)| TournamentRow {
                entry_fee: fee,
                ..tournament(n)
            })
            .collect();
        let query = ListingQuery {
            sort: SortKey::EntryFee,
            ..Default::default()
        };

        let fees: Vec<i32> = apply(rows, &query).iter().map(|t| t.entry_fee).collect();
        assert_eq!(fees, vec![10, 30, 50]);
    }

    #[test]
    fn sorts_by_prize_pool_descending() {
        let rows = [("a", 100), ("b", 500), ("c", 200)]
            .into_iter()
            .map(|(n, pool)| TournamentRow {
                prize_pool: pool,
                ..tournament(n)
            })
            .collect();
        let query = ListingQuery {
            sort: SortKey::PrizePool,
            ..Default::default()
        };

        let pools: Vec<i32> = apply(rows, &query).iter().map(|t| t.prize_pool).collect();
        assert_eq!(pools, vec![500, 200, 100]);
    }

    #[test]
    fn sorts_by_start_date_soonest_first() {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let rows = vec![
            TournamentRow {
                start_date: base + Duration::days(3),
                ..tournament("late")
            },
            TournamentRow {
                start_date: base,
                ..tournament("early")
            },
            TournamentRow {
                start_date: base + Duration::days(1),
                ..tournament("middle")
            },
        ];

        let sorted = apply(rows, &ListingQuery::default());
        assert_eq!(titles(&sorted), vec!["early", "middle", "late"]);
    }

    #[test]
    fn equal_keys_keep_fetch_order() {
        let rows = vec![
            TournamentRow {
                entry_fee: 20,
                ..tournament("first")
            },
            TournamentRow {
                entry_fee: 10,
                ..tournament("cheap")
            },
            TournamentRow {
                entry_fee: 20,
                ..tournament("second")
            },
            TournamentRow {
                entry_fee: 20,
                ..tournament("third")
            },
        ];
        let query = ListingQuery {
            sort: SortKey::EntryFee,
            ..Default::default()
        };

        assert_eq!(
            titles(&apply(rows, &query)),
            vec!["cheap", "first", "second", "third"]
        );
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let t = tournament("Erangel Showdown");
        assert!(matches_search(&t, "eran"));
        assert!(matches_search(&t, "SHOWDOWN"));
        assert!(!matches_search(&t, "miramar"));
    }

    #[test]
    fn search_matches_description() {
        let t = TournamentRow {
            description: Some("Weekly Miramar scrims".into()),
            ..tournament("Scrims")
        };
        assert!(matches_search(&t, "miramar"));
        assert!(!matches_search(&tournament("Scrims"), "miramar"));
    }

    #[test]
    fn empty_search_matches_all() {
        let rows = vec![tournament("a"), tournament("b")];
        assert_eq!(apply(rows, &ListingQuery::default()).len(), 2);
    }

    #[test]
    fn status_filter_keeps_only_matching() {
        let rows = vec![
            tournament("soon"),
            TournamentRow {
                status: TournamentStatus::Active,
                ..tournament("live")
            },
            TournamentRow {
                status: TournamentStatus::Completed,
                ..tournament("done")
            },
        ];
        let query = ListingQuery {
            status: StatusFilter::Active,
            ..Default::default()
        };

        assert_eq!(titles(&apply(rows, &query)), vec!["live"]);
    }

    #[test]
    fn tabs_split_by_status_and_registration() {
        let soon = tournament("soon");
        let live = TournamentRow {
            status: TournamentStatus::Active,
            ..tournament("live")
        };
        let done = TournamentRow {
            status: TournamentStatus::Completed,
            ..tournament("done")
        };
        let registered: HashSet<Uuid> = [live.id, done.id].into_iter().collect();
        let listed = vec![soon, live, done];

        let tabs = split_tabs(&listed, &registered);
        assert_eq!(titles(&tabs.all), vec!["soon", "live", "done"]);
        assert_eq!(titles(&tabs.upcoming), vec!["soon"]);
        assert_eq!(titles(&tabs.active), vec!["live"]);
        assert_eq!(titles(&tabs.my), vec!["live", "done"]);
    }

    #[test]
    fn stats_count_over_full_list() {
        let all = vec![
            tournament("a"),
            tournament("b"),
            TournamentRow {
                status: TournamentStatus::Active,
                ..tournament("c")
            },
            TournamentRow {
                status: TournamentStatus::Completed,
                ..tournament("d")
            },
        ];
        let registered: HashSet<Uuid> = [all[0].id].into_iter().collect();

        assert_eq!(
            stats(&all, &registered),
            DashboardStats {
                total: 4,
                upcoming: 2,
                active: 1,
                registered: 1,
            }
        );
    }
}
