use async_graphql::{Context, Object, Result, ID};
use uuid::Uuid;

use crate::auth::Session;
use crate::gql::domains::registrations::service::registered_tournament_ids;
use crate::gql::error::{DomainResultExt, ResultExt};
use crate::state::AppState;
use infra::listing::{self, ListingQuery};
use infra::repos::TournamentRepo;

use super::service;
use super::types::{CreateTournamentInput, Dashboard, StatusFilter, Tournament, TournamentSort};

fn listing_query(
    search: Option<String>,
    sort_by: Option<TournamentSort>,
    status: Option<StatusFilter>,
) -> ListingQuery {
    ListingQuery {
        search: search.unwrap_or_default(),
        sort: sort_by.unwrap_or_default().into(),
        status: status.unwrap_or_default().into(),
    }
}

#[derive(Default)]
pub struct TournamentQuery;

#[Object]
impl TournamentQuery {
    /// Tournaments matching the search term and status filter, in the
    /// requested order.
    async fn tournaments(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        sort_by: Option<TournamentSort>,
        status: Option<StatusFilter>,
    ) -> Result<Vec<Tournament>> {
        let state = ctx.data::<AppState>()?;

        let rows = TournamentRepo::new(state.db.clone())
            .list_all()
            .await
            .gql_err("Database operation failed")?;

        let query = listing_query(search, sort_by, status);
        Ok(listing::apply(rows, &query)
            .into_iter()
            .map(Tournament::from)
            .collect())
    }

    async fn tournament(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Tournament>> {
        let state = ctx.data::<AppState>()?;
        let tournament_id = Uuid::parse_str(id.as_str()).gql_err("Invalid tournament ID")?;

        let row = TournamentRepo::new(state.db.clone())
            .get(tournament_id)
            .await
            .gql_err("Database operation failed")?;

        Ok(row.map(Tournament::from))
    }

    /// Dashboard tabs and stats for the caller.
    async fn dashboard(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        sort_by: Option<TournamentSort>,
        status: Option<StatusFilter>,
    ) -> Result<Dashboard> {
        let state = ctx.data::<AppState>()?;
        let session = Session::from_ctx(ctx);
        let repo = TournamentRepo::new(state.db.clone());

        let (rows, registered) = tokio::try_join!(
            repo.list_all(),
            registered_tournament_ids(&state.db, &session),
        )
        .gql_err("Database operation failed")?;

        let stats = listing::stats(&rows, &registered);
        let query = listing_query(search, sort_by, status);
        let listed = listing::apply(rows, &query);
        let tabs = listing::split_tabs(&listed, &registered);

        let convert = |rows: Vec<infra::models::TournamentRow>| -> Vec<Tournament> {
            rows.into_iter().map(Tournament::from).collect()
        };

        Ok(Dashboard {
            all: convert(tabs.all),
            upcoming: convert(tabs.upcoming),
            active: convert(tabs.active),
            my: convert(tabs.my),
            stats: stats.into(),
            registered_tournament_ids: registered.into_iter().map(ID::from).collect(),
        })
    }
}

#[derive(Default)]
pub struct TournamentMutation;

#[Object]
impl TournamentMutation {
    /// Creates a tournament owned by the calling organizer.
    async fn create_tournament(
        &self,
        ctx: &Context<'_>,
        input: CreateTournamentInput,
    ) -> Result<Tournament> {
        let state = ctx.data::<AppState>()?;
        let session = Session::from_ctx(ctx);

        let row = service::create_tournament(&state.db, &session, input.into())
            .await
            .into_gql()?;

        Ok(row.into())
    }
}
