use async_graphql::MergedObject;

use crate::gql::domains::assistant::AssistantQuery;
use crate::gql::domains::profiles::ProfileQuery;
use crate::gql::domains::registrations::RegistrationQuery;
use crate::gql::domains::tournaments::TournamentQuery;

#[derive(MergedObject, Default)]
pub struct QueryRoot(AssistantQuery, ProfileQuery, RegistrationQuery, TournamentQuery);
