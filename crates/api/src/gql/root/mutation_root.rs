use async_graphql::MergedObject;

use crate::gql::domains::assistant::AssistantMutation;
use crate::gql::domains::profiles::ProfileMutation;
use crate::gql::domains::registrations::RegistrationMutation;
use crate::gql::domains::tournaments::TournamentMutation;

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    AssistantMutation,
    ProfileMutation,
    RegistrationMutation,
    TournamentMutation,
);
